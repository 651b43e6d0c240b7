// ==========================================
// Fiber-splice billing - core library
// ==========================================
// Ingests spreadsheets of fiber-splicing work records with
// inconsistent, sometimes bilingual headers, resolves them onto a
// canonical schema, and prices each record via configurable
// tiered/per-device tariff rules. One ingestion call is one
// self-contained synchronous computation.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - data types
pub mod domain;

// Import layer - ingestion pipeline
pub mod importer;

// Pricing layer - tariff computation
pub mod pricing;

// Storage layer - external collaborator
pub mod repository;

// Database infrastructure (connection init / unified PRAGMA)
pub mod db;

// Logging
pub mod logging;

// ==========================================
// Re-exports
// ==========================================

// Domain types
pub use domain::{
    BillingPolicy, CanonicalField, CanonicalRecord, CellValue, DeviceType, ImportSummary,
    PricedRecord, RawSheet, SpliceTier, TariffSnapshot, CANONICAL_COLUMNS,
};

// Importer
pub use importer::{ImportError, ImportResult, SchemaMode, WorkRecordImporter};

// Pricing
pub use pricing::{round_half_up_2, PricingEngine};

// Storage
pub use repository::{BillingRepository, BillingRepositoryImpl};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Fiber Splice Billing";
