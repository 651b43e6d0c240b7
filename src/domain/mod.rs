// ==========================================
// Fiber-splice billing - domain layer
// ==========================================
// Plain data types shared by the importer, pricing engine and
// storage collaborator. No I/O, no heuristics here.
// ==========================================

pub mod record;
pub mod tariff;

pub use record::{
    CanonicalField, CanonicalRecord, CellValue, ImportSummary, PricedRecord, RawSheet,
    CANONICAL_COLUMNS,
};
pub use tariff::{BillingPolicy, DeviceType, SpliceTier, TariffSnapshot};
