// ==========================================
// Fiber-splice billing - pricing layer
// ==========================================
// Tariff computation over a per-ingestion configuration snapshot,
// plus the final persisted-record assembly.
// ==========================================

pub mod engine;
pub mod record_builder;

pub use engine::{round_half_up_2, PricingEngine};
pub use record_builder::build_priced_record;
