// ==========================================
// Fiber-splice billing - storage collaborator interface
// ==========================================
// The core never assumes isolation stronger than "readers see
// configuration committed before the ingestion call began". Tariff
// configuration is owned and mutated by the settings collaborator;
// this side only reads it, once, into a snapshot.
// ==========================================

use crate::domain::{BillingPolicy, DeviceType, PricedRecord, SpliceTier, TariffSnapshot};
use crate::importer::error::ImportResult;

// ==========================================
// BillingRepository Trait
// ==========================================
pub trait BillingRepository: Send + Sync {
    /// Persist one ingestion batch. Atomic per call: all rows land or
    /// none do.
    fn save_records(&self, records: &[PricedRecord]) -> ImportResult<()>;

    /// Configured device types (name is a unique, case-insensitive key).
    fn lookup_device_types(&self) -> ImportResult<Vec<DeviceType>>;

    /// Configured splice tiers, in configured order (the order is the
    /// pricing tie-break).
    fn lookup_splice_tiers(&self) -> ImportResult<Vec<SpliceTier>>;

    /// Active billing policy; defaults to ChargeAll when unset.
    fn billing_policy(&self) -> ImportResult<BillingPolicy>;

    /// Total persisted work records.
    fn record_count(&self) -> ImportResult<i64>;

    /// Capture the read-only tariff snapshot an ingestion runs against.
    fn load_tariff_snapshot(&self) -> ImportResult<TariffSnapshot> {
        Ok(TariffSnapshot::new(
            self.lookup_device_types()?,
            self.lookup_splice_tiers()?,
            self.billing_policy()?,
        ))
    }
}
