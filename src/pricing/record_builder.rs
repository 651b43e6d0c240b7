// ==========================================
// Fiber-splice billing - record builder
// ==========================================
// Stage 7: canonical row + computed charges -> persisted-record
// shape. Pure, total, side-effect-free.
// ==========================================

use crate::domain::{CanonicalRecord, PricedRecord};
use crate::pricing::engine::round_half_up_2;

/// Deterministic 1:1 mapping to the persisted-record shape. The total
/// is the half-up rounded sum of the two charges.
pub fn build_priced_record(
    record: CanonicalRecord,
    splice_charge: f64,
    device_charge: f64,
) -> PricedRecord {
    PricedRecord {
        record,
        splice_charge,
        device_charge,
        total: round_half_up_2(splice_charge + device_charge),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_totals_charges() {
        let record = CanonicalRecord::empty("Sheet1");
        let priced = build_priced_record(record.clone(), 22.5, 15.0);
        assert_eq!(priced.splice_charge, 22.5);
        assert_eq!(priced.device_charge, 15.0);
        assert_eq!(priced.total, 37.5);
        assert_eq!(priced.record, record);
    }

    #[test]
    fn test_total_is_rounded() {
        let record = CanonicalRecord::empty("s");
        let priced = build_priced_record(record, 1.125, 1.25);
        assert_eq!(priced.total, 2.38);
    }
}
