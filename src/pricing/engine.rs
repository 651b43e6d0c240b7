// ==========================================
// Fiber-splice billing - pricing engine
// ==========================================
// Stage 6: deterministic tariff computation over a read-only
// TariffSnapshot. Tiers may overlap; the tier with the largest
// min_splices wins, ties broken by lowest configured index. Each
// row's total is computed independently, so no floating error
// accumulates across a batch.
// ==========================================

use crate::domain::{CanonicalRecord, PricedRecord, TariffSnapshot};
use crate::pricing::record_builder::build_priced_record;

/// Standard half-up decimal rounding to 2 places.
pub fn round_half_up_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ==========================================
// PricingEngine
// ==========================================
pub struct PricingEngine<'a> {
    tariff: &'a TariffSnapshot,
}

impl<'a> PricingEngine<'a> {
    pub fn new(tariff: &'a TariffSnapshot) -> Self {
        Self { tariff }
    }

    /// Charge for a record's splice count under the configured billing
    /// policy. Returns 0 when no tier covers the billable count.
    pub fn price_for_splices(&self, splices: i64) -> f64 {
        let billable = self.tariff.policy.billable_splices(splices);

        let tier = self
            .tariff
            .splice_tiers
            .iter()
            .enumerate()
            .filter(|(_, tier)| {
                tier.min_splices <= billable
                    && tier.max_splices.map_or(true, |max| max >= billable)
            })
            .max_by_key(|(index, tier)| (tier.min_splices, std::cmp::Reverse(*index)));

        match tier {
            Some((_, tier)) => billable as f64 * tier.unit_price,
            None => 0.0,
        }
    }

    /// Flat device-type value: case-insensitive exact name match, no
    /// partial or fuzzy matching. Empty/absent names price to 0.
    pub fn price_for_device(&self, type_name: Option<&str>) -> f64 {
        let name = match type_name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_lowercase(),
            _ => return 0.0,
        };

        self.tariff
            .device_types
            .iter()
            .find(|device| device.name.to_lowercase() == name)
            .map_or(0.0, |device| device.unit_value)
    }

    /// Price one canonical record into its persisted shape.
    pub fn price(&self, record: CanonicalRecord) -> PricedRecord {
        let splice_charge = self.price_for_splices(record.splices);
        let device_charge = self.price_for_device(record.record_type.as_deref());
        build_priced_record(record, splice_charge, device_charge)
    }
}
