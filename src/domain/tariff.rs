// ==========================================
// Fiber-splice billing - tariff configuration
// ==========================================
// DeviceType / SpliceTier are long-lived configuration owned by the
// settings collaborator. The pricing engine only ever reads them
// through a TariffSnapshot captured at the start of an ingestion.
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// DeviceType - flat per-device value
// ==========================================
// name is a unique, case-insensitive key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceType {
    pub name: String,
    pub unit_value: f64,
}

// ==========================================
// SpliceTier - splice-count range with a unit price
// ==========================================
// max_splices absent = unbounded. Tiers may overlap; the engine
// breaks ties by largest min_splices, then lowest configured index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpliceTier {
    pub min_splices: i64,
    pub max_splices: Option<i64>,
    pub unit_price: f64,
}

// ==========================================
// BillingPolicy - which splices are billable
// ==========================================
// Two product behaviors exist in the field; this is a configuration
// flag, never a hard-coded constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPolicy {
    /// Every splice on the record is billable.
    ChargeAll,
    /// The first splice is free: billable = max(splices - 1, 0).
    FirstSpliceFree,
}

impl BillingPolicy {
    /// Parse the config_kv representation.
    pub fn from_config_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "charge_all" => Some(BillingPolicy::ChargeAll),
            "first_splice_free" => Some(BillingPolicy::FirstSpliceFree),
            _ => None,
        }
    }

    pub fn as_config_value(&self) -> &'static str {
        match self {
            BillingPolicy::ChargeAll => "charge_all",
            BillingPolicy::FirstSpliceFree => "first_splice_free",
        }
    }

    /// Splice count actually billed under this policy.
    pub fn billable_splices(&self, splices: i64) -> i64 {
        match self {
            BillingPolicy::ChargeAll => splices.max(0),
            BillingPolicy::FirstSpliceFree => (splices - 1).max(0),
        }
    }
}

impl Default for BillingPolicy {
    fn default() -> Self {
        BillingPolicy::ChargeAll
    }
}

// ==========================================
// TariffSnapshot - read-only per-ingestion view
// ==========================================
// Captured once before the pipeline runs so concurrent ingestions
// with different configurations stay reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffSnapshot {
    pub device_types: Vec<DeviceType>,
    pub splice_tiers: Vec<SpliceTier>,
    pub policy: BillingPolicy,
}

impl TariffSnapshot {
    pub fn new(
        device_types: Vec<DeviceType>,
        splice_tiers: Vec<SpliceTier>,
        policy: BillingPolicy,
    ) -> Self {
        Self {
            device_types,
            splice_tiers,
            policy,
        }
    }

    /// Empty snapshot: every lookup prices to zero.
    pub fn empty() -> Self {
        Self {
            device_types: Vec::new(),
            splice_tiers: Vec::new(),
            policy: BillingPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_config_round_trip() {
        for policy in [BillingPolicy::ChargeAll, BillingPolicy::FirstSpliceFree] {
            assert_eq!(
                BillingPolicy::from_config_value(policy.as_config_value()),
                Some(policy)
            );
        }
        assert_eq!(BillingPolicy::from_config_value("whatever"), None);
    }

    #[test]
    fn test_billable_splices() {
        assert_eq!(BillingPolicy::ChargeAll.billable_splices(15), 15);
        assert_eq!(BillingPolicy::FirstSpliceFree.billable_splices(15), 14);
        assert_eq!(BillingPolicy::FirstSpliceFree.billable_splices(0), 0);
        assert_eq!(BillingPolicy::FirstSpliceFree.billable_splices(1), 0);
    }
}
