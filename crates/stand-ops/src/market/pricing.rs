//! Per-edition pricing and the billing calculator.

use serde::{Deserialize, Serialize};

use super::applications::domain::{TableTier, VendorApplication};

/// Pricing configuration for one market edition (year). Whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceConfig {
    pub year: i32,
    pub label: String,
    pub price_single_table: u32,
    pub price_double_table: u32,
    pub price_meal: u32,
    pub price_electricity: u32,
    pub is_current: bool,
    pub notify_email: String,
}

impl PriceConfig {
    /// Fallback used when no configuration has been created yet.
    pub fn builtin_default() -> Self {
        Self {
            year: 2026,
            label: "Edition 2026".to_string(),
            price_single_table: 40,
            price_double_table: 60,
            price_meal: 8,
            price_electricity: 1,
            is_current: false,
            notify_email: String::new(),
        }
    }
}

/// Select the configuration to use, infallibly.
///
/// Order: explicit year match, then the `is_current` flag (first one wins if
/// the at-most-one invariant has been violated), then the highest year, then
/// the built-in default for an empty set.
pub fn resolve_config(configs: &[PriceConfig], selected_year: Option<i32>) -> PriceConfig {
    if let Some(year) = selected_year {
        if let Some(config) = configs.iter().find(|config| config.year == year) {
            return config.clone();
        }
    }
    if let Some(config) = configs.iter().find(|config| config.is_current) {
        return config.clone();
    }
    if let Some(config) = configs.iter().max_by_key(|config| config.year) {
        return config.clone();
    }
    PriceConfig::builtin_default()
}

/// Amount owed by a vendor under `config`, in whole currency units.
///
/// Zero until the logistics declaration is in: statuses before
/// `details_submitted` contribute nothing to revenue even though the tier
/// price is already known.
pub fn compute_total(record: &VendorApplication, config: &PriceConfig) -> u32 {
    if !record.status.has_details() {
        return 0;
    }

    let tier_price = match record.requested_tables {
        TableTier::SingleTable => config.price_single_table,
        TableTier::DoubleTable => config.price_double_table,
    };

    let electricity = if record.needs_electricity() {
        config.price_electricity
    } else {
        0
    };

    tier_price + record.meal_count() * config.price_meal + electricity
}
