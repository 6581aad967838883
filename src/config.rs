//! Engine configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Pricing constants used by cart total derivation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Orders with an items price strictly above this ship free.
    pub free_shipping_threshold: Decimal,

    /// Flat shipping charge below the free-shipping threshold.
    pub flat_shipping_price: Decimal,

    /// Tax rate applied to the items price only, not shipping.
    pub tax_rate: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::ONE_HUNDRED,
            flat_shipping_price: Decimal::TEN,
            tax_rate: Decimal::new(15, 2),
        }
    }
}

/// Merchandising policy knobs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MerchandisingConfig {
    /// When no promotion row exists at all, synthesize a non-persisted offer
    /// on the earliest-created product so the storefront always has something
    /// to feature. A disabled promotion row suppresses the slot regardless.
    pub fallback_promotion: bool,

    /// Window length of the synthesized fallback offer, in days.
    pub fallback_window_days: i64,

    /// Discount percentage of the synthesized fallback offer.
    pub fallback_discount_percentage: Decimal,
}

impl Default for MerchandisingConfig {
    fn default() -> Self {
        Self {
            fallback_promotion: true,
            fallback_window_days: 7,
            fallback_discount_percentage: Decimal::TEN,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pricing: PricingConfig,
    pub merchandising: MerchandisingConfig,
}
