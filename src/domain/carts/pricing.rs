//! Cart price derivation.
//!
//! Totals are a pure function of the line-item list; no code path persists a
//! cart whose stored totals disagree with a recomputation from its items.

use rust_decimal::Decimal;

use crate::{config::PricingConfig, domain::carts::line_items::LineItem, money::round2};

/// The four derived cart amounts, each already rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceTotals {
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub total_price: Decimal,
}

impl PriceTotals {
    /// Totals of an empty cart.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            items_price: Decimal::ZERO,
            shipping_price: Decimal::ZERO,
            tax_price: Decimal::ZERO,
            total_price: Decimal::ZERO,
        }
    }
}

/// Derives items/shipping/tax/total from a line-item list.
///
/// Shipping is free strictly above the threshold; an items price of exactly
/// 100.00 still pays the flat charge. Tax applies to the items price only.
#[must_use]
pub fn calculate_price(items: &[LineItem], config: &PricingConfig) -> PriceTotals {
    if items.is_empty() {
        return PriceTotals::zero();
    }

    let items_price = round2(items.iter().map(LineItem::line_total).sum());

    let shipping_price = round2(if items_price > config.free_shipping_threshold {
        Decimal::ZERO
    } else {
        config.flat_shipping_price
    });

    let tax_price = round2(config.tax_rate * items_price);

    let total_price = round2(items_price + tax_price + shipping_price);

    PriceTotals {
        items_price,
        shipping_price,
        tax_price,
        total_price,
    }
}
