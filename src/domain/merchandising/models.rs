//! Merchandising Models
//!
//! Promotion and upsell are single-slot aggregates: at most one row is ever
//! consulted, and writes upsert that row. Presell is single-slot per category.

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{
    domain::products::models::{Product, ProductUuid},
    uuids::TypedUuid,
};

/// Promotion UUID
pub type PromotionUuid = TypedUuid<Promotion>;

/// Storewide featured discount on a single product.
#[derive(Debug, Clone)]
pub struct Promotion {
    pub uuid: PromotionUuid,
    pub product_uuid: ProductUuid,
    pub discount_percentage: Decimal,
    pub ends_at: Timestamp,
    pub is_enabled: bool,
    pub created_at: Timestamp,
}

/// New Promotion Model
#[derive(Debug, Clone)]
pub struct NewPromotion {
    pub product_uuid: ProductUuid,
    pub discount_percentage: Decimal,
    pub ends_at: Timestamp,
    pub is_enabled: bool,
}

/// Upsell UUID
pub type UpsellUuid = TypedUuid<Upsell>;

/// Offer surfaced at place-order time, independent of cart contents.
#[derive(Debug, Clone)]
pub struct Upsell {
    pub uuid: UpsellUuid,
    pub product_uuid: ProductUuid,
    pub is_enabled: bool,
    pub created_at: Timestamp,
}

/// New Upsell Model
#[derive(Debug, Clone)]
pub struct NewUpsell {
    pub product_uuid: ProductUuid,
    pub is_enabled: bool,
}

/// Presell UUID
pub type PresellUuid = TypedUuid<Presell>;

/// Per-category offer surfaced in the cart view.
#[derive(Debug, Clone)]
pub struct Presell {
    pub uuid: PresellUuid,
    pub category: String,
    pub product_uuid: ProductUuid,
    pub is_enabled: bool,
    pub created_at: Timestamp,
}

/// New Presell Model
#[derive(Debug, Clone)]
pub struct NewPresell {
    pub category: String,
    pub product_uuid: ProductUuid,
    pub is_enabled: bool,
}

/// A resolved promotion, ready for display. Fallback offers are synthesized
/// and never persisted.
#[derive(Debug, Clone)]
pub struct PromotionOffer {
    pub product: Product,
    pub discount_percentage: Decimal,
    pub ends_at: Timestamp,
    pub discounted_price: Decimal,
}

/// A resolved upsell.
#[derive(Debug, Clone)]
pub struct UpsellOffer {
    pub product: Product,
}

/// A resolved presell for the current cart.
#[derive(Debug, Clone)]
pub struct PresellOffer {
    pub category: String,
    pub product: Product,
}
