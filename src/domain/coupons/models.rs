//! Coupons Models

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::uuids::TypedUuid;

/// Coupon UUID
pub type CouponUuid = TypedUuid<Coupon>;

/// A discount code. Codes are stored upper-cased; lookups normalize the same
/// way, so casing never matters to shoppers.
#[derive(Debug, Clone)]
pub struct Coupon {
    pub uuid: CouponUuid,
    pub code: String,
    pub discount_percentage: Decimal,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub is_enabled: bool,
    pub created_at: Timestamp,
}

/// New Coupon Model
#[derive(Debug, Clone)]
pub struct NewCoupon {
    pub code: String,
    pub discount_percentage: Decimal,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub is_enabled: bool,
}
