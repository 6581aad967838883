//! Product Models

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Catalog product. `rating` and `num_reviews` are aggregates maintained by
/// the review submission transaction; nothing else writes them.
#[derive(Debug, Clone)]
pub struct Product {
    pub uuid: ProductUuid,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub category: String,
    pub price: Decimal,
    pub stock: i64,
    pub rating: Decimal,
    pub num_reviews: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Product Model
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub category: String,
    pub price: Decimal,
    pub stock: i64,
}
