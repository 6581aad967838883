//! Cart Models

use jiff::Timestamp;

use crate::{
    domain::{
        carts::{line_items::LineItem, owner::CartOwner, pricing::PriceTotals},
        products::models::ProductUuid,
    },
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Cart Model
#[derive(Debug, Clone)]
pub struct Cart {
    pub uuid: CartUuid,
    pub owner: CartOwner,
    pub items: Vec<LineItem>,
    pub totals: PriceTotals,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request to add a product (in a size/color variant) to a cart.
#[derive(Debug, Clone)]
pub struct AddItem {
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
}
