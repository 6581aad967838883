//! Cart line items.
//!
//! A line item is a snapshot of a product at add time. Identity within a cart
//! is the `(product, size, color)` key; two entries with the same key must
//! never coexist. `None` is the single "unset" value for size and color.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::products::models::ProductUuid;

/// A single cart entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub product_uuid: ProductUuid,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl LineItem {
    #[must_use]
    pub fn key(&self) -> LineItemKey {
        LineItemKey {
            product_uuid: self.product_uuid,
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Merge/split identity of a line item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineItemKey {
    pub product_uuid: ProductUuid,
    pub size: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineItemError {
    #[error("item is not in the cart")]
    ItemNotFound,
}

/// Merges `new_item` into an existing entry with the same key, or appends it.
///
/// A merged entry keeps its position; untouched entries keep their order.
#[must_use]
pub fn merge_or_insert(items: &[LineItem], new_item: LineItem) -> Vec<LineItem> {
    let key = new_item.key();
    let mut merged: Vec<LineItem> = items.to_vec();

    match merged.iter_mut().find(|item| item.key() == key) {
        Some(existing) => existing.quantity += new_item.quantity,
        None => merged.push(new_item),
    }

    merged
}

/// Decrements the matching entry by `delta`, removing it at quantity zero.
///
/// # Errors
///
/// Returns [`LineItemError::ItemNotFound`] when no entry matches `key`.
pub fn decrement_or_remove(
    items: &[LineItem],
    key: &LineItemKey,
    delta: u32,
) -> Result<Vec<LineItem>, LineItemError> {
    if !items.iter().any(|item| &item.key() == key) {
        return Err(LineItemError::ItemNotFound);
    }

    let remaining = items
        .iter()
        .filter_map(|item| {
            if &item.key() == key {
                let quantity = item.quantity.saturating_sub(delta);

                (quantity > 0).then(|| {
                    let mut item = item.clone();
                    item.quantity = quantity;
                    item
                })
            } else {
                Some(item.clone())
            }
        })
        .collect();

    Ok(remaining)
}

/// Quantity currently held for a key; zero when absent.
#[must_use]
pub fn quantity_for(items: &[LineItem], key: &LineItemKey) -> u32 {
    items
        .iter()
        .find(|item| &item.key() == key)
        .map_or(0, |item| item.quantity)
}

#[must_use]
pub fn contains_product(items: &[LineItem], product: ProductUuid) -> bool {
    items.iter().any(|item| item.product_uuid == product)
}

/// The most expensive line by unit price. Strict `>` comparison, so the first
/// occurrence wins on ties.
#[must_use]
pub fn most_expensive(items: &[LineItem]) -> Option<&LineItem> {
    items.iter().reduce(|best, candidate| {
        if candidate.unit_price > best.unit_price {
            candidate
        } else {
            best
        }
    })
}
