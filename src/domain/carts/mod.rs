//! Carts

pub mod errors;
pub mod line_items;
pub mod models;
pub mod owner;
pub mod pricing;
mod repositories;
pub mod service;

pub use errors::CartsServiceError;
pub(crate) use repositories::{SqliteCartItemsRepository, SqliteCartsRepository};
pub use service::*;
