//! Products

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub use errors::ProductsServiceError;
pub(crate) use repository::SqliteProductsRepository;
pub use service::*;
