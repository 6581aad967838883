//! Merchandising: promotion, upsell and presell offers.

pub mod errors;
pub mod models;
mod repository;
pub mod service;

pub use errors::MerchandisingServiceError;
pub use service::*;
