//! Storefront domain concerns.

pub mod carts;
pub mod coupons;
pub mod merchandising;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;
