//! Storefront Engine
//!
//! Cart and order pricing engine for a storefront: line-item identity and
//! merging, price derivation, stock-guarded cart mutations, merchandising
//! offer selection, coupon validation, immutable order assembly, and
//! transactional review-rating aggregation. All state lives in SQLite; every
//! read-modify-write sequence on an aggregate root runs inside a single
//! transaction.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod money;
pub mod outcome;

#[cfg(test)]
mod test;

mod uuids;
