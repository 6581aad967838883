//! Engine Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::EngineConfig,
    database::{self, Db},
    domain::{
        carts::{CartsService, SqliteCartsService},
        coupons::{CouponsService, SqliteCouponsService},
        merchandising::{MerchandisingService, SqliteMerchandisingService},
        orders::{OrdersService, SqliteOrdersService},
        products::{ProductsService, SqliteProductsService},
        reviews::{ReviewsService, SqliteReviewsService},
        users::{SqliteUsersService, UsersService},
    },
};

#[derive(Debug, Error)]
pub enum EngineInitError {
    #[error("failed to open database")]
    Database(#[source] sqlx::Error),
}

/// Wired-up service handles sharing one pool and one configuration.
#[derive(Clone)]
pub struct EngineContext {
    pub products: Arc<dyn ProductsService>,
    pub users: Arc<dyn UsersService>,
    pub carts: Arc<dyn CartsService>,
    pub merchandising: Arc<dyn MerchandisingService>,
    pub orders: Arc<dyn OrdersService>,
    pub reviews: Arc<dyn ReviewsService>,
    pub coupons: Arc<dyn CouponsService>,
}

impl EngineContext {
    /// Build the engine context from a database path, applying migrations.
    ///
    /// # Errors
    ///
    /// Returns an error when opening or migrating the database fails.
    pub async fn from_database_path(
        path: &str,
        config: EngineConfig,
    ) -> Result<Self, EngineInitError> {
        let pool = database::connect(path)
            .await
            .map_err(EngineInitError::Database)?;

        let db = Db::new(pool);

        Ok(Self {
            products: Arc::new(SqliteProductsService::new(db.clone())),
            users: Arc::new(SqliteUsersService::new(db.clone())),
            carts: Arc::new(SqliteCartsService::new(db.clone(), config.pricing)),
            merchandising: Arc::new(SqliteMerchandisingService::new(
                db.clone(),
                config.merchandising,
            )),
            orders: Arc::new(SqliteOrdersService::new(db.clone())),
            reviews: Arc::new(SqliteReviewsService::new(db.clone())),
            coupons: Arc::new(SqliteCouponsService::new(db)),
        })
    }
}
