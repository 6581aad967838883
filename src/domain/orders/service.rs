//! Orders service.
//!
//! Placement snapshots the cart and empties it in the same transaction, so an
//! order exists exactly when its cart has been cleared.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{
            SqliteCartItemsRepository, SqliteCartsRepository, owner::CartOwner,
            pricing::PriceTotals,
        },
        orders::{
            errors::OrdersServiceError,
            models::{Order, OrderUuid, PaymentResult},
            repository::SqliteOrdersRepository,
        },
        users::{SqliteUsersRepository, models::UserUuid},
    },
    outcome::Outcome,
};

#[derive(Debug, Clone)]
pub struct SqliteOrdersService {
    db: Db,
    repository: SqliteOrdersRepository,
    carts_repository: SqliteCartsRepository,
    items_repository: SqliteCartItemsRepository,
    users_repository: SqliteUsersRepository,
}

impl SqliteOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: SqliteOrdersRepository::new(),
            carts_repository: SqliteCartsRepository::new(),
            items_repository: SqliteCartItemsRepository::new(),
            users_repository: SqliteUsersRepository::new(),
        }
    }
}

#[async_trait]
impl OrdersService for SqliteOrdersService {
    #[tracing::instrument(name = "orders.service.place_order", skip(self), err)]
    async fn place_order(
        &self,
        user: Option<UserUuid>,
    ) -> Result<Outcome<Order>, OrdersServiceError> {
        let Some(user_uuid) = user else {
            return Ok(Outcome::rejected("User is not authenticated"));
        };

        let mut tx = self.db.begin().await?;

        let user = self
            .users_repository
            .find_user(&mut tx, user_uuid)
            .await?
            .ok_or(OrdersServiceError::UserNotFound)?;

        let owner = CartOwner::User(user_uuid);

        let Some(cart) = self.carts_repository.find_cart(&mut tx, &owner).await? else {
            return Ok(Outcome::rejected("Your cart is empty"));
        };

        let items = self
            .items_repository
            .get_cart_items(&mut tx, cart.uuid)
            .await?;

        if items.is_empty() {
            return Ok(Outcome::rejected("Your cart is empty"));
        }

        let Some(address) = user.shipping_address else {
            return Ok(Outcome::rejected("No shipping address"));
        };

        let Some(method) = user.payment_method else {
            return Ok(Outcome::rejected("No payment method"));
        };

        let now = Timestamp::now();

        // Totals are carried over from the cart verbatim, not recomputed.
        let order = self
            .repository
            .create_order(&mut tx, user_uuid, items, address, method, cart.totals, now)
            .await?;

        self.items_repository
            .replace_items(&mut tx, cart.uuid, &[])
            .await?;

        self.carts_repository
            .update_totals(&mut tx, cart.uuid, &PriceTotals::zero(), now)
            .await?;

        tx.commit().await?;

        info!(order_uuid = %order.uuid, "order placed");

        Ok(Outcome::Completed(order))
    }

    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut order = self
            .repository
            .find_order(&mut tx, order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        order.items = self.repository.get_order_items(&mut tx, order.uuid).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn list_orders_for_user(
        &self,
        user: UserUuid,
    ) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut orders = self.repository.list_orders_for_user(&mut tx, user).await?;

        for order in &mut orders {
            order.items = self.repository.get_order_items(&mut tx, order.uuid).await?;
        }

        tx.commit().await?;

        Ok(orders)
    }

    #[tracing::instrument(name = "orders.service.mark_paid", skip(self, payment), err)]
    async fn mark_paid(
        &self,
        order: OrderUuid,
        payment: PaymentResult,
    ) -> Result<Outcome<Order>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut stored = self
            .repository
            .find_order(&mut tx, order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        if stored.is_paid {
            return Ok(Outcome::rejected("Order is already paid"));
        }

        let now = Timestamp::now();

        self.repository.mark_paid(&mut tx, order, &payment, now).await?;

        stored.items = self.repository.get_order_items(&mut tx, order).await?;

        tx.commit().await?;

        stored.is_paid = true;
        stored.paid_at = Some(now);
        stored.payment_result = Some(payment);

        Ok(Outcome::Completed(stored))
    }

    #[tracing::instrument(name = "orders.service.mark_delivered", skip(self), err)]
    async fn mark_delivered(&self, order: OrderUuid) -> Result<Outcome<Order>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut stored = self
            .repository
            .find_order(&mut tx, order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        if !stored.is_paid {
            return Ok(Outcome::rejected("Order is not paid"));
        }

        if stored.is_delivered {
            return Ok(Outcome::rejected("Order is already delivered"));
        }

        let now = Timestamp::now();

        self.repository.mark_delivered(&mut tx, order, now).await?;

        stored.items = self.repository.get_order_items(&mut tx, order).await?;

        tx.commit().await?;

        stored.is_delivered = true;
        stored.delivered_at = Some(now);

        Ok(Outcome::Completed(stored))
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Turns the user's cart into an order and empties the cart.
    async fn place_order(
        &self,
        user: Option<UserUuid>,
    ) -> Result<Outcome<Order>, OrdersServiceError>;

    /// Retrieves a single order with its items.
    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// Lists the user's orders, oldest first.
    async fn list_orders_for_user(&self, user: UserUuid)
    -> Result<Vec<Order>, OrdersServiceError>;

    /// Records a gateway confirmation on an unpaid order.
    async fn mark_paid(
        &self,
        order: OrderUuid,
        payment: PaymentResult,
    ) -> Result<Outcome<Order>, OrdersServiceError>;

    /// Records delivery of a paid order.
    async fn mark_delivered(&self, order: OrderUuid) -> Result<Outcome<Order>, OrdersServiceError>;
}
