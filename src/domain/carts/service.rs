//! Carts service.
//!
//! Every mutation loads the cart, derives the new item list, recomputes the
//! totals from that full list, and persists both inside one transaction, so a
//! stored cart can never disagree with `calculate_price(items)`.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    config::PricingConfig,
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            line_items::{self, LineItem, LineItemKey},
            models::{AddItem, Cart, CartUuid},
            owner::CartOwner,
            pricing::{PriceTotals, calculate_price},
            repositories::{SqliteCartItemsRepository, SqliteCartsRepository},
        },
        products::{SqliteProductsRepository, models::ProductUuid},
    },
    outcome::Outcome,
};

#[derive(Debug, Clone)]
pub struct SqliteCartsService {
    db: Db,
    pricing: PricingConfig,
    carts_repository: SqliteCartsRepository,
    items_repository: SqliteCartItemsRepository,
    products_repository: SqliteProductsRepository,
}

impl SqliteCartsService {
    #[must_use]
    pub fn new(db: Db, pricing: PricingConfig) -> Self {
        Self {
            db,
            pricing,
            carts_repository: SqliteCartsRepository::new(),
            items_repository: SqliteCartItemsRepository::new(),
            products_repository: SqliteProductsRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for SqliteCartsService {
    async fn get_cart(&self, owner: &CartOwner) -> Result<Option<Cart>, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let Some(mut cart) = self.carts_repository.find_cart(&mut tx, owner).await? else {
            return Ok(None);
        };

        let items = self
            .items_repository
            .get_cart_items(&mut tx, cart.uuid)
            .await?;

        tx.commit().await?;

        cart.items = items;

        Ok(Some(cart))
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, item),
        fields(owner = ?owner, product_uuid = %item.product_uuid, quantity = item.quantity),
        err
    )]
    async fn add_item(
        &self,
        owner: &CartOwner,
        item: AddItem,
    ) -> Result<Outcome<Cart>, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self
            .products_repository
            .find_product(&mut tx, item.product_uuid)
            .await?
            .ok_or(CartsServiceError::ProductNotFound)?;

        let existing_cart = self.carts_repository.find_cart(&mut tx, owner).await?;

        let existing_items = match &existing_cart {
            Some(cart) => {
                self.items_repository
                    .get_cart_items(&mut tx, cart.uuid)
                    .await?
            }
            None => Vec::new(),
        };

        let key = LineItemKey {
            product_uuid: item.product_uuid,
            size: item.size.clone(),
            color: item.color.clone(),
        };

        let prospective = line_items::quantity_for(&existing_items, &key) + item.quantity;

        if product.stock < i64::from(prospective) {
            // Business refusal: the transaction is dropped unwritten.
            return Ok(Outcome::rejected(format!(
                "Not enough stock for {}: only {} in stock",
                product.name, product.stock
            )));
        }

        let new_item = LineItem {
            product_uuid: product.uuid,
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: product.image.clone(),
            unit_price: product.price,
            quantity: item.quantity,
            size: item.size,
            color: item.color,
        };

        let items = line_items::merge_or_insert(&existing_items, new_item);
        let totals = calculate_price(&items, &self.pricing);
        let now = Timestamp::now();

        let mut cart = match existing_cart {
            Some(mut cart) => {
                self.carts_repository
                    .update_totals(&mut tx, cart.uuid, &totals, now)
                    .await?;

                cart.totals = totals;
                cart.updated_at = now;
                cart
            }
            None => {
                let uuid = CartUuid::new();

                self.carts_repository
                    .create_cart(&mut tx, uuid, owner, &totals, now)
                    .await?;

                Cart {
                    uuid,
                    owner: *owner,
                    items: Vec::new(),
                    totals,
                    created_at: now,
                    updated_at: now,
                }
            }
        };

        self.items_repository
            .replace_items(&mut tx, cart.uuid, &items)
            .await?;

        tx.commit().await?;

        info!(cart_uuid = %cart.uuid, items = items.len(), "added item to cart");

        cart.items = items;

        Ok(Outcome::Completed(cart))
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self, size, color),
        fields(owner = ?owner, product_uuid = %product),
        err
    )]
    async fn remove_item(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        size: Option<String>,
        color: Option<String>,
    ) -> Result<Outcome<Cart>, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        self.products_repository
            .find_product(&mut tx, product)
            .await?
            .ok_or(CartsServiceError::ProductNotFound)?;

        let Some(mut cart) = self.carts_repository.find_cart(&mut tx, owner).await? else {
            return Ok(Outcome::rejected("Item is not in the cart"));
        };

        let existing_items = self
            .items_repository
            .get_cart_items(&mut tx, cart.uuid)
            .await?;

        let key = LineItemKey {
            product_uuid: product,
            size,
            color,
        };

        let Ok(items) = line_items::decrement_or_remove(&existing_items, &key, 1) else {
            return Ok(Outcome::rejected("Item is not in the cart"));
        };

        let totals = calculate_price(&items, &self.pricing);
        let now = Timestamp::now();

        self.items_repository
            .replace_items(&mut tx, cart.uuid, &items)
            .await?;

        self.carts_repository
            .update_totals(&mut tx, cart.uuid, &totals, now)
            .await?;

        tx.commit().await?;

        cart.items = items;
        cart.totals = totals;
        cart.updated_at = now;

        Ok(Outcome::Completed(cart))
    }

    async fn clear_cart(&self, owner: &CartOwner) -> Result<Option<Cart>, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let Some(mut cart) = self.carts_repository.find_cart(&mut tx, owner).await? else {
            return Ok(None);
        };

        let totals = PriceTotals::zero();
        let now = Timestamp::now();

        self.items_repository
            .replace_items(&mut tx, cart.uuid, &[])
            .await?;

        self.carts_repository
            .update_totals(&mut tx, cart.uuid, &totals, now)
            .await?;

        tx.commit().await?;

        cart.items = Vec::new();
        cart.totals = totals;
        cart.updated_at = now;

        Ok(Some(cart))
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the owner's cart with its items.
    ///
    /// Returns `Ok(None)` when the owner has no cart row yet. A missing owner
    /// identity is caught earlier, by [`CartOwner::resolve`].
    async fn get_cart(&self, owner: &CartOwner) -> Result<Option<Cart>, CartsServiceError>;

    /// Add a product variant to the owner's cart, creating the cart on first
    /// add. Insufficient stock for the prospective merged quantity is a
    /// business rejection and persists nothing.
    async fn add_item(
        &self,
        owner: &CartOwner,
        item: AddItem,
    ) -> Result<Outcome<Cart>, CartsServiceError>;

    /// Decrement the matching line by one, removing it at quantity zero. An
    /// absent line is a business rejection; an absent product row is an
    /// error.
    async fn remove_item(
        &self,
        owner: &CartOwner,
        product: ProductUuid,
        size: Option<String>,
        color: Option<String>,
    ) -> Result<Outcome<Cart>, CartsServiceError>;

    /// Empty the cart and zero its totals. `Ok(None)` when the owner never
    /// had a cart.
    async fn clear_cart(&self, owner: &CartOwner) -> Result<Option<Cart>, CartsServiceError>;
}
