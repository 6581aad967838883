//! Merchandising service.
//!
//! Offer resolution is read-only and self-suppressing: a missing or out of
//! stock product hides the offer rather than erroring, since offers are
//! decoration on top of the catalog rather than part of it.

use async_trait::async_trait;
use jiff::{Span, Timestamp};
use mockall::automock;
use rust_decimal::Decimal;

use crate::{
    config::MerchandisingConfig,
    database::Db,
    domain::{
        carts::line_items::{LineItem, contains_product, most_expensive},
        merchandising::{
            errors::MerchandisingServiceError,
            models::{
                NewPresell, NewPromotion, NewUpsell, Presell, PresellOffer, Promotion,
                PromotionOffer, Upsell, UpsellOffer,
            },
            repository::SqliteMerchandisingRepository,
        },
        products::SqliteProductsRepository,
    },
    money::percent_off,
    outcome::FieldErrors,
};

#[derive(Debug, Clone)]
pub struct SqliteMerchandisingService {
    db: Db,
    config: MerchandisingConfig,
    repository: SqliteMerchandisingRepository,
    products_repository: SqliteProductsRepository,
}

impl SqliteMerchandisingService {
    #[must_use]
    pub fn new(db: Db, config: MerchandisingConfig) -> Self {
        Self {
            db,
            config,
            repository: SqliteMerchandisingRepository::new(),
            products_repository: SqliteProductsRepository::new(),
        }
    }
}

fn validate_percentage(percentage: Decimal) -> Result<(), MerchandisingServiceError> {
    if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
        let mut errors = FieldErrors::new();
        errors.push(
            "discount_percentage",
            "Discount percentage must be between 0 and 100",
        );
        return Err(MerchandisingServiceError::Validation(errors));
    }

    Ok(())
}

#[async_trait]
impl MerchandisingService for SqliteMerchandisingService {
    #[tracing::instrument(name = "merchandising.service.set_promotion", skip(self), err)]
    async fn set_promotion(
        &self,
        promotion: NewPromotion,
    ) -> Result<Promotion, MerchandisingServiceError> {
        validate_percentage(promotion.discount_percentage)?;

        let mut tx = self.db.begin().await?;

        self.products_repository
            .find_product(&mut tx, promotion.product_uuid)
            .await?
            .ok_or(MerchandisingServiceError::InvalidReference)?;

        let stored = self
            .repository
            .set_promotion(&mut tx, promotion, Timestamp::now())
            .await?;

        tx.commit().await?;

        Ok(stored)
    }

    async fn active_promotion(&self) -> Result<Option<PromotionOffer>, MerchandisingServiceError> {
        let now = Timestamp::now();
        let mut tx = self.db.begin().await?;

        let offer = match self.repository.first_promotion(&mut tx).await? {
            Some(promotion) if promotion.is_enabled && promotion.ends_at >= now => self
                .products_repository
                .find_product(&mut tx, promotion.product_uuid)
                .await?
                .map(|product| PromotionOffer {
                    discounted_price: percent_off(product.price, promotion.discount_percentage),
                    discount_percentage: promotion.discount_percentage,
                    ends_at: promotion.ends_at,
                    product,
                }),

            // A configured slot that is disabled or expired stays dark; the
            // fallback only covers the never-configured store.
            Some(_) => None,

            None if self.config.fallback_promotion => self
                .products_repository
                .earliest_product(&mut tx)
                .await?
                .map(|product| {
                    let percentage = self.config.fallback_discount_percentage;

                    PromotionOffer {
                        discounted_price: percent_off(product.price, percentage),
                        discount_percentage: percentage,
                        ends_at: now
                            .checked_add(Span::new().hours(self.config.fallback_window_days * 24))
                            .unwrap_or(Timestamp::MAX),
                        product,
                    }
                }),

            None => None,
        };

        tx.commit().await?;

        Ok(offer)
    }

    #[tracing::instrument(name = "merchandising.service.set_upsell", skip(self), err)]
    async fn set_upsell(&self, upsell: NewUpsell) -> Result<Upsell, MerchandisingServiceError> {
        let mut tx = self.db.begin().await?;

        self.products_repository
            .find_product(&mut tx, upsell.product_uuid)
            .await?
            .ok_or(MerchandisingServiceError::InvalidReference)?;

        let stored = self
            .repository
            .set_upsell(&mut tx, upsell, Timestamp::now())
            .await?;

        tx.commit().await?;

        Ok(stored)
    }

    async fn current_upsell(&self) -> Result<Option<UpsellOffer>, MerchandisingServiceError> {
        let mut tx = self.db.begin().await?;

        let offer = match self.repository.first_upsell(&mut tx).await? {
            Some(upsell) if upsell.is_enabled => self
                .products_repository
                .find_product(&mut tx, upsell.product_uuid)
                .await?
                .filter(|product| product.stock > 0)
                .map(|product| UpsellOffer { product }),
            _ => None,
        };

        tx.commit().await?;

        Ok(offer)
    }

    #[tracing::instrument(name = "merchandising.service.set_presell", skip(self), err)]
    async fn set_presell(&self, presell: NewPresell) -> Result<Presell, MerchandisingServiceError> {
        let mut tx = self.db.begin().await?;

        self.products_repository
            .find_product(&mut tx, presell.product_uuid)
            .await?
            .ok_or(MerchandisingServiceError::InvalidReference)?;

        let stored = self
            .repository
            .upsert_presell(&mut tx, presell, Timestamp::now())
            .await?;

        tx.commit().await?;

        Ok(stored)
    }

    async fn presell_for_cart(
        &self,
        items: &[LineItem],
    ) -> Result<Option<PresellOffer>, MerchandisingServiceError> {
        let Some(anchor) = most_expensive(items) else {
            return Ok(None);
        };

        let mut tx = self.db.begin().await?;

        let Some(anchor_product) = self
            .products_repository
            .find_product(&mut tx, anchor.product_uuid)
            .await?
        else {
            tx.commit().await?;
            return Ok(None);
        };

        let offer = match self
            .repository
            .find_presell(&mut tx, &anchor_product.category)
            .await?
        {
            // Offering a product the shopper already holds is noise.
            Some(presell)
                if presell.is_enabled && !contains_product(items, presell.product_uuid) =>
            {
                self.products_repository
                    .find_product(&mut tx, presell.product_uuid)
                    .await?
                    .map(|product| PresellOffer {
                        category: presell.category,
                        product,
                    })
            }
            _ => None,
        };

        tx.commit().await?;

        Ok(offer)
    }
}

#[automock]
#[async_trait]
pub trait MerchandisingService: Send + Sync {
    /// Writes the promotion slot, creating it on first use.
    async fn set_promotion(
        &self,
        promotion: NewPromotion,
    ) -> Result<Promotion, MerchandisingServiceError>;

    /// Resolves the promotion to feature right now, if any.
    async fn active_promotion(&self) -> Result<Option<PromotionOffer>, MerchandisingServiceError>;

    /// Writes the upsell slot, creating it on first use.
    async fn set_upsell(&self, upsell: NewUpsell) -> Result<Upsell, MerchandisingServiceError>;

    /// Resolves the upsell to surface at checkout, if any.
    async fn current_upsell(&self) -> Result<Option<UpsellOffer>, MerchandisingServiceError>;

    /// Writes the presell slot for a category, creating it on first use.
    async fn set_presell(&self, presell: NewPresell) -> Result<Presell, MerchandisingServiceError>;

    /// Resolves the presell anchored on the cart's most expensive line.
    async fn presell_for_cart(
        &self,
        items: &[LineItem],
    ) -> Result<Option<PresellOffer>, MerchandisingServiceError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        config::MerchandisingConfig,
        domain::{carts::CartsService, products::ProductsService},
        test::TestContext,
    };

    use super::*;

    fn future() -> Timestamp {
        Timestamp::now() + Span::new().hours(48)
    }

    fn past() -> Timestamp {
        Timestamp::now() - Span::new().hours(48)
    }

    #[tokio::test]
    async fn enabled_promotion_is_offered_with_discounted_price() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_product("Feature Me", "100.00", 5).await;

        ctx.merchandising
            .set_promotion(NewPromotion {
                product_uuid: product.uuid,
                discount_percentage: Decimal::from(25),
                ends_at: future(),
                is_enabled: true,
            })
            .await?;

        let offer = ctx
            .merchandising
            .active_promotion()
            .await?
            .expect("expected an active promotion");

        assert_eq!(offer.product.uuid, product.uuid);
        assert_eq!(offer.discount_percentage, Decimal::from(25));
        assert_eq!(offer.discounted_price, "75.00".parse::<Decimal>()?);

        Ok(())
    }

    #[tokio::test]
    async fn disabled_promotion_suppresses_the_slot() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_product("Hidden", "50.00", 5).await;

        ctx.merchandising
            .set_promotion(NewPromotion {
                product_uuid: product.uuid,
                discount_percentage: Decimal::from(10),
                ends_at: future(),
                is_enabled: false,
            })
            .await?;

        assert!(ctx.merchandising.active_promotion().await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn expired_promotion_suppresses_the_slot() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_product("Bygone", "50.00", 5).await;

        ctx.merchandising
            .set_promotion(NewPromotion {
                product_uuid: product.uuid,
                discount_percentage: Decimal::from(10),
                ends_at: past(),
                is_enabled: true,
            })
            .await?;

        assert!(ctx.merchandising.active_promotion().await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn missing_slot_falls_back_to_earliest_product() -> TestResult {
        let ctx = TestContext::new().await;

        let first = ctx.create_product("Oldest", "40.00", 5).await;
        ctx.create_product("Newer", "60.00", 5).await;

        let offer = ctx
            .merchandising
            .active_promotion()
            .await?
            .expect("expected a fallback promotion");

        assert_eq!(offer.product.uuid, first.uuid);
        assert_eq!(offer.discount_percentage, Decimal::TEN);
        assert_eq!(offer.discounted_price, "36.00".parse::<Decimal>()?);

        // Default window is 7 days from resolution time.
        assert!(offer.ends_at > Timestamp::now() + Span::new().hours(6 * 24));
        assert!(offer.ends_at <= Timestamp::now() + Span::new().hours(7 * 24));

        Ok(())
    }

    #[tokio::test]
    async fn fallback_can_be_turned_off() -> TestResult {
        let ctx = TestContext::with_merchandising(MerchandisingConfig {
            fallback_promotion: false,
            ..MerchandisingConfig::default()
        })
        .await;

        ctx.create_product("Unfeatured", "40.00", 5).await;

        assert!(ctx.merchandising.active_promotion().await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn empty_catalog_yields_no_fallback() -> TestResult {
        let ctx = TestContext::new().await;

        assert!(ctx.merchandising.active_promotion().await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn second_set_promotion_overwrites_the_slot() -> TestResult {
        let ctx = TestContext::new().await;

        let first = ctx.create_product("First Pick", "10.00", 5).await;
        let second = ctx.create_product("Second Pick", "20.00", 5).await;

        ctx.merchandising
            .set_promotion(NewPromotion {
                product_uuid: first.uuid,
                discount_percentage: Decimal::from(5),
                ends_at: future(),
                is_enabled: true,
            })
            .await?;

        ctx.merchandising
            .set_promotion(NewPromotion {
                product_uuid: second.uuid,
                discount_percentage: Decimal::from(15),
                ends_at: future(),
                is_enabled: true,
            })
            .await?;

        let offer = ctx
            .merchandising
            .active_promotion()
            .await?
            .expect("expected an active promotion");

        assert_eq!(offer.product.uuid, second.uuid);
        assert_eq!(offer.discount_percentage, Decimal::from(15));

        Ok(())
    }

    #[tokio::test]
    async fn promotion_percentage_out_of_range_is_a_validation_error() {
        let ctx = TestContext::new().await;

        let result = ctx
            .merchandising
            .set_promotion(NewPromotion {
                product_uuid: crate::domain::products::models::ProductUuid::new(),
                discount_percentage: Decimal::from(101),
                ends_at: future(),
                is_enabled: true,
            })
            .await;

        assert!(
            matches!(result, Err(MerchandisingServiceError::Validation(_))),
            "expected Validation, got {result:?}"
        );
    }

    #[tokio::test]
    async fn promotion_for_unknown_product_is_invalid_reference() {
        let ctx = TestContext::new().await;

        let result = ctx
            .merchandising
            .set_promotion(NewPromotion {
                product_uuid: crate::domain::products::models::ProductUuid::new(),
                discount_percentage: Decimal::TEN,
                ends_at: future(),
                is_enabled: true,
            })
            .await;

        assert!(
            matches!(result, Err(MerchandisingServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );
    }

    #[tokio::test]
    async fn enabled_upsell_with_stock_is_offered() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_product("Add On", "12.00", 3).await;

        ctx.merchandising
            .set_upsell(NewUpsell {
                product_uuid: product.uuid,
                is_enabled: true,
            })
            .await?;

        let offer = ctx
            .merchandising
            .current_upsell()
            .await?
            .expect("expected an upsell");

        assert_eq!(offer.product.uuid, product.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn out_of_stock_upsell_is_suppressed() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_product("Gone", "12.00", 0).await;

        ctx.merchandising
            .set_upsell(NewUpsell {
                product_uuid: product.uuid,
                is_enabled: true,
            })
            .await?;

        assert!(ctx.merchandising.current_upsell().await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn disabled_upsell_is_suppressed() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_product("Quiet", "12.00", 3).await;

        ctx.merchandising
            .set_upsell(NewUpsell {
                product_uuid: product.uuid,
                is_enabled: false,
            })
            .await?;

        assert!(ctx.merchandising.current_upsell().await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn presell_follows_most_expensive_line_category() -> TestResult {
        let ctx = TestContext::new().await;

        let boots = ctx
            .products
            .create_product(TestContext::new_product("Hiking Boots", "120.00", 5, "footwear"))
            .await?;
        let socks = ctx
            .products
            .create_product(TestContext::new_product("Trail Socks", "8.00", 50, "footwear"))
            .await?;

        ctx.merchandising
            .set_presell(NewPresell {
                category: "footwear".to_string(),
                product_uuid: socks.uuid,
                is_enabled: true,
            })
            .await?;

        let owner = TestContext::session_owner();
        ctx.carts
            .add_item(
                &owner,
                crate::domain::carts::models::AddItem {
                    product_uuid: boots.uuid,
                    quantity: 1,
                    size: None,
                    color: None,
                },
            )
            .await?;

        let cart = ctx
            .carts
            .get_cart(&owner)
            .await?
            .expect("expected a cart after add");

        let offer = ctx
            .merchandising
            .presell_for_cart(&cart.items)
            .await?
            .expect("expected a presell");

        assert_eq!(offer.category, "footwear");
        assert_eq!(offer.product.uuid, socks.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn presell_product_already_in_cart_is_suppressed() -> TestResult {
        let ctx = TestContext::new().await;

        let socks = ctx
            .products
            .create_product(TestContext::new_product("Trail Socks", "8.00", 50, "footwear"))
            .await?;

        ctx.merchandising
            .set_presell(NewPresell {
                category: "footwear".to_string(),
                product_uuid: socks.uuid,
                is_enabled: true,
            })
            .await?;

        let owner = TestContext::session_owner();
        ctx.carts
            .add_item(
                &owner,
                crate::domain::carts::models::AddItem {
                    product_uuid: socks.uuid,
                    quantity: 1,
                    size: None,
                    color: None,
                },
            )
            .await?;

        let cart = ctx
            .carts
            .get_cart(&owner)
            .await?
            .expect("expected a cart after add");

        assert!(ctx.merchandising.presell_for_cart(&cart.items).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_has_no_presell() -> TestResult {
        let ctx = TestContext::new().await;

        assert!(ctx.merchandising.presell_for_cart(&[]).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn set_presell_replaces_the_category_slot() -> TestResult {
        let ctx = TestContext::new().await;

        let first = ctx
            .products
            .create_product(TestContext::new_product("Old Offer", "5.00", 5, "general"))
            .await?;
        let second = ctx
            .products
            .create_product(TestContext::new_product("New Offer", "6.00", 5, "general"))
            .await?;

        ctx.merchandising
            .set_presell(NewPresell {
                category: "general".to_string(),
                product_uuid: first.uuid,
                is_enabled: true,
            })
            .await?;

        let replaced = ctx
            .merchandising
            .set_presell(NewPresell {
                category: "general".to_string(),
                product_uuid: second.uuid,
                is_enabled: true,
            })
            .await?;

        assert_eq!(replaced.product_uuid, second.uuid);

        Ok(())
    }
}
