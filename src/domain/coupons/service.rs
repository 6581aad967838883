//! Coupons service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;

use crate::{
    database::Db,
    domain::coupons::{
        errors::CouponsServiceError,
        models::{Coupon, NewCoupon},
        repository::SqliteCouponsRepository,
    },
    outcome::{FieldErrors, Outcome},
};

#[derive(Debug, Clone)]
pub struct SqliteCouponsService {
    db: Db,
    repository: SqliteCouponsRepository,
}

impl SqliteCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: SqliteCouponsRepository::new(),
        }
    }
}

#[async_trait]
impl CouponsService for SqliteCouponsService {
    #[tracing::instrument(name = "coupons.service.create_coupon", skip(self), err)]
    async fn create_coupon(
        &self,
        mut coupon: NewCoupon,
    ) -> Result<Outcome<Coupon>, CouponsServiceError> {
        if coupon.discount_percentage < Decimal::ZERO
            || coupon.discount_percentage > Decimal::ONE_HUNDRED
        {
            let mut errors = FieldErrors::new();
            errors.push(
                "discount_percentage",
                "Discount percentage must be between 0 and 100",
            );
            return Err(CouponsServiceError::Validation(errors));
        }

        coupon.code = coupon.code.to_uppercase();

        let mut tx = self.db.begin().await?;

        let created = match self
            .repository
            .create_coupon(&mut tx, coupon, Timestamp::now())
            .await
        {
            Ok(created) => created,
            // The constraint name stays internal; the shopper-facing admin
            // screen gets a plain sentence.
            Err(error) => match CouponsServiceError::from(error) {
                CouponsServiceError::AlreadyExists => {
                    return Ok(Outcome::rejected("A coupon with this code already exists"));
                }
                other => return Err(other),
            },
        };

        tx.commit().await?;

        Ok(Outcome::Completed(created))
    }

    async fn check_coupon(
        &self,
        code: &str,
        now: Timestamp,
    ) -> Result<Outcome<Coupon>, CouponsServiceError> {
        let normalized = code.to_uppercase();

        let mut tx = self.db.begin().await?;

        let coupon = self
            .repository
            .find_coupon_by_code(&mut tx, &normalized)
            .await?;

        tx.commit().await?;

        // Unknown, disabled and out-of-window all collapse to one message so
        // the response never reveals which codes exist.
        match coupon {
            Some(coupon)
                if coupon.is_enabled && now >= coupon.starts_at && now <= coupon.ends_at =>
            {
                Ok(Outcome::Completed(coupon))
            }
            _ => Ok(Outcome::rejected("Invalid or expired coupon")),
        }
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Registers a discount code. Duplicate codes are refused on the business
    /// channel.
    async fn create_coupon(
        &self,
        coupon: NewCoupon,
    ) -> Result<Outcome<Coupon>, CouponsServiceError>;

    /// Validates a code at `now`, case-insensitively.
    async fn check_coupon(
        &self,
        code: &str,
        now: Timestamp,
    ) -> Result<Outcome<Coupon>, CouponsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::Span;
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn window_coupon(code: &str) -> NewCoupon {
        let now = Timestamp::now();

        NewCoupon {
            code: code.to_string(),
            discount_percentage: Decimal::from(20),
            starts_at: now - Span::new().hours(24),
            ends_at: now + Span::new().hours(24),
            is_enabled: true,
        }
    }

    #[tokio::test]
    async fn codes_are_stored_and_checked_upper_cased() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .coupons
            .create_coupon(window_coupon("summer20"))
            .await?
            .completed()
            .expect("coupon should be created");

        assert_eq!(created.code, "SUMMER20");

        let checked = ctx
            .coupons
            .check_coupon("Summer20", Timestamp::now())
            .await?
            .completed()
            .expect("coupon should be valid");

        assert_eq!(checked.uuid, created.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_code_is_a_friendly_rejection() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.coupons.create_coupon(window_coupon("TWICE")).await?;

        let outcome = ctx.coupons.create_coupon(window_coupon("twice")).await?;

        assert_eq!(
            outcome.rejection_message(),
            Some("A coupon with this code already exists")
        );

        Ok(())
    }

    #[tokio::test]
    async fn percentage_out_of_range_is_a_field_error() {
        let ctx = TestContext::new().await;

        let result = ctx
            .coupons
            .create_coupon(NewCoupon {
                discount_percentage: Decimal::from(101),
                ..window_coupon("TOOBIG")
            })
            .await;

        match result {
            Err(CouponsServiceError::Validation(errors)) => {
                assert_eq!(
                    errors.messages("discount_percentage"),
                    ["Discount percentage must be between 0 and 100"]
                );
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_code_is_invalid() -> TestResult {
        let ctx = TestContext::new().await;

        let outcome = ctx.coupons.check_coupon("GHOST", Timestamp::now()).await?;

        assert_eq!(outcome.rejection_message(), Some("Invalid or expired coupon"));

        Ok(())
    }

    #[tokio::test]
    async fn disabled_code_is_invalid() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.coupons
            .create_coupon(NewCoupon {
                is_enabled: false,
                ..window_coupon("DARK")
            })
            .await?;

        let outcome = ctx.coupons.check_coupon("DARK", Timestamp::now()).await?;

        assert!(outcome.is_rejected());

        Ok(())
    }

    #[tokio::test]
    async fn expired_code_is_invalid() -> TestResult {
        let ctx = TestContext::new().await;

        let now = Timestamp::now();

        ctx.coupons
            .create_coupon(NewCoupon {
                starts_at: now - Span::new().hours(48),
                ends_at: now - Span::new().hours(24),
                ..window_coupon("BYGONE")
            })
            .await?;

        let outcome = ctx.coupons.check_coupon("BYGONE", now).await?;

        assert!(outcome.is_rejected());

        Ok(())
    }

    #[tokio::test]
    async fn not_yet_started_code_is_invalid() -> TestResult {
        let ctx = TestContext::new().await;

        let now = Timestamp::now();

        ctx.coupons
            .create_coupon(NewCoupon {
                starts_at: now + Span::new().hours(24),
                ends_at: now + Span::new().hours(48),
                ..window_coupon("SOON")
            })
            .await?;

        let outcome = ctx.coupons.check_coupon("SOON", now).await?;

        assert!(outcome.is_rejected());

        Ok(())
    }

    #[tokio::test]
    async fn window_bounds_are_inclusive() -> TestResult {
        let ctx = TestContext::new().await;

        let coupon = window_coupon("EDGES");
        let starts_at = coupon.starts_at;
        let ends_at = coupon.ends_at;

        ctx.coupons.create_coupon(coupon).await?;

        assert!(
            ctx.coupons
                .check_coupon("EDGES", starts_at)
                .await?
                .completed()
                .is_some()
        );
        assert!(
            ctx.coupons
                .check_coupon("EDGES", ends_at)
                .await?
                .completed()
                .is_some()
        );

        Ok(())
    }
}
