//! Reviews service.
//!
//! A submission and the product's stored aggregate move together: the review
//! upsert and the `rating`/`num_reviews` rewrite share one transaction, so the
//! product row always reflects exactly the reviews on file.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;

use crate::{
    database::Db,
    domain::{
        products::{SqliteProductsRepository, models::ProductUuid},
        reviews::{
            errors::ReviewsServiceError,
            models::{NewReview, Review},
            repository::SqliteReviewsRepository,
        },
    },
    money::round2,
    outcome::FieldErrors,
};

#[derive(Debug, Clone)]
pub struct SqliteReviewsService {
    db: Db,
    repository: SqliteReviewsRepository,
    products_repository: SqliteProductsRepository,
}

impl SqliteReviewsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: SqliteReviewsRepository::new(),
            products_repository: SqliteProductsRepository::new(),
        }
    }
}

#[async_trait]
impl ReviewsService for SqliteReviewsService {
    #[tracing::instrument(
        name = "reviews.service.submit_review",
        skip(self, review),
        fields(product_uuid = %review.product_uuid, rating = review.rating),
        err
    )]
    async fn submit_review(&self, review: NewReview) -> Result<Review, ReviewsServiceError> {
        if !(1..=5).contains(&review.rating) {
            let mut errors = FieldErrors::new();
            errors.push("rating", "Rating must be between 1 and 5");
            return Err(ReviewsServiceError::Validation(errors));
        }

        let mut tx = self.db.begin().await?;

        let product = self
            .products_repository
            .find_product(&mut tx, review.product_uuid)
            .await?
            .ok_or(ReviewsServiceError::ProductNotFound)?;

        let now = Timestamp::now();

        let stored = self.repository.upsert_review(&mut tx, review, now).await?;

        let aggregate = self
            .repository
            .aggregate_reviews(&mut tx, product.uuid)
            .await?;

        let mean = round2(
            Decimal::from(aggregate.rating_sum) / Decimal::from(aggregate.num_reviews),
        );

        self.products_repository
            .update_rating(&mut tx, product.uuid, mean, aggregate.num_reviews, now)
            .await?;

        tx.commit().await?;

        Ok(stored)
    }

    async fn list_reviews(&self, product: ProductUuid) -> Result<Vec<Review>, ReviewsServiceError> {
        let mut tx = self.db.begin().await?;

        let reviews = self.repository.list_reviews(&mut tx, product).await?;

        tx.commit().await?;

        Ok(reviews)
    }
}

#[automock]
#[async_trait]
pub trait ReviewsService: Send + Sync {
    /// Records or replaces the user's review and refreshes the product's
    /// stored rating aggregate.
    async fn submit_review(&self, review: NewReview) -> Result<Review, ReviewsServiceError>;

    /// Returns the product's reviews, newest first.
    async fn list_reviews(&self, product: ProductUuid) -> Result<Vec<Review>, ReviewsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{domain::products::ProductsService, test::TestContext};

    use super::*;

    fn review(product: ProductUuid, user: crate::domain::users::models::UserUuid, rating: u8) -> NewReview {
        NewReview {
            product_uuid: product,
            user_uuid: user,
            rating,
            title: "Thoughts".to_string(),
            comment: "As described.".to_string(),
        }
    }

    #[tokio::test]
    async fn sequential_reviews_keep_the_aggregate_true() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_product("Rated Mug", "12.00", 10).await;

        for (n, rating) in [5_u8, 3, 4].into_iter().enumerate() {
            let user = ctx.create_user(&format!("reviewer{n}@example.com")).await;
            ctx.reviews.submit_review(review(product.uuid, user.uuid, rating)).await?;
        }

        let stored = ctx.products.get_product(product.uuid).await?;

        assert_eq!(stored.num_reviews, 3);
        assert_eq!(stored.rating, "4.00".parse::<Decimal>()?);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_reviews_all_land_in_the_aggregate() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_product("Crowd Favourite", "12.00", 10).await;

        let mut users = Vec::new();
        for n in 0..8 {
            users.push(ctx.create_user(&format!("crowd{n}@example.com")).await);
        }

        let mut handles = Vec::new();
        for user in users {
            let reviews = ctx.reviews.clone();
            let new_review = review(product.uuid, user.uuid, 4);
            handles.push(tokio::spawn(async move {
                reviews.submit_review(new_review).await
            }));
        }

        for handle in handles {
            handle.await.expect("task should not panic")?;
        }

        let stored = ctx.products.get_product(product.uuid).await?;

        assert_eq!(stored.num_reviews, 8);
        assert_eq!(stored.rating, "4.00".parse::<Decimal>()?);

        Ok(())
    }

    #[tokio::test]
    async fn resubmitting_replaces_the_review_not_adds_one() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_product("Rated Mug", "12.00", 10).await;
        let user = ctx.create_user("fickle@example.com").await;

        ctx.reviews.submit_review(review(product.uuid, user.uuid, 2)).await?;
        ctx.reviews.submit_review(review(product.uuid, user.uuid, 5)).await?;

        let stored = ctx.products.get_product(product.uuid).await?;

        assert_eq!(stored.num_reviews, 1);
        assert_eq!(stored.rating, "5.00".parse::<Decimal>()?);

        let reviews = ctx.reviews.list_reviews(product.uuid).await?;
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating, 5);

        Ok(())
    }

    #[tokio::test]
    async fn rating_uses_half_up_rounding() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_product("Split Opinion", "12.00", 10).await;

        for (n, rating) in [4_u8, 5].into_iter().enumerate() {
            let user = ctx.create_user(&format!("half{n}@example.com")).await;
            ctx.reviews.submit_review(review(product.uuid, user.uuid, rating)).await?;
        }

        let stored = ctx.products.get_product(product.uuid).await?;

        assert_eq!(stored.rating, "4.50".parse::<Decimal>()?);

        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_rating_is_a_field_error() {
        let ctx = TestContext::new().await;

        let result = ctx
            .reviews
            .submit_review(review(ProductUuid::new(), crate::domain::users::models::UserUuid::new(), 6))
            .await;

        match result {
            Err(ReviewsServiceError::Validation(errors)) => {
                assert_eq!(errors.messages("rating"), ["Rating must be between 1 and 5"]);
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn review_for_unknown_product_is_product_not_found() {
        let ctx = TestContext::new().await;

        let user_uuid = crate::domain::users::models::UserUuid::new();

        let result = ctx
            .reviews
            .submit_review(review(ProductUuid::new(), user_uuid, 4))
            .await;

        assert!(
            matches!(result, Err(ReviewsServiceError::ProductNotFound)),
            "expected ProductNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_reviews_is_newest_first() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx.create_product("Chronicle", "12.00", 10).await;

        let early = ctx.create_user("early@example.com").await;
        let late = ctx.create_user("late@example.com").await;

        ctx.reviews.submit_review(review(product.uuid, early.uuid, 3)).await?;
        ctx.reviews.submit_review(review(product.uuid, late.uuid, 4)).await?;

        let reviews = ctx.reviews.list_reviews(product.uuid).await?;

        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].user_uuid, late.uuid);
        assert_eq!(reviews[1].user_uuid, early.uuid);

        Ok(())
    }
}
