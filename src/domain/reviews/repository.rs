//! Reviews Repository

use jiff::Timestamp;
use sqlx::{FromRow, Row, Sqlite, Transaction, sqlite::SqliteRow, query, query_as};

use crate::{
    database::{try_get_timestamp, try_get_uuid},
    domain::{
        products::models::ProductUuid,
        reviews::models::{NewReview, Review, ReviewUuid},
        users::models::UserUuid,
    },
};

const UPSERT_REVIEW_SQL: &str = include_str!("sql/upsert_review.sql");
const FIND_REVIEW_SQL: &str = include_str!("sql/find_review.sql");
const LIST_REVIEWS_SQL: &str = include_str!("sql/list_reviews.sql");
const AGGREGATE_REVIEWS_SQL: &str = include_str!("sql/aggregate_reviews.sql");

/// Sum and count of a product's ratings, inputs to the stored aggregate.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RatingAggregate {
    pub(crate) rating_sum: i64,
    pub(crate) num_reviews: i64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteReviewsRepository;

impl SqliteReviewsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn upsert_review(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        review: NewReview,
        now: Timestamp,
    ) -> Result<Review, sqlx::Error> {
        query(UPSERT_REVIEW_SQL)
            .bind(ReviewUuid::new().into_uuid().to_string())
            .bind(review.product_uuid.into_uuid().to_string())
            .bind(review.user_uuid.into_uuid().to_string())
            .bind(i64::from(review.rating))
            .bind(&review.title)
            .bind(&review.comment)
            .bind(now.to_string())
            .bind(now.to_string())
            .execute(&mut **tx)
            .await?;

        self.find_review(tx, review.product_uuid, review.user_uuid)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub(crate) async fn find_review(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product: ProductUuid,
        user: UserUuid,
    ) -> Result<Option<Review>, sqlx::Error> {
        query_as::<Sqlite, Review>(FIND_REVIEW_SQL)
            .bind(product.into_uuid().to_string())
            .bind(user.into_uuid().to_string())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_reviews(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product: ProductUuid,
    ) -> Result<Vec<Review>, sqlx::Error> {
        query_as::<Sqlite, Review>(LIST_REVIEWS_SQL)
            .bind(product.into_uuid().to_string())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn aggregate_reviews(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product: ProductUuid,
    ) -> Result<RatingAggregate, sqlx::Error> {
        let row = query(AGGREGATE_REVIEWS_SQL)
            .bind(product.into_uuid().to_string())
            .fetch_one(&mut **tx)
            .await?;

        Ok(RatingAggregate {
            rating_sum: row.try_get("rating_sum")?,
            num_reviews: row.try_get("num_reviews")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for Review {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let rating_i64: i64 = row.try_get("rating")?;

        let rating = u8::try_from(rating_i64).map_err(|e| sqlx::Error::ColumnDecode {
            index: "rating".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: ReviewUuid::from_uuid(try_get_uuid(row, "uuid")?),
            product_uuid: ProductUuid::from_uuid(try_get_uuid(row, "product_uuid")?),
            user_uuid: UserUuid::from_uuid(try_get_uuid(row, "user_uuid")?),
            rating,
            title: row.try_get("title")?,
            comment: row.try_get("comment")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}
