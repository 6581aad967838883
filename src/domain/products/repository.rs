//! Products Repository

use jiff::Timestamp;
use rust_decimal::Decimal;
use sqlx::{FromRow, Row, Sqlite, Transaction, sqlite::SqliteRow, query, query_as};

use crate::{
    database::{try_get_amount, try_get_timestamp, try_get_uuid},
    domain::products::models::{NewProduct, Product, ProductUuid},
    money::format_amount,
};

const FIND_PRODUCT_SQL: &str = include_str!("sql/find_product.sql");
const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");
const EARLIEST_PRODUCT_SQL: &str = include_str!("sql/earliest_product.sql");
const UPDATE_PRODUCT_RATING_SQL: &str = include_str!("sql/update_product_rating.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteProductsRepository;

impl SqliteProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_product(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product: ProductUuid,
    ) -> Result<Option<Product>, sqlx::Error> {
        query_as::<Sqlite, Product>(FIND_PRODUCT_SQL)
            .bind(product.into_uuid().to_string())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> Result<Vec<Product>, sqlx::Error> {
        query_as::<Sqlite, Product>(LIST_PRODUCTS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product: NewProduct,
        now: Timestamp,
    ) -> Result<Product, sqlx::Error> {
        query(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid().to_string())
            .bind(&product.name)
            .bind(&product.slug)
            .bind(&product.image)
            .bind(&product.category)
            .bind(format_amount(product.price))
            .bind(product.stock)
            .bind(now.to_string())
            .bind(now.to_string())
            .execute(&mut **tx)
            .await?;

        Ok(Product {
            uuid: product.uuid,
            name: product.name,
            slug: product.slug,
            image: product.image,
            category: product.category,
            price: product.price,
            stock: product.stock,
            rating: Decimal::ZERO,
            num_reviews: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub(crate) async fn delete_product(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid().to_string())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Earliest-created product, used as the promotion fallback subject.
    pub(crate) async fn earliest_product(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> Result<Option<Product>, sqlx::Error> {
        query_as::<Sqlite, Product>(EARLIEST_PRODUCT_SQL)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn update_rating(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        product: ProductUuid,
        rating: Decimal,
        num_reviews: i64,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_PRODUCT_RATING_SQL)
            .bind(rating.to_string())
            .bind(num_reviews)
            .bind(now.to_string())
            .bind(product.into_uuid().to_string())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Product {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(try_get_uuid(row, "uuid")?),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            image: row.try_get("image")?,
            category: row.try_get("category")?,
            price: try_get_amount(row, "price")?,
            stock: row.try_get("stock")?,
            rating: try_get_amount(row, "rating")?,
            num_reviews: row.try_get("num_reviews")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}
