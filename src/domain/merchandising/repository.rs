//! Merchandising Repository
//!
//! Promotion and upsell slots hold at most one effective row: reads take the
//! earliest row, writes update it in place or insert the first one.

use jiff::Timestamp;
use sqlx::{FromRow, Row, Sqlite, Transaction, sqlite::SqliteRow, query, query_as};

use crate::{
    database::{try_get_amount, try_get_timestamp, try_get_uuid},
    domain::{
        merchandising::models::{
            NewPresell, NewPromotion, NewUpsell, Presell, PresellUuid, Promotion, PromotionUuid,
            Upsell, UpsellUuid,
        },
        products::models::ProductUuid,
    },
    money::format_amount,
};

const FIRST_PROMOTION_SQL: &str = include_str!("sql/first_promotion.sql");
const INSERT_PROMOTION_SQL: &str = include_str!("sql/insert_promotion.sql");
const UPDATE_PROMOTION_SQL: &str = include_str!("sql/update_promotion.sql");
const FIRST_UPSELL_SQL: &str = include_str!("sql/first_upsell.sql");
const INSERT_UPSELL_SQL: &str = include_str!("sql/insert_upsell.sql");
const UPDATE_UPSELL_SQL: &str = include_str!("sql/update_upsell.sql");
const FIND_PRESELL_SQL: &str = include_str!("sql/find_presell.sql");
const UPSERT_PRESELL_SQL: &str = include_str!("sql/upsert_presell.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteMerchandisingRepository;

impl SqliteMerchandisingRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn first_promotion(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> Result<Option<Promotion>, sqlx::Error> {
        query_as::<Sqlite, Promotion>(FIRST_PROMOTION_SQL)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn set_promotion(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        promotion: NewPromotion,
        now: Timestamp,
    ) -> Result<Promotion, sqlx::Error> {
        if let Some(existing) = self.first_promotion(tx).await? {
            query(UPDATE_PROMOTION_SQL)
                .bind(promotion.product_uuid.into_uuid().to_string())
                .bind(format_amount(promotion.discount_percentage))
                .bind(promotion.ends_at.to_string())
                .bind(promotion.is_enabled)
                .bind(existing.uuid.into_uuid().to_string())
                .execute(&mut **tx)
                .await?;

            return Ok(Promotion {
                uuid: existing.uuid,
                product_uuid: promotion.product_uuid,
                discount_percentage: promotion.discount_percentage,
                ends_at: promotion.ends_at,
                is_enabled: promotion.is_enabled,
                created_at: existing.created_at,
            });
        }

        let uuid = PromotionUuid::new();

        query(INSERT_PROMOTION_SQL)
            .bind(uuid.into_uuid().to_string())
            .bind(promotion.product_uuid.into_uuid().to_string())
            .bind(format_amount(promotion.discount_percentage))
            .bind(promotion.ends_at.to_string())
            .bind(promotion.is_enabled)
            .bind(now.to_string())
            .execute(&mut **tx)
            .await?;

        Ok(Promotion {
            uuid,
            product_uuid: promotion.product_uuid,
            discount_percentage: promotion.discount_percentage,
            ends_at: promotion.ends_at,
            is_enabled: promotion.is_enabled,
            created_at: now,
        })
    }

    pub(crate) async fn first_upsell(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> Result<Option<Upsell>, sqlx::Error> {
        query_as::<Sqlite, Upsell>(FIRST_UPSELL_SQL)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn set_upsell(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        upsell: NewUpsell,
        now: Timestamp,
    ) -> Result<Upsell, sqlx::Error> {
        if let Some(existing) = self.first_upsell(tx).await? {
            query(UPDATE_UPSELL_SQL)
                .bind(upsell.product_uuid.into_uuid().to_string())
                .bind(upsell.is_enabled)
                .bind(existing.uuid.into_uuid().to_string())
                .execute(&mut **tx)
                .await?;

            return Ok(Upsell {
                uuid: existing.uuid,
                product_uuid: upsell.product_uuid,
                is_enabled: upsell.is_enabled,
                created_at: existing.created_at,
            });
        }

        let uuid = UpsellUuid::new();

        query(INSERT_UPSELL_SQL)
            .bind(uuid.into_uuid().to_string())
            .bind(upsell.product_uuid.into_uuid().to_string())
            .bind(upsell.is_enabled)
            .bind(now.to_string())
            .execute(&mut **tx)
            .await?;

        Ok(Upsell {
            uuid,
            product_uuid: upsell.product_uuid,
            is_enabled: upsell.is_enabled,
            created_at: now,
        })
    }

    pub(crate) async fn find_presell(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        category: &str,
    ) -> Result<Option<Presell>, sqlx::Error> {
        query_as::<Sqlite, Presell>(FIND_PRESELL_SQL)
            .bind(category)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn upsert_presell(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        presell: NewPresell,
        now: Timestamp,
    ) -> Result<Presell, sqlx::Error> {
        query(UPSERT_PRESELL_SQL)
            .bind(PresellUuid::new().into_uuid().to_string())
            .bind(&presell.category)
            .bind(presell.product_uuid.into_uuid().to_string())
            .bind(presell.is_enabled)
            .bind(now.to_string())
            .execute(&mut **tx)
            .await?;

        self.find_presell(tx, &presell.category)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Promotion {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PromotionUuid::from_uuid(try_get_uuid(row, "uuid")?),
            product_uuid: ProductUuid::from_uuid(try_get_uuid(row, "product_uuid")?),
            discount_percentage: try_get_amount(row, "discount_percentage")?,
            ends_at: try_get_timestamp(row, "ends_at")?,
            is_enabled: row.try_get("is_enabled")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for Upsell {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: UpsellUuid::from_uuid(try_get_uuid(row, "uuid")?),
            product_uuid: ProductUuid::from_uuid(try_get_uuid(row, "product_uuid")?),
            is_enabled: row.try_get("is_enabled")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for Presell {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PresellUuid::from_uuid(try_get_uuid(row, "uuid")?),
            category: row.try_get("category")?,
            product_uuid: ProductUuid::from_uuid(try_get_uuid(row, "product_uuid")?),
            is_enabled: row.try_get("is_enabled")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}
