//! Coupons Repository

use jiff::Timestamp;
use sqlx::{FromRow, Row, Sqlite, Transaction, sqlite::SqliteRow, query, query_as};

use crate::{
    database::{try_get_amount, try_get_timestamp, try_get_uuid},
    domain::coupons::models::{Coupon, CouponUuid, NewCoupon},
    money::format_amount,
};

const INSERT_COUPON_SQL: &str = include_str!("sql/insert_coupon.sql");
const FIND_COUPON_BY_CODE_SQL: &str = include_str!("sql/find_coupon_by_code.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteCouponsRepository;

impl SqliteCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Inserts a coupon. The caller has already upper-cased the code.
    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        coupon: NewCoupon,
        now: Timestamp,
    ) -> Result<Coupon, sqlx::Error> {
        let uuid = CouponUuid::new();

        query(INSERT_COUPON_SQL)
            .bind(uuid.into_uuid().to_string())
            .bind(&coupon.code)
            .bind(format_amount(coupon.discount_percentage))
            .bind(coupon.starts_at.to_string())
            .bind(coupon.ends_at.to_string())
            .bind(coupon.is_enabled)
            .bind(now.to_string())
            .execute(&mut **tx)
            .await?;

        Ok(Coupon {
            uuid,
            code: coupon.code,
            discount_percentage: coupon.discount_percentage,
            starts_at: coupon.starts_at,
            ends_at: coupon.ends_at,
            is_enabled: coupon.is_enabled,
            created_at: now,
        })
    }

    pub(crate) async fn find_coupon_by_code(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        code: &str,
    ) -> Result<Option<Coupon>, sqlx::Error> {
        query_as::<Sqlite, Coupon>(FIND_COUPON_BY_CODE_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, SqliteRow> for Coupon {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CouponUuid::from_uuid(try_get_uuid(row, "uuid")?),
            code: row.try_get("code")?,
            discount_percentage: try_get_amount(row, "discount_percentage")?,
            starts_at: try_get_timestamp(row, "starts_at")?,
            ends_at: try_get_timestamp(row, "ends_at")?,
            is_enabled: row.try_get("is_enabled")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}
