//! Carts Repository

use jiff::Timestamp;
use sqlx::{FromRow, Sqlite, Transaction, sqlite::SqliteRow, query, query_as};

use crate::{
    database::{try_get_amount, try_get_timestamp, try_get_uuid, try_get_uuid_opt},
    domain::carts::{
        models::{Cart, CartUuid},
        owner::{CartOwner, SessionUuid},
        pricing::PriceTotals,
    },
    domain::users::models::UserUuid,
    money::format_amount,
};

const GET_CART_BY_USER_SQL: &str = include_str!("../sql/get_cart_by_user.sql");
const GET_CART_BY_SESSION_SQL: &str = include_str!("../sql/get_cart_by_session.sql");
const CREATE_CART_SQL: &str = include_str!("../sql/create_cart.sql");
const UPDATE_CART_TOTALS_SQL: &str = include_str!("../sql/update_cart_totals.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteCartsRepository;

impl SqliteCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Finds the cart row for an owner. Items are loaded separately.
    pub(crate) async fn find_cart(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        owner: &CartOwner,
    ) -> Result<Option<Cart>, sqlx::Error> {
        let (sql, key) = match owner {
            CartOwner::User(user) => (GET_CART_BY_USER_SQL, user.into_uuid()),
            CartOwner::Session(session) => (GET_CART_BY_SESSION_SQL, session.into_uuid()),
        };

        query_as::<Sqlite, Cart>(sql)
            .bind(key.to_string())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_cart(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        cart: CartUuid,
        owner: &CartOwner,
        totals: &PriceTotals,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        let (user_uuid, session_uuid) = match owner {
            CartOwner::User(user) => (Some(user.into_uuid().to_string()), None),
            CartOwner::Session(session) => (None, Some(session.into_uuid().to_string())),
        };

        query(CREATE_CART_SQL)
            .bind(cart.into_uuid().to_string())
            .bind(user_uuid)
            .bind(session_uuid)
            .bind(format_amount(totals.items_price))
            .bind(format_amount(totals.shipping_price))
            .bind(format_amount(totals.tax_price))
            .bind(format_amount(totals.total_price))
            .bind(now.to_string())
            .bind(now.to_string())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn update_totals(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        cart: CartUuid,
        totals: &PriceTotals,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        query(UPDATE_CART_TOTALS_SQL)
            .bind(format_amount(totals.items_price))
            .bind(format_amount(totals.shipping_price))
            .bind(format_amount(totals.tax_price))
            .bind(format_amount(totals.total_price))
            .bind(now.to_string())
            .bind(cart.into_uuid().to_string())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, SqliteRow> for Cart {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let user_uuid = try_get_uuid_opt(row, "user_uuid")?;
        let session_uuid = try_get_uuid_opt(row, "session_uuid")?;

        // The schema CHECK guarantees exactly one owner column is set.
        let owner = match (user_uuid, session_uuid) {
            (Some(user), None) => CartOwner::User(UserUuid::from_uuid(user)),
            (None, Some(session)) => CartOwner::Session(SessionUuid::from_uuid(session)),
            _ => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "user_uuid".to_string(),
                    source: "cart row must have exactly one owner".into(),
                });
            }
        };

        Ok(Self {
            uuid: CartUuid::from_uuid(try_get_uuid(row, "uuid")?),
            owner,
            items: Vec::new(),
            totals: PriceTotals {
                items_price: try_get_amount(row, "items_price")?,
                shipping_price: try_get_amount(row, "shipping_price")?,
                tax_price: try_get_amount(row, "tax_price")?,
                total_price: try_get_amount(row, "total_price")?,
            },
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}
