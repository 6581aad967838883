//! Users Repository

use jiff::Timestamp;
use sqlx::{FromRow, Row, Sqlite, Transaction, sqlite::SqliteRow, query, query_as};

use crate::{
    database::{try_get_timestamp, try_get_uuid},
    domain::users::models::{NewUser, PaymentMethod, ShippingAddress, User, UserUuid},
};

const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const FIND_USER_SQL: &str = include_str!("sql/find_user.sql");
const SET_SHIPPING_ADDRESS_SQL: &str = include_str!("sql/set_shipping_address.sql");
const SET_PAYMENT_METHOD_SQL: &str = include_str!("sql/set_payment_method.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteUsersRepository;

impl SqliteUsersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_user(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user: NewUser,
        now: Timestamp,
    ) -> Result<User, sqlx::Error> {
        query(CREATE_USER_SQL)
            .bind(user.uuid.into_uuid().to_string())
            .bind(&user.name)
            .bind(&user.email)
            .bind(now.to_string())
            .bind(now.to_string())
            .execute(&mut **tx)
            .await?;

        Ok(User {
            uuid: user.uuid,
            name: user.name,
            email: user.email,
            shipping_address: None,
            payment_method: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub(crate) async fn find_user(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user: UserUuid,
    ) -> Result<Option<User>, sqlx::Error> {
        query_as::<Sqlite, User>(FIND_USER_SQL)
            .bind(user.into_uuid().to_string())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn set_shipping_address(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user: UserUuid,
        address: &ShippingAddress,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let address_json =
            serde_json::to_string(address).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let rows_affected = query(SET_SHIPPING_ADDRESS_SQL)
            .bind(address_json)
            .bind(now.to_string())
            .bind(user.into_uuid().to_string())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_payment_method(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user: UserUuid,
        method: PaymentMethod,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_PAYMENT_METHOD_SQL)
            .bind(method.as_str())
            .bind(now.to_string())
            .bind(user.into_uuid().to_string())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, SqliteRow> for User {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let shipping_address: Option<String> = row.try_get("shipping_address")?;

        let shipping_address = shipping_address
            .map(|raw| {
                serde_json::from_str::<ShippingAddress>(&raw).map_err(|e| {
                    sqlx::Error::ColumnDecode {
                        index: "shipping_address".to_string(),
                        source: Box::new(e),
                    }
                })
            })
            .transpose()?;

        let payment_method: Option<String> = row.try_get("payment_method")?;

        let payment_method = payment_method
            .map(|raw| {
                raw.parse::<PaymentMethod>()
                    .map_err(|e| sqlx::Error::ColumnDecode {
                        index: "payment_method".to_string(),
                        source: Box::new(e),
                    })
            })
            .transpose()?;

        Ok(Self {
            uuid: UserUuid::from_uuid(try_get_uuid(row, "uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            shipping_address,
            payment_method,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}
