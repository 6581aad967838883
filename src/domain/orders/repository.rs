//! Orders Repository
//!
//! Order rows never change shape after creation; the only updates flip the
//! payment and delivery flags.

use jiff::Timestamp;
use sqlx::{FromRow, Row, Sqlite, Transaction, sqlite::SqliteRow, query, query_as};

use crate::{
    database::{try_get_amount, try_get_timestamp, try_get_timestamp_opt, try_get_uuid},
    domain::{
        carts::{line_items::LineItem, pricing::PriceTotals},
        orders::models::{Order, OrderUuid, PaymentResult},
        users::models::{PaymentMethod, ShippingAddress, UserUuid},
    },
    money::format_amount,
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const INSERT_ORDER_ITEM_SQL: &str = include_str!("sql/insert_order_item.sql");
const FIND_ORDER_SQL: &str = include_str!("sql/find_order.sql");
const LIST_ORDERS_FOR_USER_SQL: &str = include_str!("sql/list_orders_for_user.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");
const MARK_PAID_SQL: &str = include_str!("sql/mark_paid.sql");
const MARK_DELIVERED_SQL: &str = include_str!("sql/mark_delivered.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteOrdersRepository;

impl SqliteOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user: UserUuid,
        items: Vec<LineItem>,
        address: ShippingAddress,
        method: PaymentMethod,
        totals: PriceTotals,
        now: Timestamp,
    ) -> Result<Order, sqlx::Error> {
        let uuid = OrderUuid::new();

        let address_json =
            serde_json::to_string(&address).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        query(CREATE_ORDER_SQL)
            .bind(uuid.into_uuid().to_string())
            .bind(user.into_uuid().to_string())
            .bind(address_json)
            .bind(method.as_str())
            .bind(format_amount(totals.items_price))
            .bind(format_amount(totals.shipping_price))
            .bind(format_amount(totals.tax_price))
            .bind(format_amount(totals.total_price))
            .bind(now.to_string())
            .execute(&mut **tx)
            .await?;

        for (position, item) in items.iter().enumerate() {
            query(INSERT_ORDER_ITEM_SQL)
                .bind(uuid.into_uuid().to_string())
                .bind(position as i64)
                .bind(item.product_uuid.into_uuid().to_string())
                .bind(&item.name)
                .bind(&item.slug)
                .bind(&item.image)
                .bind(format_amount(item.unit_price))
                .bind(i64::from(item.quantity))
                .bind(item.size.as_deref())
                .bind(item.color.as_deref())
                .execute(&mut **tx)
                .await?;
        }

        Ok(Order {
            uuid,
            user_uuid: user,
            items,
            shipping_address: address,
            payment_method: method,
            totals,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            payment_result: None,
            created_at: now,
        })
    }

    pub(crate) async fn find_order(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        order: OrderUuid,
    ) -> Result<Option<Order>, sqlx::Error> {
        query_as::<Sqlite, Order>(FIND_ORDER_SQL)
            .bind(order.into_uuid().to_string())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders_for_user(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user: UserUuid,
    ) -> Result<Vec<Order>, sqlx::Error> {
        query_as::<Sqlite, Order>(LIST_ORDERS_FOR_USER_SQL)
            .bind(user.into_uuid().to_string())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_items(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        order: OrderUuid,
    ) -> Result<Vec<LineItem>, sqlx::Error> {
        query_as::<Sqlite, LineItem>(GET_ORDER_ITEMS_SQL)
            .bind(order.into_uuid().to_string())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn mark_paid(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        order: OrderUuid,
        payment: &PaymentResult,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        let payment_json =
            serde_json::to_string(payment).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        query(MARK_PAID_SQL)
            .bind(now.to_string())
            .bind(payment_json)
            .bind(order.into_uuid().to_string())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn mark_delivered(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        order: OrderUuid,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        query(MARK_DELIVERED_SQL)
            .bind(now.to_string())
            .bind(order.into_uuid().to_string())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, SqliteRow> for Order {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let address_raw: String = row.try_get("shipping_address")?;

        let shipping_address = serde_json::from_str::<ShippingAddress>(&address_raw).map_err(
            |e| sqlx::Error::ColumnDecode {
                index: "shipping_address".to_string(),
                source: Box::new(e),
            },
        )?;

        let method_raw: String = row.try_get("payment_method")?;

        let payment_method =
            method_raw
                .parse::<PaymentMethod>()
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: "payment_method".to_string(),
                    source: Box::new(e),
                })?;

        let payment_result: Option<String> = row.try_get("payment_result")?;

        let payment_result = payment_result
            .map(|raw| {
                serde_json::from_str::<PaymentResult>(&raw).map_err(|e| {
                    sqlx::Error::ColumnDecode {
                        index: "payment_result".to_string(),
                        source: Box::new(e),
                    }
                })
            })
            .transpose()?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(try_get_uuid(row, "uuid")?),
            user_uuid: UserUuid::from_uuid(try_get_uuid(row, "user_uuid")?),
            // Items live in their own table; the service fills them in.
            items: Vec::new(),
            shipping_address,
            payment_method,
            totals: PriceTotals {
                items_price: try_get_amount(row, "items_price")?,
                shipping_price: try_get_amount(row, "shipping_price")?,
                tax_price: try_get_amount(row, "tax_price")?,
                total_price: try_get_amount(row, "total_price")?,
            },
            is_paid: row.try_get("is_paid")?,
            paid_at: try_get_timestamp_opt(row, "paid_at")?,
            is_delivered: row.try_get("is_delivered")?,
            delivered_at: try_get_timestamp_opt(row, "delivered_at")?,
            payment_result,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}
