//! Cart Items Repository

use sqlx::{FromRow, Row, Sqlite, Transaction, sqlite::SqliteRow, query, query_as};

use crate::{
    database::{try_get_amount, try_get_uuid},
    domain::{
        carts::{line_items::LineItem, models::CartUuid},
        products::models::ProductUuid,
    },
    money::format_amount,
};

const GET_CART_ITEMS_SQL: &str = include_str!("../sql/get_cart_items.sql");
const DELETE_CART_ITEMS_SQL: &str = include_str!("../sql/delete_cart_items.sql");
const INSERT_CART_ITEM_SQL: &str = include_str!("../sql/insert_cart_item.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteCartItemsRepository;

impl SqliteCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart_items(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        cart: CartUuid,
    ) -> Result<Vec<LineItem>, sqlx::Error> {
        query_as::<Sqlite, LineItem>(GET_CART_ITEMS_SQL)
            .bind(cart.into_uuid().to_string())
            .fetch_all(&mut **tx)
            .await
    }

    /// Rewrites the full item list for a cart, preserving list order through
    /// the position column. Runs inside the caller's transaction, so the
    /// delete and the inserts land together.
    pub(crate) async fn replace_items(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        cart: CartUuid,
        items: &[LineItem],
    ) -> Result<(), sqlx::Error> {
        query(DELETE_CART_ITEMS_SQL)
            .bind(cart.into_uuid().to_string())
            .execute(&mut **tx)
            .await?;

        for (position, item) in items.iter().enumerate() {
            query(INSERT_CART_ITEM_SQL)
                .bind(cart.into_uuid().to_string())
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

        Ok(())
    }
}

impl<'r> FromRow<'r, SqliteRow> for LineItem {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let quantity_i64: i64 = row.try_get("quantity")?;

        let quantity = u32::try_from(quantity_i64).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            product_uuid: ProductUuid::from_uuid(try_get_uuid(row, "product_uuid")?),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            image: row.try_get("image")?,
            unit_price: try_get_amount(row, "unit_price")?,
            quantity,
            size: row.try_get("size")?,
            color: row.try_get("color")?,
        })
    }
}
