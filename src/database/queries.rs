use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::audit::entry::HistoryEntry;
use crate::database::models::*;
use crate::error::SupplyChainError;

/// Reads and reference-data inserts. Shipment rows are only ever written
/// through [`crate::shipments::ShipmentStore`].
pub struct Queries;

impl Queries {
    pub async fn insert_supplier(pool: &SqlitePool, supplier_name: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO suppliers (supplier_name) VALUES (?)")
            .bind(supplier_name)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_product(
        pool: &SqlitePool,
        product_name: &str,
        category: &str,
        unit_price: f64,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO products (product_name, category, unit_price)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(product_name)
        .bind(category)
        .bind(unit_price)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_warehouse(pool: &SqlitePool, warehouse_name: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO warehouses (warehouse_name) VALUES (?)")
            .bind(warehouse_name)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_order(
        pool: &SqlitePool,
        product_id: i64,
        supplier_id: i64,
        quantity: i64,
        order_date: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (product_id, supplier_id, quantity, order_date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(product_id)
        .bind(supplier_id)
        .bind(quantity)
        .bind(order_date)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_shipping_time(
        pool: &SqlitePool,
        shipment_date: NaiveDate,
        shipping_time: i64,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO time (shipment_date, shipping_time) VALUES (?, ?)")
            .bind(shipment_date)
            .bind(shipping_time)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get_order(pool: &SqlitePool, order_id: i64) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT order_id, product_id, supplier_id, quantity, order_date
            FROM orders
            WHERE order_id = ?
            "#,
        )
        .bind(order_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_orders(pool: &SqlitePool) -> Result<Vec<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT order_id, product_id, supplier_id, quantity, order_date
            FROM orders
            ORDER BY order_id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn get_shipment(
        pool: &SqlitePool,
        shipment_id: i64,
    ) -> Result<Option<Shipment>, sqlx::Error> {
        sqlx::query_as::<_, Shipment>(
            r#"
            SELECT shipment_id, order_id, warehouse_id, shipment_date
            FROM shipments
            WHERE shipment_id = ?
            "#,
        )
        .bind(shipment_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_shipments(pool: &SqlitePool) -> Result<Vec<Shipment>, sqlx::Error> {
        sqlx::query_as::<_, Shipment>(
            r#"
            SELECT shipment_id, order_id, warehouse_id, shipment_date
            FROM shipments
            ORDER BY shipment_id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn list_shipping_times(pool: &SqlitePool) -> Result<Vec<ShippingTime>, sqlx::Error> {
        sqlx::query_as::<_, ShippingTime>(
            "SELECT date_id, shipment_date, shipping_time FROM time ORDER BY date_id",
        )
        .fetch_all(pool)
        .await
    }

    /// Rows of the `shipment_details` view
    pub async fn shipment_details(pool: &SqlitePool) -> Result<Vec<ShipmentDetail>, sqlx::Error> {
        sqlx::query_as::<_, ShipmentDetail>(
            r#"
            SELECT shipment_id, shipment_date, order_id, order_date, quantity,
                   product_name, category, supplier_name, warehouse_name
            FROM shipment_details
            ORDER BY shipment_id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Full history log in insertion order
    pub async fn list_history(pool: &SqlitePool) -> Result<Vec<HistoryEntry>, SupplyChainError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT history_id, shipment_id, operation_type, old_shipment_date,
                   new_shipment_date, change_timestamp, previous_hash, entry_hash
            FROM shipment_history
            ORDER BY history_id
            "#,
        )
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(HistoryEntry::try_from).collect()
    }

    /// History of one shipment in insertion order. Works for shipments that
    /// have since been deleted.
    pub async fn history_for_shipment(
        pool: &SqlitePool,
        shipment_id: i64,
    ) -> Result<Vec<HistoryEntry>, SupplyChainError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT history_id, shipment_id, operation_type, old_shipment_date,
                   new_shipment_date, change_timestamp, previous_hash, entry_hash
            FROM shipment_history
            WHERE shipment_id = ?
            ORDER BY history_id
            "#,
        )
        .bind(shipment_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(HistoryEntry::try_from).collect()
    }

    pub async fn count_history(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM shipment_history")
            .fetch_one(pool)
            .await
    }
}
