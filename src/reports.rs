//! Supply Chain Reports
//!
//! Read-only aggregate queries over the supply chain schema and the
//! shipment history log.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::database::models::Order;
use crate::error::SupplyChainError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategorySales {
    pub category: String,
    pub total_quantity: i64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SupplierPerformance {
    pub supplier_id: i64,
    pub supplier_name: String,
    pub order_count: i64,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WarehouseShippingTime {
    pub warehouse_id: i64,
    pub warehouse_name: String,
    pub shipment_count: i64,
    pub avg_shipping_days: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SupplierYearOverYear {
    pub supplier_id: i64,
    pub supplier_name: String,
    pub year: i64,
    pub total_quantity: i64,
    pub previous_year_quantity: Option<i64>,
    /// Percentage change against the previous year; `None` when there is
    /// no previous year to compare with.
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShipmentChangeSummary {
    pub shipment_id: i64,
    pub update_count: i64,
    pub delete_count: i64,
    pub total_changes: i64,
}

/// Ordered quantity and revenue per product category, highest revenue first
pub async fn sales_by_category(pool: &SqlitePool) -> Result<Vec<CategorySales>, sqlx::Error> {
    sqlx::query_as::<_, CategorySales>(
        r#"
        SELECT
            p.category AS category,
            CAST(SUM(o.quantity) AS INTEGER) AS total_quantity,
            CAST(SUM(o.quantity * p.unit_price) AS REAL) AS total_revenue
        FROM orders o
        JOIN products p ON p.product_id = o.product_id
        GROUP BY p.category
        ORDER BY total_revenue DESC, category
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Order count and volume per supplier, including suppliers with no orders
pub async fn supplier_performance(pool: &SqlitePool) -> Result<Vec<SupplierPerformance>, sqlx::Error> {
    sqlx::query_as::<_, SupplierPerformance>(
        r#"
        SELECT
            s.supplier_id AS supplier_id,
            s.supplier_name AS supplier_name,
            CAST(COUNT(o.order_id) AS INTEGER) AS order_count,
            CAST(COALESCE(SUM(o.quantity), 0) AS INTEGER) AS total_quantity
        FROM suppliers s
        LEFT JOIN orders o ON o.supplier_id = s.supplier_id
        GROUP BY s.supplier_id, s.supplier_name
        ORDER BY total_quantity DESC, s.supplier_id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Average shipping time per warehouse. The time dimension is keyed by
/// shipment date, so it is averaged per date before joining.
pub async fn warehouse_shipping_times(
    pool: &SqlitePool,
) -> Result<Vec<WarehouseShippingTime>, sqlx::Error> {
    sqlx::query_as::<_, WarehouseShippingTime>(
        r#"
        SELECT
            w.warehouse_id AS warehouse_id,
            w.warehouse_name AS warehouse_name,
            CAST(COUNT(s.shipment_id) AS INTEGER) AS shipment_count,
            CAST(AVG(t.days) AS REAL) AS avg_shipping_days
        FROM shipments s
        JOIN warehouses w ON w.warehouse_id = s.warehouse_id
        JOIN (
            SELECT shipment_date, AVG(shipping_time) AS days
            FROM time
            GROUP BY shipment_date
        ) t ON t.shipment_date = s.shipment_date
        GROUP BY w.warehouse_id, w.warehouse_name
        ORDER BY avg_shipping_days, w.warehouse_id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Yearly order volume per supplier next to the previous year's volume
pub async fn supplier_year_over_year(
    pool: &SqlitePool,
) -> Result<Vec<SupplierYearOverYear>, sqlx::Error> {
    sqlx::query_as::<_, SupplierYearOverYear>(
        r#"
        WITH yearly AS (
            SELECT
                supplier_id,
                CAST(strftime('%Y', order_date) AS INTEGER) AS year,
                SUM(quantity) AS total_quantity
            FROM orders
            GROUP BY supplier_id, year
        )
        SELECT
            cur.supplier_id AS supplier_id,
            s.supplier_name AS supplier_name,
            cur.year AS year,
            CAST(cur.total_quantity AS INTEGER) AS total_quantity,
            CAST(prev.total_quantity AS INTEGER) AS previous_year_quantity,
            CASE
                WHEN prev.total_quantity IS NULL OR prev.total_quantity = 0 THEN NULL
                ELSE CAST((cur.total_quantity - prev.total_quantity) * 100.0 / prev.total_quantity AS REAL)
            END AS change_pct
        FROM yearly cur
        JOIN suppliers s ON s.supplier_id = cur.supplier_id
        LEFT JOIN yearly prev
            ON prev.supplier_id = cur.supplier_id
           AND prev.year = cur.year - 1
        ORDER BY cur.supplier_id, cur.year
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Orders placed with one supplier, optionally bounded by `from` and `to`
/// (both inclusive). A missing bound leaves that side of the range open.
pub async fn orders_for_supplier(
    pool: &SqlitePool,
    supplier_id: i64,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<Order>, SupplyChainError> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(SupplyChainError::ValidationError(format!(
                "Invalid date range: {} is after {}",
                from, to
            )));
        }
    }

    let orders = sqlx::query_as::<_, Order>(
        r#"
        SELECT order_id, product_id, supplier_id, quantity, order_date
        FROM orders
        WHERE supplier_id = ?1
          AND (?2 IS NULL OR order_date >= ?2)
          AND (?3 IS NULL OR order_date <= ?3)
        ORDER BY order_date, order_id
        "#,
    )
    .bind(supplier_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    debug!(supplier_id, count = orders.len(), "Loaded supplier orders");
    Ok(orders)
}

/// Number of recorded changes per shipment, including deleted shipments
pub async fn shipment_change_summary(
    pool: &SqlitePool,
) -> Result<Vec<ShipmentChangeSummary>, sqlx::Error> {
    sqlx::query_as::<_, ShipmentChangeSummary>(
        r#"
        SELECT
            shipment_id,
            CAST(SUM(CASE WHEN operation_type = 'UPDATE' THEN 1 ELSE 0 END) AS INTEGER) AS update_count,
            CAST(SUM(CASE WHEN operation_type = 'DELETE' THEN 1 ELSE 0 END) AS INTEGER) AS delete_count,
            CAST(COUNT(*) AS INTEGER) AS total_changes
        FROM shipment_history
        GROUP BY shipment_id
        ORDER BY shipment_id
        "#,
    )
    .fetch_all(pool)
    .await
}
