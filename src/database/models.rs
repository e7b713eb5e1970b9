use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::audit::entry::HistoryEntry;
use crate::error::SupplyChainError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub supplier_id: i64,
    pub supplier_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
    pub category: String,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Warehouse {
    pub warehouse_id: i64,
    pub warehouse_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub order_id: i64,
    pub product_id: i64,
    pub supplier_id: i64,
    pub quantity: i64,
    pub order_date: NaiveDate,
}

/// One shipment's tracked state. `shipment_date` is the audited attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Shipment {
    pub shipment_id: i64,
    pub order_id: i64,
    pub warehouse_id: i64,
    pub shipment_date: NaiveDate,
}

/// Row of the `time` dimension: how many days a shipment took.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShippingTime {
    pub date_id: i64,
    pub shipment_date: NaiveDate,
    pub shipping_time: i64,
}

/// Row of the `shipment_details` view
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShipmentDetail {
    pub shipment_id: i64,
    pub shipment_date: NaiveDate,
    pub order_id: i64,
    pub order_date: NaiveDate,
    pub quantity: i64,
    pub product_name: String,
    pub category: String,
    pub supplier_name: String,
    pub warehouse_name: String,
}

/// Raw `shipment_history` row; converted into a [`HistoryEntry`] after
/// the operation type and timestamp are parsed.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRow {
    pub history_id: i64,
    pub shipment_id: i64,
    pub operation_type: String,
    pub old_shipment_date: NaiveDate,
    pub new_shipment_date: Option<NaiveDate>,
    pub change_timestamp: String,
    pub previous_hash: String,
    pub entry_hash: String,
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = SupplyChainError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let change_timestamp = DateTime::parse_from_rfc3339(&row.change_timestamp)
            .map_err(|e| {
                SupplyChainError::IntegrityError(format!(
                    "History entry {} has an invalid timestamp {}: {}",
                    row.history_id, row.change_timestamp, e
                ))
            })?
            .with_timezone(&Utc);

        Ok(HistoryEntry {
            history_id: row.history_id,
            shipment_id: row.shipment_id,
            operation_type: row.operation_type.parse()?,
            old_shipment_date: row.old_shipment_date,
            new_shipment_date: row.new_shipment_date,
            change_timestamp,
            previous_hash: row.previous_hash,
            entry_hash: row.entry_hash,
        })
    }
}
