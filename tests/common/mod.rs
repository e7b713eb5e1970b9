#![allow(dead_code)]

use chrono::NaiveDate;
use supply_chain_audit::database::queries::Queries;
use supply_chain_audit::database::Database;
use supply_chain_audit::ShipmentStore;

/// Setup an in-memory SQLite database with migrations applied
pub async fn setup_test_db() -> Database {
    Database::new_in_memory().await.expect("Failed to create test database")
}

/// File-backed database under `dir` with a pool of `max_connections`
pub async fn setup_file_db(dir: &std::path::Path, max_connections: u32) -> Database {
    let url = format!("sqlite://{}", dir.join("supply_chain.db").display());
    let db = Database::new(&url, max_connections)
        .await
        .expect("Failed to open file database");
    db.run_migrations().await.expect("Failed to run migrations");
    db
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Reference rows every shipment needs: (order_id, warehouse_id)
pub async fn create_test_order(db: &Database) -> (i64, i64) {
    let pool = db.pool();
    let supplier_id = Queries::insert_supplier(pool, "Acme Corp").await.unwrap();
    let product_id = Queries::insert_product(pool, "widget", "hardware", 25.0)
        .await
        .unwrap();
    let warehouse_id = Queries::insert_warehouse(pool, "Denver Warehouse").await.unwrap();
    let order_id = Queries::insert_order(pool, product_id, supplier_id, 40, date(2024, 1, 2))
        .await
        .unwrap();
    (order_id, warehouse_id)
}

/// Insert a shipment with a fixed id
pub async fn insert_shipment_with_id(db: &Database, shipment_id: i64, shipment_date: NaiveDate) {
    let (order_id, warehouse_id) = create_test_order(db).await;
    sqlx::query(
        "INSERT INTO shipments (shipment_id, order_id, warehouse_id, shipment_date) VALUES (?, ?, ?, ?)",
    )
    .bind(shipment_id)
    .bind(order_id)
    .bind(warehouse_id)
    .bind(shipment_date)
    .execute(db.pool())
    .await
    .expect("Failed to insert shipment");
}

pub fn create_test_store(db: &Database) -> ShipmentStore {
    ShipmentStore::with_sql_recorder(db.pool().clone())
}
