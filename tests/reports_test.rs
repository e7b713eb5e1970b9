//! Report queries against a fixed fixture

use supply_chain_audit::database::queries::Queries;
use supply_chain_audit::database::Database;
use supply_chain_audit::reports;
use supply_chain_audit::SupplyChainError;

mod common;
use common::*;

struct Fixture {
    db: Database,
    suppliers: [i64; 3],
    shipments: [i64; 3],
}

async fn setup_fixture() -> Fixture {
    let db = setup_test_db().await;
    let pool = db.pool();

    let acme = Queries::insert_supplier(pool, "Acme Corp").await.unwrap();
    let globex = Queries::insert_supplier(pool, "Globex").await.unwrap();
    let initech = Queries::insert_supplier(pool, "Initech").await.unwrap();

    let widget = Queries::insert_product(pool, "widget", "hardware", 10.0).await.unwrap();
    let gasket = Queries::insert_product(pool, "gasket", "plumbing", 5.0).await.unwrap();
    let bracket = Queries::insert_product(pool, "bracket", "hardware", 2.5).await.unwrap();

    let denver = Queries::insert_warehouse(pool, "Denver Warehouse").await.unwrap();
    let austin = Queries::insert_warehouse(pool, "Austin Warehouse").await.unwrap();

    let o1 = Queries::insert_order(pool, widget, acme, 10, date(2023, 3, 1)).await.unwrap();
    let o2 = Queries::insert_order(pool, gasket, acme, 20, date(2024, 3, 1)).await.unwrap();
    let o3 = Queries::insert_order(pool, bracket, globex, 40, date(2024, 5, 1)).await.unwrap();
    Queries::insert_order(pool, widget, acme, 5, date(2024, 6, 1)).await.unwrap();

    let store = create_test_store(&db);
    let s1 = store.create_shipment(o1, denver, date(2024, 1, 10)).await.unwrap();
    let s2 = store.create_shipment(o2, denver, date(2024, 1, 12)).await.unwrap();
    let s3 = store.create_shipment(o3, austin, date(2024, 1, 10)).await.unwrap();

    Queries::insert_shipping_time(pool, date(2024, 1, 10), 2).await.unwrap();
    Queries::insert_shipping_time(pool, date(2024, 1, 10), 4).await.unwrap();
    Queries::insert_shipping_time(pool, date(2024, 1, 12), 6).await.unwrap();

    Fixture {
        db,
        suppliers: [acme, globex, initech],
        shipments: [s1.shipment_id, s2.shipment_id, s3.shipment_id],
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn test_sales_by_category() {
    let fixture = setup_fixture().await;
    let sales = reports::sales_by_category(fixture.db.pool()).await.unwrap();

    assert_eq!(sales.len(), 2);
    assert_eq!(sales[0].category, "hardware");
    assert_eq!(sales[0].total_quantity, 55);
    assert!(approx(sales[0].total_revenue, 250.0));
    assert_eq!(sales[1].category, "plumbing");
    assert!(approx(sales[1].total_revenue, 100.0));
}

#[tokio::test]
async fn test_supplier_performance_includes_idle_suppliers() {
    let fixture = setup_fixture().await;
    let [acme, globex, initech] = fixture.suppliers;
    let performance = reports::supplier_performance(fixture.db.pool()).await.unwrap();

    let ids: Vec<i64> = performance.iter().map(|p| p.supplier_id).collect();
    assert_eq!(ids, vec![globex, acme, initech]);
    assert_eq!(performance[1].order_count, 3);
    assert_eq!(performance[1].total_quantity, 35);
    assert_eq!(performance[2].order_count, 0);
    assert_eq!(performance[2].total_quantity, 0);
}

#[tokio::test]
async fn test_warehouse_shipping_times() {
    let fixture = setup_fixture().await;
    let times = reports::warehouse_shipping_times(fixture.db.pool()).await.unwrap();

    assert_eq!(times.len(), 2);
    assert_eq!(times[0].warehouse_name, "Austin Warehouse");
    assert_eq!(times[0].shipment_count, 1);
    assert!(approx(times[0].avg_shipping_days, 3.0));
    assert_eq!(times[1].warehouse_name, "Denver Warehouse");
    assert_eq!(times[1].shipment_count, 2);
    assert!(approx(times[1].avg_shipping_days, 4.5));
}

#[tokio::test]
async fn test_supplier_year_over_year() {
    let fixture = setup_fixture().await;
    let [acme, globex, _] = fixture.suppliers;
    let yoy = reports::supplier_year_over_year(fixture.db.pool()).await.unwrap();

    assert_eq!(yoy.len(), 3);

    assert_eq!((yoy[0].supplier_id, yoy[0].year), (acme, 2023));
    assert_eq!(yoy[0].total_quantity, 10);
    assert_eq!(yoy[0].previous_year_quantity, None);
    assert_eq!(yoy[0].change_pct, None);

    assert_eq!((yoy[1].supplier_id, yoy[1].year), (acme, 2024));
    assert_eq!(yoy[1].total_quantity, 25);
    assert_eq!(yoy[1].previous_year_quantity, Some(10));
    assert!(approx(yoy[1].change_pct.unwrap(), 150.0));

    assert_eq!((yoy[2].supplier_id, yoy[2].year), (globex, 2024));
    assert_eq!(yoy[2].previous_year_quantity, None);
}

#[tokio::test]
async fn test_orders_for_supplier_in_range() {
    let fixture = setup_fixture().await;
    let [acme, _, _] = fixture.suppliers;

    let orders = reports::orders_for_supplier(
        fixture.db.pool(),
        acme,
        Some(date(2024, 1, 1)),
        Some(date(2024, 12, 31)),
    )
    .await
    .unwrap();

    let quantities: Vec<i64> = orders.iter().map(|o| o.quantity).collect();
    assert_eq!(quantities, vec![20, 5]);
}

#[tokio::test]
async fn test_orders_for_supplier_open_ended_range() {
    let fixture = setup_fixture().await;
    let [acme, _, _] = fixture.suppliers;
    let pool = fixture.db.pool();

    let all = reports::orders_for_supplier(pool, acme, None, None).await.unwrap();
    let quantities: Vec<i64> = all.iter().map(|o| o.quantity).collect();
    assert_eq!(quantities, vec![10, 20, 5]);

    let until = reports::orders_for_supplier(pool, acme, None, Some(date(2024, 3, 1)))
        .await
        .unwrap();
    let quantities: Vec<i64> = until.iter().map(|o| o.quantity).collect();
    assert_eq!(quantities, vec![10, 20]);

    let since = reports::orders_for_supplier(pool, acme, Some(date(2024, 3, 2)), None)
        .await
        .unwrap();
    let quantities: Vec<i64> = since.iter().map(|o| o.quantity).collect();
    assert_eq!(quantities, vec![5]);
}

#[tokio::test]
async fn test_orders_for_supplier_rejects_inverted_range() {
    let fixture = setup_fixture().await;
    let err = reports::orders_for_supplier(
        fixture.db.pool(),
        fixture.suppliers[0],
        Some(date(2024, 12, 31)),
        Some(date(2024, 1, 1)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SupplyChainError::ValidationError(_)));
}

#[tokio::test]
async fn test_shipment_details_view() {
    let fixture = setup_fixture().await;
    let details = Queries::shipment_details(fixture.db.pool()).await.unwrap();

    assert_eq!(details.len(), 3);
    assert_eq!(details[0].shipment_id, fixture.shipments[0]);
    assert_eq!(details[0].product_name, "widget");
    assert_eq!(details[0].supplier_name, "Acme Corp");
    assert_eq!(details[0].warehouse_name, "Denver Warehouse");
    assert_eq!(details[0].order_date, date(2023, 3, 1));
}

#[tokio::test]
async fn test_shipment_change_summary() {
    let fixture = setup_fixture().await;
    let [s1, s2, _] = fixture.shipments;
    let store = create_test_store(&fixture.db);

    store.update_shipment_date(s1, date(2024, 1, 11)).await.unwrap();
    store.update_shipment_date(s1, date(2024, 1, 13)).await.unwrap();
    store.delete_shipment(s2).await.unwrap();

    let summary = reports::shipment_change_summary(fixture.db.pool()).await.unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].shipment_id, s1);
    assert_eq!((summary[0].update_count, summary[0].delete_count), (2, 0));
    assert_eq!(summary[1].shipment_id, s2);
    assert_eq!((summary[1].delete_count, summary[1].total_changes), (1, 1));
}
