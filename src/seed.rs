//! Dummy data generator for the supply chain schema

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::config::SeedConfig;
use crate::database::queries::Queries;
use crate::error::SupplyChainError;
use crate::shipments::ShipmentStore;

const COMPANY_PREFIXES: &[&str] = &[
    "Acme", "Globex", "Initech", "Umbrella", "Vandelay", "Hooli", "Soylent", "Wonka",
];
const COMPANY_SUFFIXES: &[&str] = &["Corp", "Industries", "Imports", "Supply", "Group", "LLC"];
const CITIES: &[&str] = &[
    "Denver", "Portland", "Austin", "Memphis", "Toledo", "Reno", "Tucson", "Omaha",
];
const PRODUCT_WORDS: &[&str] = &[
    "widget", "gasket", "bracket", "sprocket", "valve", "spindle", "lever", "coupling",
];
const CATEGORIES: &[&str] = &["hardware", "plumbing", "electrical", "automotive", "garden"];

/// Orders reference one of the first suppliers only, as do shipments with
/// warehouses.
const ACTIVE_SUPPLIERS: usize = 3;
const ACTIVE_WAREHOUSES: usize = 3;
const ORDER_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub suppliers: usize,
    pub products: usize,
    pub warehouses: usize,
    pub orders: usize,
    pub shipments: usize,
    pub shipping_times: usize,
}

/// Fill the schema with random rows dated up to `today`. Shipments go
/// through the store's insert path, which records no history.
pub async fn seed_database(
    store: &ShipmentStore,
    config: &SeedConfig,
    today: NaiveDate,
) -> Result<SeedSummary, SupplyChainError> {
    if config.suppliers == 0 || config.products == 0 || config.warehouses == 0 {
        return Err(SupplyChainError::ValidationError(
            "Seeding needs at least one supplier, product and warehouse".to_string(),
        ));
    }

    let mut rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let pool = store.pool();
    let mut summary = SeedSummary::default();

    let mut supplier_ids = Vec::with_capacity(config.suppliers);
    for _ in 0..config.suppliers {
        let name = format!("{} {}", pick(&mut rng, COMPANY_PREFIXES), pick(&mut rng, COMPANY_SUFFIXES));
        supplier_ids.push(Queries::insert_supplier(pool, &name).await?);
    }
    summary.suppliers = supplier_ids.len();

    let mut product_ids = Vec::with_capacity(config.products);
    for _ in 0..config.products {
        let unit_price = rng.gen_range(10..=100) as f64;
        let id = Queries::insert_product(
            pool,
            pick(&mut rng, PRODUCT_WORDS),
            pick(&mut rng, CATEGORIES),
            unit_price,
        )
        .await?;
        product_ids.push(id);
    }
    summary.products = product_ids.len();

    let mut warehouse_ids = Vec::with_capacity(config.warehouses);
    for _ in 0..config.warehouses {
        let name = format!("{} Warehouse", pick(&mut rng, CITIES));
        warehouse_ids.push(Queries::insert_warehouse(pool, &name).await?);
    }
    summary.warehouses = warehouse_ids.len();

    let active_suppliers = &supplier_ids[..supplier_ids.len().min(ACTIVE_SUPPLIERS)];
    let active_warehouses = &warehouse_ids[..warehouse_ids.len().min(ACTIVE_WAREHOUSES)];

    for _ in 0..config.orders {
        let product_id = product_ids[rng.gen_range(0..product_ids.len())];
        let supplier_id = active_suppliers[rng.gen_range(0..active_suppliers.len())];
        let quantity = rng.gen_range(10..=100);
        let order_date = today - Duration::days(rng.gen_range(0..=ORDER_WINDOW_DAYS));

        let order_id = Queries::insert_order(pool, product_id, supplier_id, quantity, order_date).await?;
        summary.orders += 1;

        let lead_days = (today - order_date).num_days();
        let shipment_date = order_date + Duration::days(rng.gen_range(0..=lead_days));
        let warehouse_id = active_warehouses[rng.gen_range(0..active_warehouses.len())];

        let shipment = store
            .create_shipment(order_id, warehouse_id, shipment_date)
            .await?;
        summary.shipments += 1;

        let shipping_time = rng.gen_range(1..=7);
        Queries::insert_shipping_time(pool, shipment.shipment_date, shipping_time).await?;
        summary.shipping_times += 1;
    }

    info!(
        suppliers = summary.suppliers,
        products = summary.products,
        warehouses = summary.warehouses,
        orders = summary.orders,
        "Seeded supply chain database"
    );
    Ok(summary)
}

fn pick<'a>(rng: &mut StdRng, words: &[&'a str]) -> &'a str {
    words.choose(rng).copied().unwrap_or("item")
}
