use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use supply_chain_audit::audit::verify_history_detailed;
use supply_chain_audit::config::AppConfig;
use supply_chain_audit::database::queries::Queries;
use supply_chain_audit::database::Database;
use supply_chain_audit::{reports, seed, ShipmentStore};

#[derive(Parser)]
#[command(name = "supply-chain-audit", version, about = "Audited shipment changes and supply chain reports")]
struct Cli {
    /// Database URL, overrides DATABASE_URL and the config file
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create tables, views and history triggers
    Migrate,
    /// Fill the database with dummy data
    Seed {
        #[arg(long)]
        orders: Option<usize>,
        #[arg(long)]
        rng_seed: Option<u64>,
    },
    /// Create a shipment (no history is recorded)
    Create {
        order_id: i64,
        warehouse_id: i64,
        shipment_date: NaiveDate,
    },
    /// Change a shipment's date and record the change
    Update { shipment_id: i64, shipment_date: NaiveDate },
    /// Delete a shipment and record the deletion
    Delete { shipment_id: i64 },
    /// Print the recorded history, optionally for one shipment
    History { shipment_id: Option<i64> },
    /// Print a report
    Report {
        #[arg(value_enum)]
        kind: ReportKind,
        /// Supplier for the supplier-orders report
        #[arg(long)]
        supplier_id: Option<i64>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Verify the history hash chain
    Verify,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportKind {
    CategorySales,
    SupplierPerformance,
    ShippingTimes,
    SupplierYoy,
    SupplierOrders,
    ShipmentDetails,
    ChangeSummary,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "supply_chain_audit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }
    info!("Configuration loaded");

    let database = Database::new(&config.database_url, config.max_connections).await?;
    database.run_migrations().await?;

    let pool = database.pool().clone();
    let store = ShipmentStore::with_sql_recorder(pool.clone());

    match cli.command {
        Command::Migrate => info!("Database migrations completed"),
        Command::Seed { orders, rng_seed } => {
            let mut seed_config = config.seed.clone();
            if let Some(orders) = orders {
                seed_config.orders = orders;
            }
            if rng_seed.is_some() {
                seed_config.rng_seed = rng_seed;
            }
            let summary = seed::seed_database(&store, &seed_config, Utc::now().date_naive()).await?;
            print_json(&summary)?;
        }
        Command::Create {
            order_id,
            warehouse_id,
            shipment_date,
        } => {
            let shipment = store
                .create_shipment(order_id, warehouse_id, shipment_date)
                .await?;
            print_json(&shipment)?;
        }
        Command::Update {
            shipment_id,
            shipment_date,
        } => {
            let outcome = store.update_shipment_date(shipment_id, shipment_date).await?;
            print_json(&outcome)?;
        }
        Command::Delete { shipment_id } => {
            let outcome = store.delete_shipment(shipment_id).await?;
            print_json(&outcome)?;
        }
        Command::History { shipment_id } => {
            let entries = match shipment_id {
                Some(id) => Queries::history_for_shipment(&pool, id).await?,
                None => Queries::list_history(&pool).await?,
            };
            print_json(&entries)?;
        }
        Command::Report {
            kind,
            supplier_id,
            from,
            to,
        } => match kind {
            ReportKind::CategorySales => print_json(&reports::sales_by_category(&pool).await?)?,
            ReportKind::SupplierPerformance => {
                print_json(&reports::supplier_performance(&pool).await?)?
            }
            ReportKind::ShippingTimes => {
                print_json(&reports::warehouse_shipping_times(&pool).await?)?
            }
            ReportKind::SupplierYoy => print_json(&reports::supplier_year_over_year(&pool).await?)?,
            ReportKind::SupplierOrders => {
                let supplier_id =
                    supplier_id.ok_or_else(|| anyhow!("--supplier-id is required for supplier-orders"))?;
                print_json(&reports::orders_for_supplier(&pool, supplier_id, from, to).await?)?
            }
            ReportKind::ShipmentDetails => print_json(&Queries::shipment_details(&pool).await?)?,
            ReportKind::ChangeSummary => print_json(&reports::shipment_change_summary(&pool).await?)?,
        },
        Command::Verify => {
            let result = verify_history_detailed(&pool).await?;
            print_json(&result)?;
            if !result.is_valid {
                database.close().await;
                std::process::exit(1);
            }
        }
    }

    database.close().await;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
