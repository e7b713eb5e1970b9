use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, Command};
use std::collections::HashMap;
use tracing::{error, info};

use supply_chain_audit::audit::{verify_history, HistoryEntry};
use supply_chain_audit::config::AppConfig;
use supply_chain_audit::database::queries::Queries;
use supply_chain_audit::database::Database;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("verify-history")
        .version("0.1.0")
        .about("Verify shipment history log integrity")
        .arg(
            Arg::new("database-url")
                .short('d')
                .long("database-url")
                .value_name("URL")
                .help("Database URL (defaults to DATABASE_URL)"),
        )
        .arg(
            Arg::new("expected-head")
                .short('e')
                .long("expected-head")
                .value_name("HASH")
                .help("Expected hash of the newest history entry"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable verbose output"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Suppress output except errors"),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    let quiet = matches.get_flag("quiet");

    let level = if quiet {
        tracing::Level::ERROR
    } else if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let database_url = match matches.get_one::<String>("database-url") {
        Some(url) => url.clone(),
        None => AppConfig::load()?.database_url,
    };
    let expected_head = matches.get_one::<String>("expected-head");

    if let Err(e) = verify_database(&database_url, expected_head, verbose).await {
        error!("History verification failed: {}", e);
        std::process::exit(1);
    }

    if !quiet {
        println!("✓ History verification completed successfully");
    }

    Ok(())
}

async fn verify_database(
    database_url: &str,
    expected_head: Option<&String>,
    verbose: bool,
) -> Result<()> {
    info!("Verifying shipment history in {}", database_url);

    let database = Database::new(database_url, 1).await?;
    let entries = Queries::list_history(database.pool()).await?;
    database.close().await;

    if verbose {
        println!("Loaded {} history entries", entries.len());
    }

    verify_history(&entries)?;

    if verbose {
        println!("✓ Hash chain integrity verified");
    }

    if let Some(expected) = expected_head {
        let head = entries
            .last()
            .map(|e| e.entry_hash.as_str())
            .ok_or_else(|| anyhow!("History is empty, expected head {}", expected))?;
        if head != expected {
            return Err(anyhow!("Head hash mismatch. Expected: {}, Got: {}", expected, head));
        }
        if verbose {
            println!("✓ Head hash matches expected value");
        }
    }

    if verbose {
        print_summary(&entries);
    }

    Ok(())
}

fn print_summary(entries: &[HistoryEntry]) {
    let (Some(first), Some(last)) = (entries.first(), entries.last()) else {
        println!("\nHistory is empty");
        return;
    };

    println!("\nHistory Summary:");
    println!("  Total entries: {}", entries.len());
    println!("  First change: {}", first.change_timestamp);
    println!("  Last change: {}", last.change_timestamp);
    println!("  Head hash: {}", last.entry_hash);

    let mut operations: HashMap<&'static str, usize> = HashMap::new();
    for entry in entries {
        *operations.entry(entry.operation_type.as_str()).or_insert(0) += 1;
    }

    println!("\nOperation distribution:");
    for (operation, count) in operations {
        println!("  {}: {}", operation, count);
    }
}
