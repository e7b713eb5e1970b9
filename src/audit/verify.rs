//! History Verification
//!
//! Checks that the shipment history log is intact: hashes recompute,
//! the chain links, ids grow and timestamps never go backwards.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::audit::entry::{HistoryEntry, OperationType, GENESIS_HASH};
use crate::database::queries::Queries;

/// Verify a complete history log, ordered by `history_id`
pub fn verify_history(entries: &[HistoryEntry]) -> Result<bool> {
    for (i, entry) in entries.iter().enumerate() {
        if !entry.verify_hash() {
            return Err(anyhow!(
                "Invalid hash in history entry {} (position {})",
                entry.history_id,
                i
            ));
        }

        match (entry.operation_type, entry.new_shipment_date) {
            (OperationType::Update, None) => {
                return Err(anyhow!(
                    "UPDATE history entry {} has no new shipment date",
                    entry.history_id
                ));
            }
            (OperationType::Delete, Some(_)) => {
                return Err(anyhow!(
                    "DELETE history entry {} carries a new shipment date",
                    entry.history_id
                ));
            }
            _ => {}
        }
    }

    if let Some(first) = entries.first() {
        if first.previous_hash != GENESIS_HASH {
            return Err(anyhow!(
                "First history entry {} does not link to the genesis hash",
                first.history_id
            ));
        }
    }

    for pair in entries.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);

        if curr.previous_hash != prev.entry_hash {
            return Err(anyhow!(
                "Hash chain broken at history entry {}: expected {}, got {}",
                curr.history_id,
                prev.entry_hash,
                curr.previous_hash
            ));
        }

        if curr.history_id <= prev.history_id {
            return Err(anyhow!(
                "History ids out of order: {} follows {}",
                curr.history_id,
                prev.history_id
            ));
        }

        if curr.change_timestamp < prev.change_timestamp {
            return Err(anyhow!(
                "Non-monotonic timestamp at history entry {}: {} < {}",
                curr.history_id,
                curr.change_timestamp,
                prev.change_timestamp
            ));
        }
    }

    info!("History verification successful: {} entries", entries.len());
    Ok(true)
}

/// Load the history log from the database and verify it
pub async fn verify_history_in_db(pool: &SqlitePool) -> Result<bool> {
    let entries = Queries::list_history(pool).await?;
    debug!("Loaded {} history entries", entries.len());
    verify_history(&entries)
}

/// Outcome of a detailed verification run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_valid: bool,
    pub entry_count: usize,
    pub update_count: usize,
    pub delete_count: usize,
    pub head_hash: Option<String>,
    pub error_message: Option<String>,
}

/// Verify the history log and report counts alongside any failure
pub async fn verify_history_detailed(pool: &SqlitePool) -> Result<VerificationResult> {
    let entries = match Queries::list_history(pool).await {
        Ok(entries) => entries,
        Err(e) => {
            return Ok(VerificationResult {
                is_valid: false,
                entry_count: 0,
                update_count: 0,
                delete_count: 0,
                head_hash: None,
                error_message: Some(format!("Failed to load history: {}", e)),
            });
        }
    };

    let update_count = entries
        .iter()
        .filter(|e| e.operation_type == OperationType::Update)
        .count();

    let (is_valid, error_message) = match verify_history(&entries) {
        Ok(_) => (true, None),
        Err(e) => {
            warn!("History verification failed: {}", e);
            (false, Some(e.to_string()))
        }
    };

    Ok(VerificationResult {
        is_valid,
        entry_count: entries.len(),
        update_count,
        delete_count: entries.len() - update_count,
        head_hash: entries.last().map(|e| e.entry_hash.clone()),
        error_message,
    })
}
