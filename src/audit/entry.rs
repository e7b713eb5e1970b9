//! Shipment History Entry
//!
//! Defines the immutable history row written for every shipment date
//! mutation, chained by sha256 hashes so tampering is detectable.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::SupplyChainError;

/// Hash the first entry of the log links to
pub const GENESIS_HASH: &str =
    "sha256:0000000000000000000000000000000000000000000000000000000000000000";

/// Kind of data modification applied to a shipment row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Insert,
    Update,
    Delete,
}

/// Operation kinds that produce a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationType {
    Update,
    Delete,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    /// History operation for a mutation kind; `None` for kinds the
    /// recorder does not capture.
    pub fn for_mutation(kind: MutationKind) -> Option<Self> {
        match kind {
            MutationKind::Update => Some(Self::Update),
            MutationKind::Delete => Some(Self::Delete),
            MutationKind::Insert => None,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = SupplyChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            other => Err(SupplyChainError::invalid_operation_type(other)),
        }
    }
}

/// Pre-image and post-image of one qualifying shipment mutation, handed
/// to the recorder before the mutation is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentChange {
    pub shipment_id: i64,
    pub operation_type: OperationType,
    pub old_shipment_date: NaiveDate,
    pub new_shipment_date: Option<NaiveDate>,
}

impl ShipmentChange {
    pub fn update(shipment_id: i64, old_date: NaiveDate, new_date: NaiveDate) -> Self {
        Self {
            shipment_id,
            operation_type: OperationType::Update,
            old_shipment_date: old_date,
            new_shipment_date: Some(new_date),
        }
    }

    pub fn delete(shipment_id: i64, old_date: NaiveDate) -> Self {
        Self {
            shipment_id,
            operation_type: OperationType::Delete,
            old_shipment_date: old_date,
            new_shipment_date: None,
        }
    }
}

/// Immutable audit-log row capturing one mutation to a shipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub history_id: i64,
    pub shipment_id: i64,
    pub operation_type: OperationType,
    pub old_shipment_date: NaiveDate,
    pub new_shipment_date: Option<NaiveDate>,
    pub change_timestamp: DateTime<Utc>,
    pub previous_hash: String,
    pub entry_hash: String,
}

impl HistoryEntry {
    /// Build an entry for `change`; `history_id` is assigned on insert.
    pub fn new(
        change: &ShipmentChange,
        change_timestamp: DateTime<Utc>,
        previous_hash: String,
    ) -> Self {
        let mut entry = Self {
            history_id: 0,
            shipment_id: change.shipment_id,
            operation_type: change.operation_type,
            old_shipment_date: change.old_shipment_date,
            new_shipment_date: change.new_shipment_date,
            change_timestamp,
            previous_hash,
            entry_hash: String::new(),
        };

        entry.entry_hash = entry.calculate_hash();
        entry
    }

    /// Canonical string representation for hashing. `history_id` is left
    /// out since it is assigned by the database after the hash is computed.
    pub fn canonical_string(&self) -> String {
        format!(
            "shipment_id:{}|operation_type:{}|old_shipment_date:{}|new_shipment_date:{}|change_timestamp:{}|previous_hash:{}",
            self.shipment_id,
            self.operation_type,
            self.old_shipment_date,
            self.new_shipment_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "null".to_string()),
            format_timestamp(&self.change_timestamp),
            self.previous_hash,
        )
    }

    pub fn calculate_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_string().as_bytes());
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }

    pub fn verify_hash(&self) -> bool {
        self.entry_hash == self.calculate_hash()
    }

    pub fn summary(&self) -> String {
        match self.new_shipment_date {
            Some(new_date) => format!(
                "{} shipment {}: {} -> {}",
                self.operation_type, self.shipment_id, self.old_shipment_date, new_date
            ),
            None => format!(
                "{} shipment {}: {}",
                self.operation_type, self.shipment_id, self.old_shipment_date
            ),
        }
    }
}

/// Timestamps are stored and hashed at microsecond precision
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}
