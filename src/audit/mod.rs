//! Shipment Change History
//!
//! Append-only, hash-chained log of shipment date mutations, written in
//! the same transaction as the mutation it describes.

pub mod entry;
pub mod recorder;
pub mod verify;

pub use entry::{HistoryEntry, MutationKind, OperationType, ShipmentChange, GENESIS_HASH};
pub use recorder::{HistoryRecorder, MutationScope, SqlHistoryRecorder};
pub use verify::{verify_history, verify_history_detailed, verify_history_in_db, VerificationResult};
