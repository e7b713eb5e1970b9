//! History Recorder
//!
//! Appends shipment history entries through the caller's transaction so
//! the audit write and the data mutation commit or roll back together.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::audit::entry::{format_timestamp, HistoryEntry, ShipmentChange, GENESIS_HASH};
use crate::error::SupplyChainError;

/// Open write transaction of one shipment mutation. Only
/// [`crate::shipments::ShipmentStore`] creates scopes, so a recorder can
/// only ever run as part of a mutation.
pub struct MutationScope<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> MutationScope<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Connection of the enclosing transaction
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.conn
    }
}

/// Audit capability injected into the shipment store. This is the seam
/// for swapping the history backend; it is not invocable on its own since
/// a [`MutationScope`] cannot be built outside the store.
#[async_trait]
pub trait HistoryRecorder: Send + Sync {
    /// Append one entry for `change` inside `scope`; an error here aborts
    /// the mutation.
    async fn record(
        &self,
        scope: &mut MutationScope<'_>,
        change: &ShipmentChange,
    ) -> Result<HistoryEntry, SupplyChainError>;
}

/// Recorder backed by the `shipment_history` table
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlHistoryRecorder;

impl SqlHistoryRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Hash and timestamp of the newest entry, if any
    async fn head(
        conn: &mut SqliteConnection,
    ) -> Result<Option<(String, DateTime<Utc>)>, sqlx::Error> {
        let row: Option<(String, String)> = sqlx::query_as(
            r#"
            SELECT entry_hash, change_timestamp
            FROM shipment_history
            ORDER BY history_id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some((hash, timestamp)) => {
                let timestamp = DateTime::parse_from_rfc3339(&timestamp)
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
                    .with_timezone(&Utc);
                Ok(Some((hash, timestamp)))
            }
            None => Ok(None),
        }
    }

    async fn append(
        conn: &mut SqliteConnection,
        change: &ShipmentChange,
    ) -> Result<HistoryEntry, sqlx::Error> {
        let now = Utc::now().trunc_subsecs(6);

        // Clock steps backwards must not reorder the log
        let (previous_hash, change_timestamp) = match Self::head(conn).await? {
            Some((hash, last)) => (hash, now.max(last)),
            None => (GENESIS_HASH.to_string(), now),
        };

        let mut entry = HistoryEntry::new(change, change_timestamp, previous_hash);

        let result = sqlx::query(
            r#"
            INSERT INTO shipment_history (
                shipment_id, operation_type, old_shipment_date, new_shipment_date,
                change_timestamp, previous_hash, entry_hash
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.shipment_id)
        .bind(entry.operation_type.as_str())
        .bind(entry.old_shipment_date)
        .bind(entry.new_shipment_date)
        .bind(format_timestamp(&entry.change_timestamp))
        .bind(&entry.previous_hash)
        .bind(&entry.entry_hash)
        .execute(&mut *conn)
        .await?;

        entry.history_id = result.last_insert_rowid();
        Ok(entry)
    }
}

#[async_trait]
impl HistoryRecorder for SqlHistoryRecorder {
    async fn record(
        &self,
        scope: &mut MutationScope<'_>,
        change: &ShipmentChange,
    ) -> Result<HistoryEntry, SupplyChainError> {
        let entry = Self::append(scope.conn(), change)
            .await
            .map_err(|e| SupplyChainError::audit_write_failure(change.shipment_id, e))?;

        debug!(
            history_id = entry.history_id,
            "Appended history entry: {}",
            entry.summary()
        );
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::queries::Queries;
    use crate::database::Database;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_entries_chain_within_scope() {
        let db = Database::new_in_memory().await.unwrap();
        let recorder = SqlHistoryRecorder::new();
        let mut tx = db.pool().begin().await.unwrap();

        let mut scope = MutationScope::new(&mut *tx);
        let first = recorder
            .record(&mut scope, &ShipmentChange::update(1, date(2024, 1, 1), date(2024, 1, 2)))
            .await
            .unwrap();
        let second = recorder
            .record(&mut scope, &ShipmentChange::delete(1, date(2024, 1, 2)))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(first.previous_hash, GENESIS_HASH);
        assert_eq!(second.previous_hash, first.entry_hash);
        assert!(second.change_timestamp >= first.change_timestamp);
        assert_eq!(Queries::count_history(db.pool()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_rolled_back_scope_leaves_no_entry() {
        let db = Database::new_in_memory().await.unwrap();
        let recorder = SqlHistoryRecorder::new();
        let mut tx = db.pool().begin().await.unwrap();

        let mut scope = MutationScope::new(&mut *tx);
        recorder
            .record(&mut scope, &ShipmentChange::delete(5, date(2024, 3, 1)))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(Queries::count_history(db.pool()).await.unwrap(), 0);
    }
}
