//! Shipment Store
//!
//! The only write path for shipment rows. Updates and deletes run in one
//! transaction together with their history append; if the append fails
//! the mutation is rolled back and the error is returned to the caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::audit::entry::{HistoryEntry, MutationKind, OperationType, ShipmentChange};
use crate::audit::recorder::{HistoryRecorder, MutationScope, SqlHistoryRecorder};
use crate::database::models::Shipment;
use crate::error::SupplyChainError;

/// A data modification requested against the shipments table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipmentMutation {
    Insert {
        order_id: i64,
        warehouse_id: i64,
        shipment_date: NaiveDate,
    },
    UpdateDate {
        shipment_id: i64,
        shipment_date: NaiveDate,
    },
    Delete {
        shipment_id: i64,
    },
}

impl ShipmentMutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Insert { .. } => MutationKind::Insert,
            Self::UpdateDate { .. } => MutationKind::Update,
            Self::Delete { .. } => MutationKind::Delete,
        }
    }
}

/// Caller-visible result of a mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationOutcome {
    pub shipment_id: i64,
    pub rows_affected: u64,
    /// Entry appended for this mutation; `None` for inserts and for
    /// mutations that matched no row.
    pub history: Option<HistoryEntry>,
}

#[derive(Clone)]
pub struct ShipmentStore {
    pool: SqlitePool,
    recorder: Arc<dyn HistoryRecorder>,
}

impl ShipmentStore {
    pub fn new(pool: SqlitePool, recorder: Arc<dyn HistoryRecorder>) -> Self {
        Self { pool, recorder }
    }

    /// Store that records into the `shipment_history` table
    pub fn with_sql_recorder(pool: SqlitePool) -> Self {
        Self::new(pool, Arc::new(SqlHistoryRecorder::new()))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply any shipment mutation. Updates and deletes are audited;
    /// inserts are not.
    pub async fn apply(&self, mutation: ShipmentMutation) -> Result<MutationOutcome, SupplyChainError> {
        if OperationType::for_mutation(mutation.kind()).is_none() {
            debug!("No history captured for {:?}", mutation.kind());
        }

        match mutation {
            ShipmentMutation::Insert {
                order_id,
                warehouse_id,
                shipment_date,
            } => {
                let shipment = self
                    .insert(order_id, warehouse_id, shipment_date)
                    .await?;
                Ok(MutationOutcome {
                    shipment_id: shipment.shipment_id,
                    rows_affected: 1,
                    history: None,
                })
            }
            ShipmentMutation::UpdateDate {
                shipment_id,
                shipment_date,
            } => {
                self.mutate_and_audit(shipment_id, Some(shipment_date))
                    .await
            }
            ShipmentMutation::Delete { shipment_id } => {
                self.mutate_and_audit(shipment_id, None).await
            }
        }
    }

    pub async fn create_shipment(
        &self,
        order_id: i64,
        warehouse_id: i64,
        shipment_date: NaiveDate,
    ) -> Result<Shipment, SupplyChainError> {
        self.insert(order_id, warehouse_id, shipment_date).await
    }

    pub async fn update_shipment_date(
        &self,
        shipment_id: i64,
        shipment_date: NaiveDate,
    ) -> Result<MutationOutcome, SupplyChainError> {
        self.apply(ShipmentMutation::UpdateDate {
            shipment_id,
            shipment_date,
        })
        .await
    }

    pub async fn delete_shipment(&self, shipment_id: i64) -> Result<MutationOutcome, SupplyChainError> {
        self.apply(ShipmentMutation::Delete { shipment_id }).await
    }

    async fn insert(
        &self,
        order_id: i64,
        warehouse_id: i64,
        shipment_date: NaiveDate,
    ) -> Result<Shipment, SupplyChainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO shipments (order_id, warehouse_id, shipment_date)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(order_id)
        .bind(warehouse_id)
        .bind(shipment_date)
        .execute(&self.pool)
        .await?;

        let shipment = Shipment {
            shipment_id: result.last_insert_rowid(),
            order_id,
            warehouse_id,
            shipment_date,
        };

        debug!(shipment_id = shipment.shipment_id, "Created shipment");
        Ok(shipment)
    }

    /// Update (`new_date` set) or delete (`new_date` unset) one shipment
    /// and append its history entry in the same transaction.
    ///
    /// The transaction takes the write lock up front, so concurrent
    /// mutations queue on the busy timeout instead of failing on a lock
    /// upgrade. Lock and pre-image errors are `DatabaseError`s.
    async fn mutate_and_audit(
        &self,
        shipment_id: i64,
        new_date: Option<NaiveDate>,
    ) -> Result<MutationOutcome, SupplyChainError> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let old_date: Option<NaiveDate> =
            sqlx::query_scalar("SELECT shipment_date FROM shipments WHERE shipment_id = ?")
                .bind(shipment_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(old_date) = old_date else {
            debug!(shipment_id, "Mutation matched no shipment");
            return Ok(MutationOutcome {
                shipment_id,
                rows_affected: 0,
                history: None,
            });
        };

        let change = match new_date {
            Some(new_date) => ShipmentChange::update(shipment_id, old_date, new_date),
            None => ShipmentChange::delete(shipment_id, old_date),
        };

        let mut scope = MutationScope::new(&mut *tx);
        let entry = match self.recorder.record(&mut scope, &change).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(shipment_id, "Rolling back {}: {}", change.operation_type, e);
                return Err(match e {
                    SupplyChainError::AuditWriteFailure(_) => e,
                    other => SupplyChainError::audit_write_failure(shipment_id, other),
                });
            }
        };

        let result = match new_date {
            Some(new_date) => {
                sqlx::query("UPDATE shipments SET shipment_date = ? WHERE shipment_id = ?")
                    .bind(new_date)
                    .bind(shipment_id)
                    .execute(&mut *tx)
                    .await?
            }
            None => {
                sqlx::query("DELETE FROM shipments WHERE shipment_id = ?")
                    .bind(shipment_id)
                    .execute(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;

        info!(
            shipment_id,
            history_id = entry.history_id,
            "{}",
            entry.summary()
        );

        Ok(MutationOutcome {
            shipment_id,
            rows_affected: result.rows_affected(),
            history: Some(entry),
        })
    }
}
