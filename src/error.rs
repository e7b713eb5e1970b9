use thiserror::Error;

impl From<sqlx::Error> for SupplyChainError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(format!("Database error: {}", err))
    }
}

impl From<toml::de::Error> for SupplyChainError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError(format!("Invalid TOML: {}", err))
    }
}

#[derive(Error, Debug)]
pub enum SupplyChainError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The history append could not be persisted; the mutation that
    /// triggered it has been rolled back.
    #[error("Audit write failure: {0}")]
    AuditWriteFailure(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("History integrity error: {0}")]
    IntegrityError(String),
}

impl SupplyChainError {
    pub fn audit_write_failure(shipment_id: i64, err: impl std::fmt::Display) -> Self {
        Self::AuditWriteFailure(format!(
            "Failed to append history for shipment {}: {}",
            shipment_id, err
        ))
    }

    pub fn invalid_operation_type(value: &str) -> Self {
        Self::ValidationError(format!(
            "Invalid operation type: {}. Must be UPDATE or DELETE",
            value
        ))
    }

    pub fn is_audit_failure(&self) -> bool {
        matches!(self, Self::AuditWriteFailure(_))
    }
}
