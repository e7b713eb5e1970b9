pub mod audit;
pub mod config;
pub mod database;
pub mod error;
pub mod reports;
pub mod seed;
pub mod shipments;

pub use error::SupplyChainError;
pub use shipments::{MutationOutcome, ShipmentMutation, ShipmentStore};
