// SQL schema for the supply chain database, applied in order.

pub const SUPPLY_CHAIN_SCHEMA: &str = include_str!("../../migrations/001_supply_chain_schema.sql");
pub const SHIPMENT_HISTORY_SCHEMA: &str = include_str!("../../migrations/002_shipment_history.sql");

pub const MIGRATIONS: &[(&str, &str)] = &[
    ("001_supply_chain_schema", SUPPLY_CHAIN_SCHEMA),
    ("002_shipment_history", SHIPMENT_HISTORY_SCHEMA),
];
