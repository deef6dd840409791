pub mod audit_coordinator;
pub mod entry_builder;
pub mod save_integration;
