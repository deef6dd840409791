pub mod actor_context;
pub mod audit_entry;
pub mod field_value;
pub mod tracked_entity;
