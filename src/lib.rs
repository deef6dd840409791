//! Field-level audit trails for unit-of-work commits.
//!
//! A [`ChangeTracker`] exposes what a unit of work is about to commit.
//! The [`AuditCoordinator`] turns that snapshot into [`AuditEntry`]
//! records (one per added, modified or deleted auditable entity, with
//! per-field changes for modifications) and hands them to each
//! registered [`AuditWriter`] in turn.
//!
//! ```no_run
//! use entity_audit::{
//!     ActorContext, AuditCoordinator, Entity, FieldValue, InMemoryUnitOfWork,
//!     commit_with_audit,
//! };
//! use entity_audit::adapters::audit::json_lines_writer::JsonLinesWriter;
//! use tokio_util::sync::CancellationToken;
//!
//! struct Invoice {
//!     id: i64,
//!     status: String,
//! }
//!
//! impl Entity for Invoice {
//!     const NAME: &'static str = "Invoice";
//!     const PRIMARY_KEY: &'static [&'static str] = &["Id"];
//!     const AUDITABLE: bool = true;
//!
//!     fn properties(&self) -> Vec<(&'static str, Option<FieldValue>)> {
//!         vec![
//!             ("Id", Some(self.id.into())),
//!             ("Status", Some(self.status.clone().into())),
//!         ]
//!     }
//! }
//!
//! # async fn run() -> entity_audit::Result<()> {
//! let coordinator = AuditCoordinator::new()
//!     .with_writer(JsonLinesWriter::new(std::path::Path::new("."), "audit.log"));
//!
//! let mut uow = InMemoryUnitOfWork::new();
//! let invoice = uow.attach(Invoice { id: 42, status: "Draft".into() });
//! uow.modify::<Invoice, _>(invoice, |i| i.status = "Sent".into())?;
//!
//! let actor = ActorContext::anonymous().with_actor("alice");
//! commit_with_audit(&mut uow, Some(&coordinator), &actor, &CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod config;
pub mod core;

pub use crate::adapters::tracking::memory_unit_of_work::{EntryHandle, InMemoryUnitOfWork};
pub use crate::core::errors::{AuditError, Result};
pub use crate::core::models::actor_context::ActorContext;
pub use crate::core::models::audit_entry::{AuditAction, AuditChange, AuditEntry};
pub use crate::core::models::field_value::FieldValue;
pub use crate::core::models::tracked_entity::{EntityState, PropertyEntry, TrackedEntity};
pub use crate::core::services::audit_coordinator::AuditCoordinator;
pub use crate::core::services::entry_builder::EntryBuilder;
pub use crate::core::services::save_integration::commit_with_audit;
pub use crate::core::traits::audit::AuditWriter;
pub use crate::core::traits::change_tracker::{ChangeTracker, UnitOfWork};
pub use crate::core::traits::entity::Entity;
