use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::errors::Result;
use crate::core::models::audit_entry::AuditEntry;
use crate::core::traits::audit::AuditWriter;

/// Audit writer that forwards entries to the `tracing` pipeline under
/// the `entity_audit::trail` target.
///
/// One `info` event per entry, one `debug` event per field change.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingWriter;

#[async_trait]
impl AuditWriter for TracingWriter {
    async fn write(&self, entries: &[AuditEntry], _cancel: &CancellationToken) -> Result<()> {
        for entry in entries {
            tracing::info!(
                target: "entity_audit::trail",
                entity = %entry.entity,
                entity_id = %entry.entity_id,
                action = %entry.action,
                actor = entry.actor.as_deref().unwrap_or("-"),
                changes = entry.changes.len(),
                "audit entry"
            );

            for change in &entry.changes {
                tracing::debug!(
                    target: "entity_audit::trail",
                    entity = %entry.entity,
                    entity_id = %entry.entity_id,
                    property = %change.property,
                    old = change.old_value.as_deref().unwrap_or("null"),
                    new = change.new_value.as_deref().unwrap_or("null"),
                    "field changed"
                );
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}
