use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::errors::Result;
use crate::core::models::audit_entry::AuditEntry;

/// Port for audit sinks.
///
/// Implementations live in `adapters::audit` (e.g. JsonLinesWriter,
/// TracingWriter) or in the host application. The coordinator calls
/// writers one after another and never retries, so a writer must accept
/// seeing the same batch again after a partial failure.
#[async_trait]
pub trait AuditWriter: Send + Sync {
    /// Persist or forward one operation's entries. Never called with an
    /// empty slice.
    ///
    /// Long-running writers should watch `cancel` and return
    /// `AuditError::Cancelled` when it fires.
    async fn write(&self, entries: &[AuditEntry], cancel: &CancellationToken) -> Result<()>;

    /// Human-readable name of this writer (e.g. "json_lines", "tracing").
    fn name(&self) -> &str;
}
