use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::errors::Result;
use crate::core::models::audit_entry::AuditEntry;
use crate::core::traits::audit::AuditWriter;

/// Audit writer that keeps every batch in memory.
///
/// Clones share the same buffer, so a host can register one clone with
/// the coordinator and read batches back through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    batches: Arc<Mutex<Vec<Vec<AuditEntry>>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `write` calls received.
    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    /// Batches in the order they were written.
    pub fn batches(&self) -> Vec<Vec<AuditEntry>> {
        self.lock().clone()
    }

    /// All entries across batches, in write order.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.lock().iter().flatten().cloned().collect()
    }

    /// Remove and return everything written so far.
    pub fn drain(&self) -> Vec<Vec<AuditEntry>> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Vec<AuditEntry>>> {
        // A panic while holding the lock cannot leave a half-pushed batch.
        self.batches.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AuditWriter for MemoryWriter {
    async fn write(&self, entries: &[AuditEntry], _cancel: &CancellationToken) -> Result<()> {
        self.lock().push(entries.to_vec());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
