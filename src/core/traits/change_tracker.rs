use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::errors::Result;
use crate::core::models::tracked_entity::TrackedEntity;

/// Port onto the persistence layer's change tracking.
pub trait ChangeTracker: Send + Sync {
    /// Snapshot of every tracked entity, in tracking order.
    fn entries(&self) -> Vec<TrackedEntity>;

    /// Snapshot restricted to entities tagged auditable.
    fn auditable_entries(&self) -> Vec<TrackedEntity> {
        self.entries().into_iter().filter(|e| e.auditable).collect()
    }

    /// True if at least one auditable entity has a pending change.
    fn has_auditable_changes(&self) -> bool {
        self.entries()
            .iter()
            .any(|e| e.auditable && e.state.is_pending())
    }
}

/// A unit of work whose pending changes can be committed.
#[async_trait]
pub trait UnitOfWork: ChangeTracker {
    /// Persist pending changes and return the number of affected entities.
    ///
    /// After a successful commit the tracker reports the committed
    /// entities as `Unchanged` (or `Detached` for deletions).
    async fn commit(&mut self, cancel: &CancellationToken) -> Result<usize>;
}
