use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::core::errors::{AuditError, Result};
use crate::core::models::actor_context::ActorContext;
use crate::core::models::audit_entry::AuditEntry;
use crate::core::services::entry_builder::EntryBuilder;
use crate::core::traits::audit::AuditWriter;
use crate::core::traits::change_tracker::ChangeTracker;

/// Builds audit entries for an operation and hands them to every
/// registered writer.
///
/// Writers run one at a time, in registration order. The first failure
/// (or cancellation) stops the chain and is returned unchanged; writers
/// that already ran keep what they received.
#[derive(Clone, Default)]
pub struct AuditCoordinator {
    writers: Vec<Arc<dyn AuditWriter>>,
}

impl AuditCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a writer to the end of the chain.
    pub fn with_writer(mut self, writer: impl AuditWriter + 'static) -> Self {
        self.writers.push(Arc::new(writer));
        self
    }

    /// Append a shared writer to the end of the chain.
    pub fn register(&mut self, writer: Arc<dyn AuditWriter>) {
        self.writers.push(writer);
    }

    pub fn writer_count(&self) -> usize {
        self.writers.len()
    }

    /// Writer names in dispatch order.
    pub fn writer_names(&self) -> Vec<&str> {
        self.writers.iter().map(|w| w.name()).collect()
    }

    /// Build entries from the tracker's current snapshot.
    pub fn build<T>(&self, tracker: &T, actor: &ActorContext) -> Vec<AuditEntry>
    where
        T: ChangeTracker + ?Sized,
    {
        let snapshot = tracker.auditable_entries();
        let entries = EntryBuilder.build(&snapshot, actor.actor.as_deref());
        tracing::debug!(
            tracked = snapshot.len(),
            entries = entries.len(),
            "built audit entries"
        );
        entries
    }

    /// Hand `entries` to every writer in order. Does nothing for an
    /// empty batch.
    pub async fn dispatch(&self, entries: &[AuditEntry], cancel: &CancellationToken) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        for writer in &self.writers {
            if cancel.is_cancelled() {
                tracing::info!(writer = writer.name(), "audit dispatch cancelled");
                return Err(AuditError::Cancelled);
            }

            tracing::debug!(writer = writer.name(), entries = entries.len(), "dispatching");
            if let Err(e) = writer.write(entries, cancel).await {
                if e.is_cancelled() {
                    tracing::info!(writer = writer.name(), "audit writer cancelled");
                } else {
                    tracing::warn!(writer = writer.name(), error = %e, "audit writer failed");
                }
                return Err(e);
            }
        }

        Ok(())
    }

    /// Build and dispatch the entries for the tracker's pending changes.
    pub async fn record<T>(
        &self,
        tracker: &T,
        actor: &ActorContext,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        T: ChangeTracker + ?Sized,
    {
        self.record_with_result(tracker, actor, cancel).await?;
        Ok(())
    }

    /// Like [`record`](Self::record), but also returns the built entries.
    /// The list is returned even when no writer is registered.
    pub async fn record_with_result<T>(
        &self,
        tracker: &T,
        actor: &ActorContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<AuditEntry>>
    where
        T: ChangeTracker + ?Sized,
    {
        self.build_and_dispatch(tracker, actor, cancel)
            .instrument(audit_span(actor))
            .await
    }

    async fn build_and_dispatch<T>(
        &self,
        tracker: &T,
        actor: &ActorContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<AuditEntry>>
    where
        T: ChangeTracker + ?Sized,
    {
        if cancel.is_cancelled() {
            tracing::info!("audit cancelled before build");
            return Err(AuditError::Cancelled);
        }

        let entries = self.build(tracker, actor);
        self.dispatch(&entries, cancel).await?;
        Ok(entries)
    }
}

/// Span carrying the operation's identity for every event inside it.
pub(crate) fn audit_span(actor: &ActorContext) -> tracing::Span {
    tracing::debug_span!(
        "audit",
        correlation_id = actor.correlation_id.as_deref().unwrap_or("-"),
        actor_id = actor.actor_id.as_deref().unwrap_or("-"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::audit::memory_writer::MemoryWriter;
    use crate::core::models::audit_entry::AuditAction;
    use crate::core::models::tracked_entity::{EntityState, PropertyEntry, TrackedEntity};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedTracker(Vec<TrackedEntity>);

    impl ChangeTracker for FixedTracker {
        fn entries(&self) -> Vec<TrackedEntity> {
            self.0.clone()
        }
    }

    fn invoice(state: EntityState) -> TrackedEntity {
        TrackedEntity {
            entity_name: "Invoice".into(),
            auditable: true,
            state,
            primary_key: vec!["Id".into()],
            properties: vec![
                PropertyEntry {
                    name: "Id".into(),
                    original: Some(42.into()),
                    current: Some(42.into()),
                },
                PropertyEntry {
                    name: "Status".into(),
                    original: Some("Draft".into()),
                    current: Some("Sent".into()),
                },
            ],
        }
    }

    /// Writer that records its name into a shared call log and can be
    /// told to fail or to cancel the token it receives.
    struct ScriptedWriter {
        name: String,
        calls: Arc<Mutex<Vec<String>>>,
        fail: bool,
        cancel_on_call: Option<CancellationToken>,
    }

    impl ScriptedWriter {
        fn new(name: &str, calls: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name: name.to_string(),
                calls: Arc::clone(calls),
                fail: false,
                cancel_on_call: None,
            }
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        fn cancelling(mut self, token: &CancellationToken) -> Self {
            self.cancel_on_call = Some(token.clone());
            self
        }
    }

    #[async_trait]
    impl AuditWriter for ScriptedWriter {
        async fn write(&self, _entries: &[AuditEntry], _cancel: &CancellationToken) -> Result<()> {
            self.calls.lock().unwrap().push(self.name.clone());
            if let Some(token) = &self.cancel_on_call {
                token.cancel();
            }
            if self.fail {
                return Err(AuditError::WriterFailed {
                    writer: self.name.clone(),
                    reason: "disk full".into(),
                });
            }
            Ok(())
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    #[tokio::test]
    async fn no_entries_means_no_writer_calls() {
        let sink = MemoryWriter::new();
        let coordinator = AuditCoordinator::new().with_writer(sink.clone());
        let tracker = FixedTracker(vec![invoice(EntityState::Unchanged)]);

        let entries = coordinator
            .record_with_result(&tracker, &ActorContext::anonymous(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(entries.is_empty());
        assert_eq!(sink.call_count(), 0);
    }

    #[tokio::test]
    async fn writers_run_in_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let coordinator = AuditCoordinator::new()
            .with_writer(ScriptedWriter::new("first", &calls))
            .with_writer(ScriptedWriter::new("second", &calls))
            .with_writer(ScriptedWriter::new("third", &calls));
        let tracker = FixedTracker(vec![invoice(EntityState::Modified)]);

        coordinator
            .record(&tracker, &ActorContext::anonymous(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["first", "second", "third"]);
        assert_eq!(coordinator.writer_names(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn failing_writer_stops_the_chain() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let coordinator = AuditCoordinator::new()
            .with_writer(ScriptedWriter::new("first", &calls))
            .with_writer(ScriptedWriter::new("broken", &calls).failing())
            .with_writer(ScriptedWriter::new("never", &calls));
        let tracker = FixedTracker(vec![invoice(EntityState::Modified)]);

        let err = coordinator
            .record(&tracker, &ActorContext::anonymous(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AuditError::WriterFailed { ref writer, .. } if writer == "broken"));
        assert_eq!(*calls.lock().unwrap(), vec!["first", "broken"]);
    }

    #[tokio::test]
    async fn cancellation_before_build_touches_nothing() {
        let sink = MemoryWriter::new();
        let coordinator = AuditCoordinator::new().with_writer(sink.clone());
        let tracker = FixedTracker(vec![invoice(EntityState::Added)]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = coordinator
            .record(&tracker, &ActorContext::anonymous(), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(sink.call_count(), 0);
    }

    #[tokio::test]
    async fn cancellation_between_writers_stops_dispatch() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let cancel = CancellationToken::new();
        let coordinator = AuditCoordinator::new()
            .with_writer(ScriptedWriter::new("first", &calls).cancelling(&cancel))
            .with_writer(ScriptedWriter::new("second", &calls));
        let tracker = FixedTracker(vec![invoice(EntityState::Deleted)]);

        let err = coordinator
            .record(&tracker, &ActorContext::anonymous(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, AuditError::Cancelled));
        assert_eq!(*calls.lock().unwrap(), vec!["first"]);
    }

    #[tokio::test]
    async fn result_is_returned_without_writers() {
        let coordinator = AuditCoordinator::new();
        let tracker = FixedTracker(vec![
            invoice(EntityState::Modified),
            invoice(EntityState::Added),
        ]);
        let actor = ActorContext::anonymous().with_actor("alice");

        let entries = coordinator
            .record_with_result(&tracker, &actor, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, AuditAction::Modified);
        assert_eq!(entries[1].action, AuditAction::Added);
        assert!(entries.iter().all(|e| e.actor.as_deref() == Some("alice")));
    }

    #[tokio::test]
    async fn dispatch_skips_empty_batches() {
        let sink = MemoryWriter::new();
        let coordinator = AuditCoordinator::new().with_writer(sink.clone());

        coordinator
            .dispatch(&[], &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(sink.call_count(), 0);
    }
}
