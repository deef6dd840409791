use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::core::errors::{AuditError, Result};
use crate::core::models::actor_context::ActorContext;
use crate::core::services::audit_coordinator::{AuditCoordinator, audit_span};
use crate::core::traits::change_tracker::UnitOfWork;

/// Commit the unit of work and audit what it committed.
///
/// Entries are built from the snapshot taken just before the commit,
/// since committing resets the tracked states. With no coordinator the
/// commit runs alone and auditing is skipped.
///
/// Returns the commit's affected count. If auditing fails after the
/// commit went through, the error is `AuditAfterCommit` carrying that
/// count and the writer's error.
pub async fn commit_with_audit<U>(
    uow: &mut U,
    coordinator: Option<&AuditCoordinator>,
    actor: &ActorContext,
    cancel: &CancellationToken,
) -> Result<usize>
where
    U: UnitOfWork + ?Sized,
{
    let Some(coordinator) = coordinator else {
        return uow.commit(cancel).await;
    };

    if cancel.is_cancelled() {
        return Err(AuditError::Cancelled);
    }

    let entries = coordinator.build(&*uow, actor);
    let rows = uow.commit(cancel).await?;

    coordinator
        .dispatch(&entries, cancel)
        .instrument(audit_span(actor))
        .await
        .map_err(|e| AuditError::AuditAfterCommit {
            rows,
            source: Box::new(e),
        })?;

    Ok(rows)
}
