/// All domain errors for entity-audit.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Audit writer '{writer}' failed: {reason}")]
    WriterFailed { writer: String, reason: String },

    #[error("Audit operation cancelled")]
    Cancelled,

    #[error(
        "Commit failed: {reason}\n\n  \
         No audit entries were written for this operation."
    )]
    CommitFailed { reason: String },

    #[error(
        "Commit succeeded ({rows} rows) but auditing failed: {source}\n\n  \
         The data is persisted. Writers earlier in the chain may already\n  \
         hold this batch; writers after the failing one did not receive it."
    )]
    AuditAfterCommit {
        rows: usize,
        #[source]
        source: Box<AuditError>,
    },

    #[error(
        "Entry #{handle} is not tracked by this unit of work\n\n  \
         Handles are only valid for the unit of work that issued them,\n  \
         and stop accepting changes once the entry is detached."
    )]
    EntryNotTracked { handle: usize },

    #[error("Entry #{handle} holds a '{actual}', not a '{expected}'")]
    EntityTypeMismatch {
        handle: usize,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "This audit config uses format version {config_version}, but this build \
         only supports up to version {supported_version}.\n\n  \
         Solutions:\n    \
         → Upgrade entity-audit\n    \
         → Or set format_version = {supported_version} under [audit]"
    )]
    FormatVersionTooNew {
        config_version: u32,
        supported_version: u32,
    },

    #[error("Audit log error: {detail}")]
    AuditLog { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AuditError {
    /// True when the error stems from a cancellation request, including a
    /// cancellation that interrupted dispatch after a successful commit.
    pub fn is_cancelled(&self) -> bool {
        match self {
            AuditError::Cancelled => true,
            AuditError::AuditAfterCommit { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_is_detected_through_after_commit() {
        let err = AuditError::AuditAfterCommit {
            rows: 3,
            source: Box::new(AuditError::Cancelled),
        };
        assert!(err.is_cancelled());
        assert!(err.to_string().contains("3 rows"));
    }

    #[test]
    fn writer_failure_is_not_cancellation() {
        let err = AuditError::WriterFailed {
            writer: "db".into(),
            reason: "connection reset".into(),
        };
        assert!(!err.is_cancelled());
        assert_eq!(
            err.to_string(),
            "Audit writer 'db' failed: connection reset"
        );
    }
}
