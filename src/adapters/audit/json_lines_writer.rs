use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::core::errors::{AuditError, Result};
use crate::core::models::audit_entry::{AuditAction, AuditEntry};
use crate::core::traits::audit::AuditWriter;

/// Filters applied when reading the trail back. All set filters must match.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// Exact entity type name.
    pub entity: Option<String>,
    /// Case-insensitive substring of the actor.
    pub actor: Option<String>,
    pub action: Option<AuditAction>,
    pub since: Option<DateTime<Utc>>,
}

impl AuditQuery {
    fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(entity) = &self.entity
            && entry.entity != *entity
        {
            return false;
        }

        if let Some(actor_filter) = &self.actor {
            let needle = actor_filter.to_lowercase();
            let matches_actor = entry
                .actor
                .as_ref()
                .is_some_and(|a| a.to_lowercase().contains(&needle));
            if !matches_actor {
                return false;
            }
        }

        if let Some(action) = self.action
            && entry.action != action
        {
            return false;
        }

        if let Some(since) = self.since
            && entry.timestamp < since
        {
            return false;
        }

        true
    }
}

/// Audit writer that appends entries as JSON lines to a file.
///
/// Each line in the log file is a self-contained JSON object representing
/// one `AuditEntry`. A batch is appended with a single write so readers
/// never see half of it from a successful call.
pub struct JsonLinesWriter {
    log_path: PathBuf,
}

impl JsonLinesWriter {
    /// Create a writer that appends to `{base_dir}/{log_file}`.
    pub fn new(base_dir: &Path, log_file: &str) -> Self {
        Self {
            log_path: base_dir.join(log_file),
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Read entries back in file order, keeping those matching `filter`.
    pub fn query(&self, filter: &AuditQuery) -> Result<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.log_path).map_err(|e| AuditError::AuditLog {
            detail: format!("Cannot read audit log: {e}"),
        })?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| AuditError::AuditLog {
                detail: format!("Error reading audit log line {}: {e}", line_num + 1),
            })?;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let entry: AuditEntry =
                serde_json::from_str(trimmed).map_err(|e| AuditError::AuditLog {
                    detail: format!("Malformed audit entry at line {}: {e}", line_num + 1),
                })?;

            if filter.matches(&entry) {
                entries.push(entry);
            }
        }

        Ok(entries)
    }
}

#[async_trait]
impl AuditWriter for JsonLinesWriter {
    async fn write(&self, entries: &[AuditEntry], cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(AuditError::Cancelled);
        }

        let mut buf = String::new();
        for entry in entries {
            let line = serde_json::to_string(entry).map_err(|e| AuditError::AuditLog {
                detail: format!("Failed to serialize audit entry: {e}"),
            })?;
            buf.push_str(&line);
            buf.push('\n');
        }

        if let Some(parent) = self.log_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .await
            .map_err(|e| AuditError::AuditLog {
                detail: format!("Cannot open audit log at {}: {e}", self.log_path.display()),
            })?;

        file.write_all(buf.as_bytes())
            .await
            .map_err(|e| AuditError::AuditLog {
                detail: format!("Failed to write audit entries: {e}"),
            })?;
        file.flush().await?;

        Ok(())
    }

    fn name(&self) -> &str {
        "json_lines"
    }
}
