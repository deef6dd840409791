use std::fmt;

use serde::{Deserialize, Serialize};

/// What happened to an entity within one operation.
///
/// Mirrors the tracked lifecycle state; `Unchanged` and `Detached`
/// entities never produce an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    Added,
    Modified,
    Deleted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Added => "Added",
            AuditAction::Modified => "Modified",
            AuditAction::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scalar field transition. `None` means the value was absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditChange {
    pub property: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// One entity's mutation within one operation (JSON lines format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entity: String,
    pub entity_id: String,
    pub action: AuditAction,
    pub actor: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub changes: Vec<AuditChange>,
}

/// Placeholder id for entities without a usable primary key.
pub const MISSING_ENTITY_ID: &str = "-";
