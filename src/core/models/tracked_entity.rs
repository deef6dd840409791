use std::fmt;

use crate::core::models::field_value::FieldValue;

/// Pending relationship of a tracked entity to the next commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Added,
    Modified,
    Deleted,
    Unchanged,
    Detached,
}

impl EntityState {
    /// True for the states a commit would write.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            EntityState::Added | EntityState::Modified | EntityState::Deleted
        )
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityState::Added => "Added",
            EntityState::Modified => "Modified",
            EntityState::Deleted => "Deleted",
            EntityState::Unchanged => "Unchanged",
            EntityState::Detached => "Detached",
        };
        f.write_str(name)
    }
}

/// Original and current value of one property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    pub name: String,
    pub original: Option<FieldValue>,
    pub current: Option<FieldValue>,
}

impl PropertyEntry {
    pub fn is_changed(&self) -> bool {
        self.original != self.current
    }
}

/// Snapshot of one entity as the change tracker sees it.
///
/// `primary_key` lists key property names in declaration order and may
/// be empty. `properties` keeps the entity's declared property order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEntity {
    pub entity_name: String,
    pub auditable: bool,
    pub state: EntityState,
    pub primary_key: Vec<String>,
    pub properties: Vec<PropertyEntry>,
}

impl TrackedEntity {
    /// Current value of the named property, if the property exists and
    /// holds a value.
    pub fn current_value(&self, name: &str) -> Option<&FieldValue> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.current.as_ref())
    }
}
