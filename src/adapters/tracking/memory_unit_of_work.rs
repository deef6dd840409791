use std::any::Any;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::errors::{AuditError, Result};
use crate::core::models::field_value::FieldValue;
use crate::core::models::tracked_entity::{EntityState, PropertyEntry, TrackedEntity};
use crate::core::traits::change_tracker::{ChangeTracker, UnitOfWork};
use crate::core::traits::entity::Entity;

type PropertyValues = Vec<(&'static str, Option<FieldValue>)>;

/// Object-safe view of an `Entity`, so one unit of work can track
/// several entity types.
trait ErasedEntity: Send + Sync {
    fn name(&self) -> &'static str;
    fn primary_key(&self) -> &'static [&'static str];
    fn auditable(&self) -> bool;
    fn values(&self) -> PropertyValues;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Entity> ErasedEntity for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn primary_key(&self) -> &'static [&'static str] {
        T::PRIMARY_KEY
    }

    fn auditable(&self) -> bool {
        T::AUDITABLE
    }

    fn values(&self) -> PropertyValues {
        self.properties()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Handle to an entity tracked by an [`InMemoryUnitOfWork`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(usize);

impl EntryHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

struct Slot {
    entity: Box<dyn ErasedEntity>,
    original: PropertyValues,
    state: EntityState,
}

impl Slot {
    fn snapshot(&self) -> TrackedEntity {
        let properties = self
            .entity
            .values()
            .into_iter()
            .map(|(name, current)| {
                let original = self
                    .original
                    .iter()
                    .find(|(n, _)| *n == name)
                    .and_then(|(_, v)| v.clone());
                PropertyEntry {
                    name: name.to_string(),
                    original,
                    current,
                }
            })
            .collect();

        TrackedEntity {
            entity_name: self.entity.name().to_string(),
            auditable: self.entity.auditable(),
            state: self.state,
            primary_key: self
                .entity
                .primary_key()
                .iter()
                .map(|k| k.to_string())
                .collect(),
            properties,
        }
    }
}

/// Change tracker and unit of work kept entirely in memory.
///
/// Tracks entities in insertion order and records the values each one
/// had when it was attached or last committed, which is what `Modified`
/// entries are diffed against.
#[derive(Default)]
pub struct InMemoryUnitOfWork {
    slots: Vec<Slot>,
}

impl InMemoryUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new entity, to be inserted on commit.
    pub fn add<T: Entity>(&mut self, entity: T) -> EntryHandle {
        self.track(entity, EntityState::Added)
    }

    /// Track an existing entity as it was loaded.
    pub fn attach<T: Entity>(&mut self, entity: T) -> EntryHandle {
        self.track(entity, EntityState::Unchanged)
    }

    /// Mutate a tracked entity. An `Unchanged` entry becomes `Modified`
    /// even if `f` leaves every value as it was.
    pub fn modify<T, F>(&mut self, handle: EntryHandle, f: F) -> Result<()>
    where
        T: Entity,
        F: FnOnce(&mut T),
    {
        let slot = self.live_slot_mut(handle)?;
        let actual = slot.entity.name();
        let entity = slot
            .entity
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(AuditError::EntityTypeMismatch {
                handle: handle.0,
                expected: T::NAME,
                actual,
            })?;

        f(entity);

        if slot.state == EntityState::Unchanged {
            slot.state = EntityState::Modified;
        }
        Ok(())
    }

    /// Mark an entity for deletion. An entity added in this unit of work
    /// is simply dropped from tracking.
    pub fn remove(&mut self, handle: EntryHandle) -> Result<()> {
        let slot = self.live_slot_mut(handle)?;
        slot.state = match slot.state {
            EntityState::Added => EntityState::Detached,
            _ => EntityState::Deleted,
        };
        Ok(())
    }

    /// Stop tracking an entity. Pending changes to it are discarded.
    pub fn detach(&mut self, handle: EntryHandle) -> Result<()> {
        self.live_slot_mut(handle)?.state = EntityState::Detached;
        Ok(())
    }

    pub fn get<T: Entity>(&self, handle: EntryHandle) -> Result<&T> {
        let slot = self
            .slots
            .get(handle.0)
            .ok_or(AuditError::EntryNotTracked { handle: handle.0 })?;
        slot.entity
            .as_any()
            .downcast_ref::<T>()
            .ok_or(AuditError::EntityTypeMismatch {
                handle: handle.0,
                expected: T::NAME,
                actual: slot.entity.name(),
            })
    }

    pub fn state(&self, handle: EntryHandle) -> Result<EntityState> {
        self.slots
            .get(handle.0)
            .map(|s| s.state)
            .ok_or(AuditError::EntryNotTracked { handle: handle.0 })
    }

    fn track<T: Entity>(&mut self, entity: T, state: EntityState) -> EntryHandle {
        let original = entity.properties();
        self.slots.push(Slot {
            entity: Box::new(entity),
            original,
            state,
        });
        EntryHandle(self.slots.len() - 1)
    }

    fn live_slot_mut(&mut self, handle: EntryHandle) -> Result<&mut Slot> {
        match self.slots.get_mut(handle.0) {
            Some(slot) if slot.state != EntityState::Detached => Ok(slot),
            _ => Err(AuditError::EntryNotTracked { handle: handle.0 }),
        }
    }
}

impl ChangeTracker for InMemoryUnitOfWork {
    fn entries(&self) -> Vec<TrackedEntity> {
        self.slots.iter().map(Slot::snapshot).collect()
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit(&mut self, cancel: &CancellationToken) -> Result<usize> {
        if cancel.is_cancelled() {
            return Err(AuditError::Cancelled);
        }

        let mut affected = 0;
        for slot in &mut self.slots {
            match slot.state {
                EntityState::Added | EntityState::Modified => {
                    slot.original = slot.entity.values();
                    slot.state = EntityState::Unchanged;
                    affected += 1;
                }
                EntityState::Deleted => {
                    slot.state = EntityState::Detached;
                    affected += 1;
                }
                EntityState::Unchanged | EntityState::Detached => {}
            }
        }

        tracing::debug!(affected, "committed unit of work");
        Ok(affected)
    }
}
