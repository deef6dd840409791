use chrono::Utc;

use crate::core::models::audit_entry::{AuditAction, AuditChange, AuditEntry, MISSING_ENTITY_ID};
use crate::core::models::tracked_entity::{EntityState, TrackedEntity};

/// Turns a change-tracker snapshot into audit entries.
pub struct EntryBuilder;

impl EntryBuilder {
    /// Build one entry per auditable entity with a pending change.
    ///
    /// - Non-auditable, `Unchanged` and `Detached` entities are skipped
    /// - `Modified` entities list every property whose original and
    ///   current values differ, in property order
    /// - `Added` and `Deleted` entities carry no changes
    ///
    /// Output follows snapshot order. Each entry is stamped with the
    /// clock at the time it is built.
    pub fn build<'a, I>(&self, tracked: I, actor: Option<&str>) -> Vec<AuditEntry>
    where
        I: IntoIterator<Item = &'a TrackedEntity>,
    {
        let mut entries = Vec::new();

        for entity in tracked {
            if !entity.auditable {
                continue;
            }

            let action = match entity.state {
                EntityState::Added => AuditAction::Added,
                EntityState::Modified => AuditAction::Modified,
                EntityState::Deleted => AuditAction::Deleted,
                EntityState::Unchanged | EntityState::Detached => continue,
            };

            let changes = if action == AuditAction::Modified {
                Self::changes(entity)
            } else {
                Vec::new()
            };

            entries.push(AuditEntry {
                entity: entity.entity_name.clone(),
                entity_id: Self::entity_id(entity),
                action,
                actor: actor.map(str::to_string),
                timestamp: Utc::now(),
                changes,
            });
        }

        entries
    }

    /// Comma-joined key values, or `-` when the entity has no key or any
    /// key value is missing.
    pub fn entity_id(entity: &TrackedEntity) -> String {
        if entity.primary_key.is_empty() {
            return MISSING_ENTITY_ID.to_string();
        }

        let parts: Option<Vec<String>> = entity
            .primary_key
            .iter()
            .map(|name| entity.current_value(name).map(|v| v.to_string()))
            .collect();

        match parts {
            Some(parts) => parts.join(","),
            None => MISSING_ENTITY_ID.to_string(),
        }
    }

    fn changes(entity: &TrackedEntity) -> Vec<AuditChange> {
        entity
            .properties
            .iter()
            .filter(|p| p.is_changed())
            .map(|p| AuditChange {
                property: p.name.clone(),
                old_value: p.original.as_ref().map(|v| v.to_string()),
                new_value: p.current.as_ref().map(|v| v.to_string()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::field_value::FieldValue;
    use crate::core::models::tracked_entity::PropertyEntry;

    fn prop(name: &str, original: Option<FieldValue>, current: Option<FieldValue>) -> PropertyEntry {
        PropertyEntry {
            name: name.to_string(),
            original,
            current,
        }
    }

    /// Helper to build a snapshot with the given key and properties.
    fn tracked(
        name: &str,
        state: EntityState,
        key: &[&str],
        properties: Vec<PropertyEntry>,
    ) -> TrackedEntity {
        TrackedEntity {
            entity_name: name.to_string(),
            auditable: true,
            state,
            primary_key: key.iter().map(|k| k.to_string()).collect(),
            properties,
        }
    }

    fn invoice(state: EntityState) -> TrackedEntity {
        tracked(
            "Invoice",
            state,
            &["Id"],
            vec![
                prop("Id", Some(42.into()), Some(42.into())),
                prop("Status", Some("Draft".into()), Some("Sent".into())),
                prop("Total", Some(99.5.into()), Some(99.5.into())),
            ],
        )
    }

    #[test]
    fn modified_invoice_lists_only_changed_fields() {
        let before = Utc::now();
        let entries = EntryBuilder.build(&[invoice(EntityState::Modified)], Some("alice"));
        let after = Utc::now();

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.entity, "Invoice");
        assert_eq!(entry.entity_id, "42");
        assert_eq!(entry.action, AuditAction::Modified);
        assert_eq!(entry.actor.as_deref(), Some("alice"));
        assert!(entry.timestamp >= before && entry.timestamp <= after);
        assert_eq!(
            entry.changes,
            vec![AuditChange {
                property: "Status".into(),
                old_value: Some("Draft".into()),
                new_value: Some("Sent".into()),
            }]
        );
    }

    #[test]
    fn added_order_without_key_uses_placeholder_id() {
        let order = tracked(
            "Order",
            EntityState::Added,
            &[],
            vec![prop("Reference", None, Some("A-1".into()))],
        );
        let entries = EntryBuilder.build(&[order], None);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity, "Order");
        assert_eq!(entries[0].entity_id, "-");
        assert_eq!(entries[0].action, AuditAction::Added);
        assert!(entries[0].actor.is_none());
        assert!(entries[0].changes.is_empty());
    }

    #[test]
    fn unchanged_and_detached_are_skipped() {
        let snapshot = [invoice(EntityState::Unchanged), invoice(EntityState::Detached)];
        assert!(EntryBuilder.build(&snapshot, Some("alice")).is_empty());
    }

    #[test]
    fn non_auditable_entities_are_invisible() {
        let mut hidden = invoice(EntityState::Modified);
        hidden.auditable = false;
        assert!(EntryBuilder.build(&[hidden], None).is_empty());
    }

    #[test]
    fn modified_without_differences_still_produces_entry() {
        let entity = tracked(
            "Invoice",
            EntityState::Modified,
            &["Id"],
            vec![
                prop("Id", Some(1.into()), Some(1.into())),
                prop("Status", Some("Draft".into()), Some("Draft".into())),
            ],
        );
        let entries = EntryBuilder.build(&[entity], None);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Modified);
        assert!(entries[0].changes.is_empty());
    }

    #[test]
    fn added_and_deleted_never_carry_changes() {
        let mut added = invoice(EntityState::Added);
        added.properties[1].original = None;
        let deleted = invoice(EntityState::Deleted);

        let entries = EntryBuilder.build(&[added, deleted], None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, AuditAction::Added);
        assert_eq!(entries[1].action, AuditAction::Deleted);
        assert!(entries.iter().all(|e| e.changes.is_empty()));
    }

    #[test]
    fn composite_key_joined_in_declared_order() {
        let line = tracked(
            "InvoiceLine",
            EntityState::Deleted,
            &["InvoiceId", "LineNo"],
            vec![
                prop("LineNo", Some(3.into()), Some(3.into())),
                prop("InvoiceId", Some(42.into()), Some(42.into())),
            ],
        );
        assert_eq!(EntryBuilder::entity_id(&line), "42,3");
    }

    #[test]
    fn any_missing_key_part_replaces_whole_id() {
        let line = tracked(
            "InvoiceLine",
            EntityState::Added,
            &["InvoiceId", "LineNo"],
            vec![
                prop("InvoiceId", None, Some(42.into())),
                prop("LineNo", None, None),
            ],
        );
        assert_eq!(EntryBuilder::entity_id(&line), "-");

        let unknown_key = tracked("Tag", EntityState::Added, &["Slug"], vec![]);
        assert_eq!(EntryBuilder::entity_id(&unknown_key), "-");
    }

    #[test]
    fn null_transitions_render_as_none_not_empty() {
        let entity = tracked(
            "Customer",
            EntityState::Modified,
            &["Id"],
            vec![
                prop("Id", Some(7.into()), Some(7.into())),
                prop("Phone", None, Some("".into())),
                prop("Email", Some("a@b.c".into()), None),
            ],
        );
        let changes = &EntryBuilder.build(&[entity], None)[0].changes;

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].property, "Phone");
        assert_eq!(changes[0].old_value, None);
        assert_eq!(changes[0].new_value.as_deref(), Some(""));
        assert_eq!(changes[1].property, "Email");
        assert_eq!(changes[1].old_value.as_deref(), Some("a@b.c"));
        assert_eq!(changes[1].new_value, None);
    }

    #[test]
    fn preserves_snapshot_order() {
        let a = tracked("Zeta", EntityState::Added, &[], vec![]);
        let b = tracked("Alpha", EntityState::Deleted, &[], vec![]);
        let c = tracked("Mid", EntityState::Modified, &[], vec![]);

        let names: Vec<String> = EntryBuilder
            .build(&[a, b, c], None)
            .into_iter()
            .map(|e| e.entity)
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn empty_snapshot_builds_nothing() {
        let snapshot: Vec<TrackedEntity> = Vec::new();
        assert!(EntryBuilder.build(&snapshot, Some("alice")).is_empty());
    }
}
