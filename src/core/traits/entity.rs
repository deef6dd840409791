use crate::core::models::field_value::FieldValue;

/// A persistable type the change tracker can observe.
///
/// `AUDITABLE` is the opt-in tag: trackers copy it into every snapshot
/// they produce, and entities without it are invisible to the entry
/// builder whatever their state.
pub trait Entity: Send + Sync + 'static {
    /// Declared type name, used as `AuditEntry::entity`.
    const NAME: &'static str;

    /// Primary key property names in declaration order. Empty when the
    /// type has no key.
    const PRIMARY_KEY: &'static [&'static str] = &[];

    const AUDITABLE: bool = false;

    /// Current scalar property values in declaration order.
    fn properties(&self) -> Vec<(&'static str, Option<FieldValue>)>;
}
