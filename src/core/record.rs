//! The record abstraction every listing domain implements

use crate::core::field::{FieldKind, FieldValue};
use crate::core::query::SortSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The backend table a record type lives in
///
/// Also used as the cache tag: a write to one kind invalidates only the
/// cached queries tagged with that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Member,
    Center,
    Attendance,
    Message,
    AuditLog,
}

impl RecordKind {
    /// Every kind, in declaration order
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Member,
        RecordKind::Center,
        RecordKind::Attendance,
        RecordKind::Message,
        RecordKind::AuditLog,
    ];

    /// Backend table name
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::Member => "members",
            RecordKind::Center => "centers",
            RecordKind::Attendance => "attendance",
            RecordKind::Message => "messages",
            RecordKind::AuditLog => "audit_logs",
        }
    }

    /// Singular name used in messages and logs
    pub fn singular(&self) -> &'static str {
        match self {
            RecordKind::Member => "member",
            RecordKind::Center => "center",
            RecordKind::Attendance => "attendance record",
            RecordKind::Message => "message",
            RecordKind::AuditLog => "audit log",
        }
    }

    /// How long a cached read of this kind stays fresh
    pub fn stale_time(&self) -> Duration {
        match self {
            RecordKind::Center => Duration::from_secs(10 * 60),
            RecordKind::Member
            | RecordKind::Attendance
            | RecordKind::Message
            | RecordKind::AuditLog => Duration::from_secs(2 * 60),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// A read-only row snapshot that can flow through the listing pipeline.
///
/// Implementors declare which of their fields are filterable (exact match),
/// searchable (case-insensitive substring) and sortable (typed comparison),
/// and expose every declared field through [`Record::field_value`].
pub trait Record: Clone + Send + Sync + 'static {
    /// The table this record type is read from
    const KIND: RecordKind;

    /// Unique identifier
    fn id(&self) -> &str;

    /// Fields accepted in a [`FilterSpec`](crate::core::query::FilterSpec)
    fn filterable_fields() -> &'static [&'static str];

    /// Fields a search term is matched against
    fn searchable_fields() -> &'static [&'static str];

    /// Fields accepted in a [`SortSpec`] or a range filter, with their comparison kind
    fn sortable_fields() -> &'static [(&'static str, FieldKind)];

    /// Sort applied when the query does not name one
    fn default_sort() -> SortSpec;

    /// Read a declared field by name
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Comparison kind of a sortable field, if it is one
    fn sort_kind(field: &str) -> Option<FieldKind> {
        Self::sortable_fields()
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, kind)| *kind)
    }

    /// Whether the lower-cased term appears in any searchable field
    fn matches_search(&self, lowered_term: &str) -> bool {
        Self::searchable_fields().iter().any(|field| {
            self.field_value(field)
                .and_then(|v| v.as_text().map(|s| s.to_lowercase()))
                .is_some_and(|s| s.contains(lowered_term))
        })
    }
}
