use crate::core::field::{FieldKind, FieldValue};
use crate::core::query::SortSpec;
use crate::core::record::{Record, RecordKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of change an audit log entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
        }
    }
}

/// An audit log entry shown in the dashboard activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: String,
    pub action: AuditAction,
    pub description: String,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub table_name: String,
}

impl Record for ActivityLog {
    const KIND: RecordKind = RecordKind::AuditLog;

    fn id(&self) -> &str {
        &self.id
    }

    fn filterable_fields() -> &'static [&'static str] {
        &["action", "table_name"]
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["description", "user_name"]
    }

    fn sortable_fields() -> &'static [(&'static str, FieldKind)] {
        &[("created_at", FieldKind::DateTime)]
    }

    fn default_sort() -> SortSpec {
        SortSpec::desc("created_at")
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        let value = match field {
            "id" => FieldValue::from(self.id.as_str()),
            "action" => FieldValue::from(self.action.as_str()),
            "description" => FieldValue::from(self.description.as_str()),
            "user_name" => FieldValue::from(self.user_name.as_str()),
            "table_name" => FieldValue::from(self.table_name.as_str()),
            "created_at" => FieldValue::DateTime(self.created_at),
            _ => return None,
        };
        Some(value)
    }
}
