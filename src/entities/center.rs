use crate::core::field::{FieldKind, FieldValue};
use crate::core::query::SortSpec;
use crate::core::record::{Record, RecordKind};
use serde::{Deserialize, Serialize};

/// A feeding center / church branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Center {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Center {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
        }
    }
}

impl Record for Center {
    const KIND: RecordKind = RecordKind::Center;

    fn id(&self) -> &str {
        &self.id
    }

    fn filterable_fields() -> &'static [&'static str] {
        &[]
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["name", "address"]
    }

    fn sortable_fields() -> &'static [(&'static str, FieldKind)] {
        &[("name", FieldKind::Text)]
    }

    fn default_sort() -> SortSpec {
        SortSpec::asc("name")
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.as_str().into()),
            "name" => Some(self.name.as_str().into()),
            "address" => Some(
                self.address
                    .as_deref()
                    .map(FieldValue::from)
                    .unwrap_or(FieldValue::Null),
            ),
            _ => None,
        }
    }
}
