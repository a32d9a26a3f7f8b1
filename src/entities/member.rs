//! Member records and the member create input

use crate::core::field::{FieldKind, FieldValue};
use crate::core::query::SortSpec;
use crate::core::record::{Record, RecordKind};
use crate::core::validation::validators;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Center name shown when a member's center cannot be resolved
pub const UNKNOWN_CENTER: &str = "Unknown Center";

/// A registered member of a center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub center_id: String,
    #[serde(default = "unknown_center")]
    pub center_name: String,
    pub service_unit: String,
    pub gender: String,
    pub marital_status: String,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

fn unknown_center() -> String {
    UNKNOWN_CENTER.to_string()
}

impl Record for Member {
    const KIND: RecordKind = RecordKind::Member;

    fn id(&self) -> &str {
        &self.id
    }

    fn filterable_fields() -> &'static [&'static str] {
        &["center_id", "service_unit", "gender", "marital_status"]
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["full_name", "phone", "email"]
    }

    fn sortable_fields() -> &'static [(&'static str, FieldKind)] {
        &[
            ("name", FieldKind::Text),
            ("dob", FieldKind::Date),
            ("created_at", FieldKind::DateTime),
        ]
    }

    fn default_sort() -> SortSpec {
        SortSpec::desc("created_at")
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        let value: FieldValue = match field {
            "id" => self.id.as_str().into(),
            "name" | "full_name" => self.full_name.as_str().into(),
            "phone" => self.phone.as_str().into(),
            "email" => self.email.as_str().into(),
            "center_id" => self.center_id.as_str().into(),
            "center_name" => self.center_name.as_str().into(),
            "service_unit" => self.service_unit.as_str().into(),
            "gender" => self.gender.as_str().into(),
            "marital_status" => self.marital_status.as_str().into(),
            "dob" => self.dob.into(),
            "created_at" => FieldValue::DateTime(self.created_at),
            _ => return None,
        };
        Some(value)
    }
}

/// Input for registering a member
///
/// `center_name`, `id` and `created_at` are assigned by the data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateMemberInput {
    #[validate(length(min = 2, message = "Full name must be at least 2 characters"))]
    pub full_name: String,

    #[validate(
        length(min = 10, message = "Phone number must be at least 10 characters"),
        custom(function = "validators::phone")
    )]
    pub phone: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Please select a center"))]
    pub center_id: String,

    #[validate(custom(function = "validators::service_unit"))]
    pub service_unit: String,

    #[validate(custom(function = "validators::gender"))]
    pub gender: String,

    #[validate(custom(function = "validators::marital_status"))]
    pub marital_status: String,

    pub dob: NaiveDate,
}

impl CreateMemberInput {
    /// Materialise the stored record once the provider has assigned identity
    pub fn into_member(
        self,
        id: String,
        center_name: String,
        created_at: DateTime<Utc>,
    ) -> Member {
        Member {
            id,
            full_name: self.full_name,
            phone: self.phone,
            email: self.email,
            center_id: self.center_id,
            center_name,
            service_unit: self.service_unit,
            gender: self.gender,
            marital_status: self.marital_status,
            dob: Some(self.dob),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ValidationError;
    use crate::core::validation::validate_input;

    fn valid_input() -> CreateMemberInput {
        CreateMemberInput {
            full_name: "Ada Obi".to_string(),
            phone: "+2348031234567".to_string(),
            email: "ada@example.com".to_string(),
            center_id: "1".to_string(),
            service_unit: "Choir".to_string(),
            gender: "Female".to_string(),
            marital_status: "Single".to_string(),
            dob: NaiveDate::from_ymd_opt(1994, 2, 3).unwrap(),
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(validate_input(&valid_input()).is_ok());
    }

    #[test]
    fn test_invalid_fields_are_reported_by_name() {
        let input = CreateMemberInput {
            full_name: "A".to_string(),
            email: "not-an-email".to_string(),
            center_id: String::new(),
            ..valid_input()
        };

        let Err(ValidationError::FieldErrors(errors)) = validate_input(&input) else {
            panic!("expected field errors");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["center_id", "email", "full_name"]);
        assert_eq!(errors[1].message, "Invalid email address");
    }

    #[test]
    fn test_short_phone_is_rejected() {
        let input = CreateMemberInput {
            phone: "12345".to_string(),
            ..valid_input()
        };
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn test_unknown_service_unit_is_rejected() {
        let input = CreateMemberInput {
            service_unit: "Parking".to_string(),
            ..valid_input()
        };
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn test_name_sorts_by_full_name() {
        let member = valid_input().into_member(
            "m-1".to_string(),
            "Ile-Ife HQ Center".to_string(),
            Utc::now(),
        );
        assert_eq!(member.field_value("name"), Some(FieldValue::from("Ada Obi")));
        assert_eq!(Member::sort_kind("dob"), Some(FieldKind::Date));
        assert_eq!(Member::sort_kind("phone"), None);
    }

    #[test]
    fn test_missing_center_name_decodes_as_unknown() {
        let member: Member = serde_json::from_value(serde_json::json!({
            "id": "1",
            "full_name": "John Doe",
            "phone": "+1234567890",
            "email": "john@example.com",
            "center_id": "9",
            "service_unit": "Ushering",
            "gender": "Male",
            "marital_status": "Single",
            "dob": null,
            "created_at": "2024-01-15T10:30:00Z"
        }))
        .unwrap();
        assert_eq!(member.center_name, UNKNOWN_CENTER);
        assert!(member.dob.is_none());
    }
}
