//! Attendance headcounts per service

use crate::core::field::{FieldKind, FieldValue};
use crate::core::query::SortSpec;
use crate::core::record::{Record, RecordKind};
use crate::entities::member::UNKNOWN_CENTER;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// The kind of gathering an attendance record counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "Sunday Service")]
    SundayService,
    #[serde(rename = "FTN Bible Study")]
    FtnBibleStudy,
    #[serde(rename = "Prayer Meeting")]
    PrayerMeeting,
}

impl ServiceType {
    /// Every service type, in display order
    pub const ALL: [ServiceType; 3] = [
        ServiceType::SundayService,
        ServiceType::FtnBibleStudy,
        ServiceType::PrayerMeeting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::SundayService => "Sunday Service",
            ServiceType::FtnBibleStudy => "FTN Bible Study",
            ServiceType::PrayerMeeting => "Prayer Meeting",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headcount for one service at one center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub date: NaiveDate,
    pub service_type: ServiceType,
    pub center_id: String,
    #[serde(default = "unknown_center")]
    pub center_name: String,
    #[serde(default)]
    pub adult_male: u32,
    #[serde(default)]
    pub adult_female: u32,
    #[serde(default)]
    pub child_male: u32,
    #[serde(default)]
    pub child_female: u32,
    pub created_at: DateTime<Utc>,
}

fn unknown_center() -> String {
    UNKNOWN_CENTER.to_string()
}

impl AttendanceRecord {
    /// Sum of the four demographic counts
    pub fn total(&self) -> u64 {
        u64::from(self.adult_male)
            + u64::from(self.adult_female)
            + u64::from(self.child_male)
            + u64::from(self.child_female)
    }
}

impl Record for AttendanceRecord {
    const KIND: RecordKind = RecordKind::Attendance;

    fn id(&self) -> &str {
        &self.id
    }

    fn filterable_fields() -> &'static [&'static str] {
        &["center_id", "service_type"]
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["center_name", "service_type"]
    }

    fn sortable_fields() -> &'static [(&'static str, FieldKind)] {
        &[
            ("date", FieldKind::Date),
            ("created_at", FieldKind::DateTime),
            ("total", FieldKind::Integer),
        ]
    }

    fn default_sort() -> SortSpec {
        SortSpec::desc("date")
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        let value = match field {
            "id" => FieldValue::from(self.id.as_str()),
            "date" => FieldValue::Date(self.date),
            "service_type" => FieldValue::from(self.service_type.as_str()),
            "center_id" => FieldValue::from(self.center_id.as_str()),
            "center_name" => FieldValue::from(self.center_name.as_str()),
            "created_at" => FieldValue::DateTime(self.created_at),
            "total" => FieldValue::Integer(i64::try_from(self.total()).unwrap_or(i64::MAX)),
            _ => return None,
        };
        Some(value)
    }
}

/// Input for logging a service's attendance
///
/// Counts are unsigned, so the non-negative rule holds by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateAttendanceInput {
    pub date: NaiveDate,

    pub service_type: ServiceType,

    #[validate(length(min = 1, message = "Please select a center"))]
    pub center_id: String,

    #[serde(default)]
    pub adult_male: u32,
    #[serde(default)]
    pub adult_female: u32,
    #[serde(default)]
    pub child_male: u32,
    #[serde(default)]
    pub child_female: u32,
}

impl CreateAttendanceInput {
    pub fn into_record(
        self,
        id: String,
        center_name: String,
        created_at: DateTime<Utc>,
    ) -> AttendanceRecord {
        AttendanceRecord {
            id,
            date: self.date,
            service_type: self.service_type,
            center_id: self.center_id,
            center_name,
            adult_male: self.adult_male,
            adult_female: self.adult_female,
            child_male: self.child_male,
            child_female: self.child_female,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_type_uses_display_names_on_the_wire() {
        let json = serde_json::to_string(&ServiceType::FtnBibleStudy).unwrap();
        assert_eq!(json, "\"FTN Bible Study\"");

        let parsed: ServiceType = serde_json::from_str("\"Prayer Meeting\"").unwrap();
        assert_eq!(parsed, ServiceType::PrayerMeeting);

        assert!(serde_json::from_str::<ServiceType>("\"Choir Practice\"").is_err());
    }

    #[test]
    fn test_total_sums_all_categories() {
        let record = CreateAttendanceInput {
            date: NaiveDate::from_ymd_opt(2024, 1, 28).unwrap(),
            service_type: ServiceType::SundayService,
            center_id: "1".to_string(),
            adult_male: 50,
            adult_female: 60,
            child_male: 15,
            child_female: 20,
        }
        .into_record("a-1".to_string(), "Ile-Ife HQ Center".to_string(), Utc::now());

        assert_eq!(record.total(), 145);
        assert_eq!(record.field_value("total"), Some(FieldValue::Integer(145)));
    }

    #[test]
    fn test_negative_counts_do_not_decode() {
        let result = serde_json::from_value::<CreateAttendanceInput>(serde_json::json!({
            "date": "2024-01-28",
            "service_type": "Sunday Service",
            "center_id": "1",
            "adult_male": -3
        }));
        assert!(result.is_err());
    }
}
