//! Seed dataset served when no backend is configured

use crate::entities::{ActivityLog, AttendanceRecord, Center, Member, Message};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// The tables of the fixture dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureData {
    pub members: Vec<Member>,
    pub centers: Vec<Center>,
    pub attendance: Vec<AttendanceRecord>,
    pub messages: Vec<Message>,
    pub activity: Vec<ActivityLog>,
}

impl FixtureData {
    /// Decode the built-in seed tables
    pub fn seed() -> serde_json::Result<Self> {
        Ok(Self {
            members: decode(members())?,
            centers: decode(centers())?,
            attendance: decode(attendance())?,
            messages: seed_messages()?,
            activity: decode(activity())?,
        })
    }
}

/// The seed message history on its own
///
/// Also served by the admin service when the live message table is unreachable.
pub fn seed_messages() -> serde_json::Result<Vec<Message>> {
    decode(messages())
}

fn decode<T: DeserializeOwned>(rows: Value) -> serde_json::Result<Vec<T>> {
    serde_json::from_value(rows)
}

fn centers() -> Value {
    json!([
        { "id": "1", "name": "Ile-Ife HQ Center" },
        { "id": "2", "name": "Lagos Center" },
        { "id": "3", "name": "Osogbo Center" },
        { "id": "4", "name": "OAU Center" },
        { "id": "5", "name": "Ibadan Center" }
    ])
}

fn members() -> Value {
    json!([
        member("1", "John Doe", "+1234567890", "john", "1", "Ile-Ife HQ Center", "Ushering", "Male", "Single", "1990-05-15", "2024-01-15T10:30:00Z"),
        member("2", "Jane Smith", "+1234567891", "jane", "2", "Lagos Center", "Choir", "Female", "Married", "1985-08-22", "2024-01-14T15:20:00Z"),
        member("3", "Bob Johnson", "+1234567892", "bob", "1", "Ile-Ife HQ Center", "Media", "Male", "Married", "1988-12-10", "2024-01-13T09:45:00Z"),
        member("4", "Alice Brown", "+1234567893", "alice", "3", "Osogbo Center", "Children", "Female", "Single", "1992-03-18", "2024-01-12T16:10:00Z"),
        member("5", "Charlie Wilson", "+1234567894", "charlie", "4", "OAU Center", "Security", "Male", "Single", "1987-07-05", "2024-01-11T12:30:00Z"),
        member("6", "Diana Davis", "+1234567895", "diana", "5", "Ibadan Center", "Hospitality", "Female", "Married", "1991-11-28", "2024-01-10T14:15:00Z"),
        member("7", "Eva Martinez", "+1234567896", "eva", "2", "Lagos Center", "Ushering", "Female", "Single", "1989-04-12", "2024-01-09T11:20:00Z"),
        member("8", "Frank Miller", "+1234567897", "frank", "1", "Ile-Ife HQ Center", "Choir", "Male", "Married", "1986-09-30", "2024-01-08T13:45:00Z"),
        member("9", "Grace Lee", "+1234567898", "grace", "3", "Osogbo Center", "Media", "Female", "Single", "1993-01-14", "2024-01-07T10:00:00Z"),
        member("10", "Henry Taylor", "+1234567899", "henry", "4", "OAU Center", "Children", "Male", "Married", "1984-06-25", "2024-01-06T15:30:00Z"),
        member("11", "Ivy Chen", "+1234567800", "ivy", "5", "Ibadan Center", "Security", "Female", "Single", "1990-10-08", "2024-01-05T09:15:00Z"),
        member("12", "Jack Anderson", "+1234567801", "jack", "2", "Lagos Center", "Hospitality", "Male", "Single", "1988-02-17", "2024-01-04T12:45:00Z"),
        member("13", "Kate Rodriguez", "+1234567802", "kate", "1", "Ile-Ife HQ Center", "Ushering", "Female", "Married", "1987-12-03", "2024-01-03T16:20:00Z"),
        member("14", "Liam Thompson", "+1234567803", "liam", "3", "Osogbo Center", "Choir", "Male", "Single", "1991-08-19", "2024-01-02T14:10:00Z"),
        member("15", "Maya Patel", "+1234567804", "maya", "4", "OAU Center", "Media", "Female", "Married", "1989-05-26", "2024-01-01T11:30:00Z"),
        member("16", "Noah Kim", "+1234567805", "noah", "5", "Ibadan Center", "Children", "Male", "Single", "1992-03-11", "2023-12-31T13:15:00Z"),
        member("17", "Olivia White", "+1234567806", "olivia", "2", "Lagos Center", "Security", "Female", "Single", "1986-07-22", "2023-12-30T10:45:00Z"),
        member("18", "Paul Garcia", "+1234567807", "paul", "1", "Ile-Ife HQ Center", "Hospitality", "Male", "Married", "1985-11-14", "2023-12-29T15:00:00Z"),
        member("19", "Quinn Johnson", "+1234567808", "quinn", "3", "Osogbo Center", "Ushering", "Female", "Single", "1990-09-07", "2023-12-28T12:30:00Z"),
        member("20", "Ryan Davis", "+1234567809", "ryan", "1", "Ile-Ife HQ Center", "Choir", "Male", "Married", "1988-04-29", "2023-12-27T09:20:00Z")
    ])
}

#[allow(clippy::too_many_arguments)]
fn member(
    id: &str,
    full_name: &str,
    phone: &str,
    mailbox: &str,
    center_id: &str,
    center_name: &str,
    service_unit: &str,
    gender: &str,
    marital_status: &str,
    dob: &str,
    created_at: &str,
) -> Value {
    json!({
        "id": id,
        "full_name": full_name,
        "phone": phone,
        "email": format!("{mailbox}@example.com"),
        "center_id": center_id,
        "center_name": center_name,
        "service_unit": service_unit,
        "gender": gender,
        "marital_status": marital_status,
        "dob": dob,
        "created_at": created_at,
    })
}

fn attendance() -> Value {
    json!([
        headcount("1", "2024-01-28", "Sunday Service", "1", "Ile-Ife HQ Center", [50, 60, 15, 20]),
        headcount("2", "2024-01-28", "Sunday Service", "2", "Lagos Center", [30, 35, 10, 12]),
        headcount("3", "2024-01-24", "FTN Bible Study", "1", "Ile-Ife HQ Center", [25, 30, 5, 8]),
        headcount("4", "2024-01-21", "Sunday Service", "1", "Ile-Ife HQ Center", [48, 55, 14, 18]),
        headcount("5", "2024-01-21", "Sunday Service", "2", "Lagos Center", [28, 33, 9, 11]),
        headcount("6", "2024-01-17", "FTN Bible Study", "2", "Lagos Center", [35, 40, 6, 9]),
        headcount("7", "2024-01-19", "Prayer Meeting", "1", "Ile-Ife HQ Center", [20, 26, 3, 4]),
        headcount("8", "2024-01-14", "Sunday Service", "3", "Osogbo Center", [100, 120, 30, 35])
    ])
}

fn headcount(
    id: &str,
    date: &str,
    service_type: &str,
    center_id: &str,
    center_name: &str,
    [adult_male, adult_female, child_male, child_female]: [u32; 4],
) -> Value {
    json!({
        "id": id,
        "date": date,
        "service_type": service_type,
        "center_id": center_id,
        "center_name": center_name,
        "adult_male": adult_male,
        "adult_female": adult_female,
        "child_male": child_male,
        "child_female": child_female,
        "created_at": format!("{date}T18:00:00Z"),
    })
}

fn messages() -> Value {
    json!([
        {
            "id": "1",
            "sender_id": "admin-1",
            "recipient_group": "birthday",
            "recipient_filters": { "month": 12 },
            "channels": ["email", "whatsapp"],
            "subject": "Happy Birthday!",
            "content": "Wishing you a wonderful birthday celebration!",
            "status": "sent",
            "created_at": "2025-12-28T10:00:00Z"
        },
        {
            "id": "2",
            "sender_id": "admin-1",
            "recipient_group": "unit",
            "recipient_filters": { "service_unit": "Choir" },
            "channels": ["whatsapp"],
            "content": "Rehearsal reminder for Saturday at 4 PM.",
            "status": "sent",
            "created_at": "2025-12-27T15:30:00Z"
        }
    ])
}

fn activity() -> Value {
    json!([
        audit("1", "CREATE", "New member John Doe added", "2024-01-15T10:30:00Z", "members"),
        audit("2", "UPDATE", "Member Jane Smith updated", "2024-01-15T09:15:00Z", "members"),
        audit("3", "CREATE", "New center Downtown Branch added", "2024-01-14T16:45:00Z", "centers"),
        audit("4", "DELETE", "Member Bob Johnson removed", "2024-01-14T14:20:00Z", "members"),
        audit("5", "UPDATE", "Center Westside updated", "2024-01-13T11:30:00Z", "centers")
    ])
}

fn audit(id: &str, action: &str, description: &str, created_at: &str, table_name: &str) -> Value {
    json!({
        "id": id,
        "action": action,
        "description": description,
        "user_name": "Admin User",
        "created_at": created_at,
        "table_name": table_name,
    })
}
