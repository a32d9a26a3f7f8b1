//! In-memory data provider for development and tests
//!
//! Serves a deterministic seed dataset. Writes are kept in memory so later
//! reads in the same process see them.

pub mod data;

pub use data::{FixtureData, seed_messages};

use crate::core::error::{FetchError, Result};
use crate::core::provider::DataProvider;
use crate::entities::{
    ActivityLog, AttendanceRecord, Center, CreateAttendanceInput, CreateMemberInput, Member,
    Message, SendMessageInput, UNKNOWN_CENTER,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Sender recorded on messages composed through the fixture
pub const FIXTURE_SENDER: &str = "admin-1";

/// In-memory data provider
///
/// Cloning shares the underlying tables. Uses RwLock for thread-safe access.
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    data: Arc<RwLock<FixtureData>>,
}

impl FixtureProvider {
    /// Create a provider over the built-in seed dataset
    pub fn new() -> Result<Self> {
        let data = FixtureData::seed().map_err(|e| FetchError::Store {
            message: format!("failed to decode seed data: {}", e),
        })?;
        Ok(Self::with_data(data))
    }

    /// Create a provider over caller-supplied tables
    pub fn with_data(data: FixtureData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Snapshot of every table
    pub fn snapshot(&self) -> Result<FixtureData> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, FixtureData>> {
        self.data.read().map_err(|e| {
            FetchError::Store {
                message: format!("Failed to acquire read lock: {}", e),
            }
            .into()
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, FixtureData>> {
        self.data.write().map_err(|e| {
            FetchError::Store {
                message: format!("Failed to acquire write lock: {}", e),
            }
            .into()
        })
    }
}

fn center_name(centers: &[Center], center_id: &str) -> String {
    centers
        .iter()
        .find(|c| c.id == center_id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| UNKNOWN_CENTER.to_string())
}

#[async_trait]
impl DataProvider for FixtureProvider {
    fn backend_name(&self) -> &'static str {
        "fixture"
    }

    async fn fetch_members(&self) -> Result<Vec<Member>> {
        Ok(self.read()?.members.clone())
    }

    async fn fetch_centers(&self) -> Result<Vec<Center>> {
        Ok(self.read()?.centers.clone())
    }

    async fn fetch_attendance(&self) -> Result<Vec<AttendanceRecord>> {
        Ok(self.read()?.attendance.clone())
    }

    async fn fetch_messages(&self) -> Result<Vec<Message>> {
        Ok(self.read()?.messages.clone())
    }

    async fn fetch_activity(&self) -> Result<Vec<ActivityLog>> {
        Ok(self.read()?.activity.clone())
    }

    async fn create_member(&self, input: CreateMemberInput) -> Result<Member> {
        let mut data = self.write()?;

        let name = center_name(&data.centers, &input.center_id);
        let member = input.into_member(Uuid::new_v4().to_string(), name, Utc::now());
        data.members.push(member.clone());

        Ok(member)
    }

    async fn create_attendance(&self, input: CreateAttendanceInput) -> Result<AttendanceRecord> {
        let mut data = self.write()?;

        let name = center_name(&data.centers, &input.center_id);
        let record = input.into_record(Uuid::new_v4().to_string(), name, Utc::now());
        data.attendance.push(record.clone());

        Ok(record)
    }

    async fn send_message(&self, input: SendMessageInput) -> Result<Message> {
        let mut data = self.write()?;

        let message = input.into_message(
            Uuid::new_v4().to_string(),
            FIXTURE_SENDER.to_string(),
            Utc::now(),
        );
        data.messages.push(message.clone());

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MessageStatus, RecipientGroup, ServiceType};
    use chrono::NaiveDate;

    fn provider() -> FixtureProvider {
        FixtureProvider::new().unwrap()
    }

    fn new_member(center_id: &str) -> CreateMemberInput {
        CreateMemberInput {
            full_name: "Zainab Bello".to_string(),
            phone: "+2348031234567".to_string(),
            email: "zainab@example.com".to_string(),
            center_id: center_id.to_string(),
            service_unit: "Media".to_string(),
            gender: "Female".to_string(),
            marital_status: "Single".to_string(),
            dob: NaiveDate::from_ymd_opt(1999, 9, 9).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_created_member_is_visible_to_later_reads() {
        let provider = provider();
        let created = provider.create_member(new_member("3")).await.unwrap();

        assert_eq!(created.center_name, "Osogbo Center");
        assert!(Uuid::parse_str(&created.id).is_ok());

        let members = provider.fetch_members().await.unwrap();
        assert_eq!(members.len(), 21);
        assert!(members.iter().any(|m| m.id == created.id));
    }

    #[tokio::test]
    async fn test_unknown_center_resolves_to_placeholder_name() {
        let created = provider().create_member(new_member("99")).await.unwrap();
        assert_eq!(created.center_name, UNKNOWN_CENTER);
    }

    #[tokio::test]
    async fn test_clones_share_tables() {
        let provider = provider();
        let clone = provider.clone();

        clone
            .create_attendance(CreateAttendanceInput {
                date: NaiveDate::from_ymd_opt(2024, 2, 4).unwrap(),
                service_type: ServiceType::SundayService,
                center_id: "2".to_string(),
                adult_male: 1,
                adult_female: 2,
                child_male: 3,
                child_female: 4,
            })
            .await
            .unwrap();

        assert_eq!(provider.fetch_attendance().await.unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_sent_message_status_and_sender() {
        let message = provider()
            .send_message(SendMessageInput::new(RecipientGroup::All, "Hello"))
            .await
            .unwrap();
        assert_eq!(message.status, MessageStatus::Sent);
        assert_eq!(message.sender_id, FIXTURE_SENDER);
    }

    #[tokio::test]
    async fn test_empty_provider() {
        let provider = FixtureProvider::with_data(FixtureData::default());
        assert!(provider.fetch_members().await.unwrap().is_empty());
        assert_eq!(provider.backend_name(), "fixture");
    }
}
