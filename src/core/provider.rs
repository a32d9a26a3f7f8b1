//! The data provider capability
//!
//! One implementation talks to the hosted backend, the other serves the
//! in-memory fixture. Which one runs is decided once at startup; callers
//! only ever see `Arc<dyn DataProvider>`.

use crate::core::error::Result;
use crate::entities::{
    ActivityLog, AttendanceRecord, Center, CreateAttendanceInput, CreateMemberInput, Member,
    Message, SendMessageInput,
};
use async_trait::async_trait;

/// Read and write access to the dashboard's tables
///
/// Reads return the whole table; filtering, search, sort and paging run
/// client-side in the listing pipeline. Writes receive inputs that have
/// already passed validation.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Short name used in logs ("live", "fixture")
    fn backend_name(&self) -> &'static str;

    /// Every member, with `center_name` resolved
    async fn fetch_members(&self) -> Result<Vec<Member>>;

    /// Every center
    async fn fetch_centers(&self) -> Result<Vec<Center>>;

    /// Every attendance record, with `center_name` resolved
    async fn fetch_attendance(&self) -> Result<Vec<AttendanceRecord>>;

    /// The message history
    async fn fetch_messages(&self) -> Result<Vec<Message>>;

    /// The audit log
    async fn fetch_activity(&self) -> Result<Vec<ActivityLog>>;

    /// Register a member and return the stored row
    async fn create_member(&self, input: CreateMemberInput) -> Result<Member>;

    /// Log attendance and return the stored row
    async fn create_attendance(&self, input: CreateAttendanceInput) -> Result<AttendanceRecord>;

    /// Record a message and return the stored row
    async fn send_message(&self, input: SendMessageInput) -> Result<Message>;
}
