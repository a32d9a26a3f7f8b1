//! Domain records of the admin dashboard and their write inputs

pub mod activity;
pub mod attendance;
pub mod center;
pub mod member;
pub mod message;

pub use activity::{ActivityLog, AuditAction};
pub use attendance::{AttendanceRecord, CreateAttendanceInput, ServiceType};
pub use center::Center;
pub use member::{CreateMemberInput, Member, UNKNOWN_CENTER};
pub use message::{
    AudienceFilters, Channel, Message, MessageStatus, Period, RecipientGroup, SendMessageInput,
};
