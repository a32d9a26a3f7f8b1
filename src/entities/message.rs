//! Outgoing messages and their audiences

use crate::core::field::{FieldKind, FieldValue};
use crate::core::query::SortSpec;
use crate::core::record::{Record, RecordKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Whatsapp,
    Sms,
}

/// Who a message is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientGroup {
    #[default]
    All,
    Center,
    Unit,
    Birthday,
    NewMembers,
    Gender,
    Security,
    Custom,
}

impl RecipientGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientGroup::All => "all",
            RecipientGroup::Center => "center",
            RecipientGroup::Unit => "unit",
            RecipientGroup::Birthday => "birthday",
            RecipientGroup::NewMembers => "new_members",
            RecipientGroup::Gender => "gender",
            RecipientGroup::Security => "security",
            RecipientGroup::Custom => "custom",
        }
    }
}

/// Delivery lifecycle of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Sending,
    Sent,
    Failed,
    Scheduled,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Sending => "sending",
            MessageStatus::Sent => "sent",
            MessageStatus::Failed => "failed",
            MessageStatus::Scheduled => "scheduled",
        }
    }
}

/// Time window for birthday and new-member audiences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
}

/// Narrowing applied on top of a recipient group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudienceFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    /// Birthday month (1-12) recorded by older birthday campaigns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
}

impl AudienceFilters {
    pub fn center(center_id: impl Into<String>) -> Self {
        Self {
            center_id: Some(center_id.into()),
            ..Self::default()
        }
    }

    pub fn unit(service_unit: impl Into<String>) -> Self {
        Self {
            service_unit: Some(service_unit.into()),
            ..Self::default()
        }
    }

    pub fn gender(gender: impl Into<String>) -> Self {
        Self {
            gender: Some(gender.into()),
            ..Self::default()
        }
    }

    pub fn period(period: Period) -> Self {
        Self {
            period: Some(period),
            ..Self::default()
        }
    }
}

/// A message as stored in the history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub recipient_group: RecipientGroup,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recipient_filters: AudienceFilters,
    pub channels: Vec<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub content: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Record for Message {
    const KIND: RecordKind = RecordKind::Message;

    fn id(&self) -> &str {
        &self.id
    }

    fn filterable_fields() -> &'static [&'static str] {
        &["recipient_group", "status"]
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["subject", "content"]
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
            "recipient_group" => FieldValue::from(self.recipient_group.as_str()),
            "status" => FieldValue::from(self.status.as_str()),
            "subject" => self
                .subject
                .as_deref()
                .map(FieldValue::from)
                .unwrap_or(FieldValue::Null),
            "content" => FieldValue::from(self.content.as_str()),
            "created_at" => FieldValue::DateTime(self.created_at),
            _ => return None,
        };
        Some(value)
    }
}

/// Input for composing a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SendMessageInput {
    #[serde(default)]
    pub recipient_group: RecipientGroup,

    #[serde(default)]
    pub recipient_filters: AudienceFilters,

    #[validate(length(min = 1, message = "Please select at least one channel."))]
    pub channels: Vec<Channel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[validate(length(min = 1, message = "Please enter a message content."))]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl SendMessageInput {
    pub fn new(recipient_group: RecipientGroup, content: impl Into<String>) -> Self {
        Self {
            recipient_group,
            recipient_filters: AudienceFilters::default(),
            channels: vec![Channel::Email],
            subject: None,
            content: content.into(),
            scheduled_at: None,
        }
    }

    /// Canonical form sent to a provider
    ///
    /// Channels are de-duplicated keeping first occurrence. A subject only
    /// travels with the email channel, and a blank one is dropped.
    pub fn normalized(mut self) -> Self {
        let mut seen = Vec::with_capacity(self.channels.len());
        self.channels.retain(|channel| {
            if seen.contains(channel) {
                false
            } else {
                seen.push(*channel);
                true
            }
        });

        if !self.channels.contains(&Channel::Email) {
            self.subject = None;
        }
        self.subject = self.subject.filter(|s| !s.trim().is_empty());
        self
    }

    /// Status a freshly accepted message starts in
    pub fn initial_status(&self) -> MessageStatus {
        if self.scheduled_at.is_some() {
            MessageStatus::Scheduled
        } else {
            MessageStatus::Sent
        }
    }

    pub fn into_message(self, id: String, sender_id: String, created_at: DateTime<Utc>) -> Message {
        let status = self.initial_status();
        Message {
            id,
            sender_id,
            recipient_group: self.recipient_group,
            recipient_filters: self.recipient_filters,
            channels: self.channels,
            subject: self.subject,
            content: self.content,
            status,
            created_at,
            scheduled_at: self.scheduled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::validate_input;

    #[test]
    fn test_subject_requires_email_channel() {
        let input = SendMessageInput {
            channels: vec![Channel::Whatsapp, Channel::Sms],
            subject: Some("Reminder".to_string()),
            ..SendMessageInput::new(RecipientGroup::Unit, "Rehearsal at 4 PM")
        }
        .normalized();
        assert_eq!(input.subject, None);

        let input = SendMessageInput {
            subject: Some("Reminder".to_string()),
            ..SendMessageInput::new(RecipientGroup::All, "Service at 9")
        }
        .normalized();
        assert_eq!(input.subject.as_deref(), Some("Reminder"));
    }

    #[test]
    fn test_duplicate_channels_collapse() {
        let input = SendMessageInput {
            channels: vec![Channel::Sms, Channel::Email, Channel::Sms],
            ..SendMessageInput::new(RecipientGroup::All, "hi")
        }
        .normalized();
        assert_eq!(input.channels, vec![Channel::Sms, Channel::Email]);
    }

    #[test]
    fn test_empty_content_and_channels_fail_validation() {
        let input = SendMessageInput {
            channels: Vec::new(),
            ..SendMessageInput::new(RecipientGroup::All, "")
        };
        let err = validate_input(&input).unwrap_err();
        assert!(err.to_string().contains("channels"));
        assert!(err.to_string().contains("content"));
    }

    #[test]
    fn test_scheduled_messages_start_scheduled() {
        let mut input = SendMessageInput::new(RecipientGroup::All, "later");
        assert_eq!(input.initial_status(), MessageStatus::Sent);
        input.scheduled_at = Some(Utc::now());
        assert_eq!(input.initial_status(), MessageStatus::Scheduled);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_value(RecipientGroup::NewMembers).unwrap(),
            serde_json::json!("new_members")
        );
        assert_eq!(
            serde_json::to_value(Channel::Whatsapp).unwrap(),
            serde_json::json!("whatsapp")
        );
    }

    #[test]
    fn test_null_filters_decode_as_empty() {
        let message: Message = serde_json::from_value(serde_json::json!({
            "id": "9",
            "sender_id": "admin-1",
            "recipient_group": "all",
            "recipient_filters": null,
            "channels": ["sms"],
            "content": "hello",
            "status": "pending",
            "created_at": "2025-12-28T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(message.recipient_filters, AudienceFilters::default());
    }
}
