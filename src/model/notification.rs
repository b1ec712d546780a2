use super::{de, impl_record, Resource, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// An inbox entry stored at `notifications/{role}/{uid}/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Id of the record the notification is about, e.g. a task id.
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "de::flag", skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl_record!(
    Notification,
    Resource::Notifications,
    &[
        ("message", &["body", "text"]),
        ("kind", &["type", "category"]),
        ("read", &["isRead", "seen"]),
        ("createdAt", &["timestamp", "created_at", "date"]),
    ]
);

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            message: Some(message.into()),
            read: Some(false),
            created_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn is_read(&self) -> bool {
        self.read.unwrap_or(false)
    }
}
