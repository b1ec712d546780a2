use super::{de, impl_record, Resource, Timestamp};
use crate::roles::Role;
use serde::{Deserialize, Serialize};

/// Profile stored at `users/{uid}` alongside the auth account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<String>,
    #[serde(default, deserialize_with = "de::flag", skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl_record!(
    User,
    Resource::Users,
    &[
        ("name", &["displayName", "fullName"]),
        ("phone", &["phoneNumber", "mobile"]),
        ("shopId", &["shop_id", "shop"]),
        ("active", &["isActive", "enabled"]),
        ("createdAt", &["created_at"]),
    ]
);

impl User {
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::parse)
    }

    /// Users without an explicit flag are active.
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}
