use super::{de, impl_record, Resource};
use serde::{Deserialize, Serialize};

/// A customer site generators are deployed to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl_record!(
    Shop,
    Resource::Shops,
    &[
        ("name", &["shopName"]),
        ("address", &["location"]),
        ("contactName", &["contact", "owner"]),
        ("phone", &["phoneNumber"]),
    ]
);
