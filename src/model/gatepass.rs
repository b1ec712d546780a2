use super::{de, impl_record, Resource, Timestamp};
use serde::{Deserialize, Serialize};

/// Authorization for an asset to leave the premises.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatePass {
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub pass_number: Option<String>,
    /// Kind of asset leaving, e.g. "generator" or "battery".
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub issued_to: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de::flag", skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub returned_at: Option<Timestamp>,
}

impl_record!(
    GatePass,
    Resource::GatePasses,
    &[
        ("passNumber", &["passNo", "pass_number", "gatePassNo"]),
        ("assetType", &["asset_type", "type"]),
        ("assetId", &["asset_id", "generatorId", "batteryId"]),
        ("issuedTo", &["personName", "issued_to", "driverName"]),
        ("approved", &["isApproved"]),
        ("issuedAt", &["issueDate", "createdAt", "date"]),
        ("validUntil", &["expiryDate", "expectedReturn", "valid_until"]),
        ("returnedAt", &["returnedDate", "returnDate", "returned_at"]),
    ]
);
