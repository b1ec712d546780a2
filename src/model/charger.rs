use super::{de, impl_record, Resource, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charger {
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de::flag", skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub battery_id: Option<String>,
    #[serde(default, deserialize_with = "de::number", skip_serializing_if = "Option::is_none")]
    pub output_watts: Option<f64>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<Timestamp>,
}

impl_record!(
    Charger,
    Resource::Chargers,
    &[
        ("serialNumber", &["serial_no", "serialNo", "serial_number"]),
        ("isOnline", &["online", "is_online"]),
        ("batteryId", &["battery_id", "assignedBattery", "battery"]),
        ("outputWatts", &["output", "watts"]),
        ("lastSeen", &["last_seen", "updatedAt"]),
    ]
);
