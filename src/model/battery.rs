use super::{de, impl_record, Resource, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battery {
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub generator_id: Option<String>,
    #[serde(default, deserialize_with = "de::number", skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    #[serde(default, deserialize_with = "de::number", skip_serializing_if = "Option::is_none")]
    pub capacity_ah: Option<f64>,
    /// State of health, 0-100.
    #[serde(default, deserialize_with = "de::number", skip_serializing_if = "Option::is_none")]
    pub health_percent: Option<f64>,
    /// State of charge, 0-100.
    #[serde(default, deserialize_with = "de::number", skip_serializing_if = "Option::is_none")]
    pub charge_level: Option<f64>,
    #[serde(default, deserialize_with = "de::flag", skip_serializing_if = "Option::is_none")]
    pub is_faulty: Option<bool>,
    #[serde(default, deserialize_with = "de::flag", skip_serializing_if = "Option::is_none")]
    pub is_charging: Option<bool>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub installed_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<Timestamp>,
}

impl_record!(
    Battery,
    Resource::Batteries,
    &[
        ("serialNumber", &["serial_no", "serialNo", "serial_number"]),
        ("generatorId", &["generator_id", "generator"]),
        ("capacityAh", &["capacity", "capacity_ah"]),
        ("healthPercent", &["health", "soh"]),
        ("chargeLevel", &["charge", "chargePercent", "soc"]),
        ("isFaulty", &["faulty", "fault"]),
        ("isCharging", &["charging"]),
        ("installedAt", &["installDate", "installationDate"]),
        ("expiryDate", &["warrantyExpiry", "expiry", "expiresAt"]),
        ("lastChecked", &["lastCheck", "last_checked"]),
    ]
);
