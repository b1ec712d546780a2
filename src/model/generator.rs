use super::{de, impl_record, Resource, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generator {
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "de::number", skip_serializing_if = "Option::is_none")]
    pub capacity_kva: Option<f64>,
    /// Free-form status as typed by operators ("Running", "under repair", ...).
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "de::number", skip_serializing_if = "Option::is_none")]
    pub run_hours: Option<f64>,
    #[serde(default, deserialize_with = "de::number", skip_serializing_if = "Option::is_none")]
    pub fuel_level: Option<f64>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub last_service_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub next_service_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl_record!(
    Generator,
    Resource::Generators,
    &[
        ("serialNumber", &["serial_no", "serialNo", "serial_number"]),
        ("capacityKva", &["capacity", "kva", "capacity_kva"]),
        ("shopId", &["shop_id", "shop"]),
        ("runHours", &["runningHours", "hours", "run_hours"]),
        ("fuelLevel", &["fuel", "fuel_level"]),
        ("lastServiceDate", &["lastServiced", "last_service_date"]),
        ("nextServiceDate", &["nextDueDate", "next_due_date", "nextService"]),
        ("createdAt", &["created_at", "timestamp"]),
    ]
);

impl Generator {
    /// A label for lists: the name, else the serial number, else the key.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.serial_number.as_deref())
            .unwrap_or(&self.id)
    }
}
