use super::{de, impl_record, Resource, Timestamp};
use serde::{Deserialize, Serialize};

/// A maintenance visit planned or performed on a generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub generator_id: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub technician_id: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub next_service_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::timestamp", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "de::number", skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "de::text", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl_record!(
    Service,
    Resource::Services,
    &[
        ("generatorId", &["generator_id", "generator"]),
        ("technicianId", &["technician_id", "assignedTo", "technician"]),
        ("serviceType", &["service_type", "type"]),
        ("scheduledDate", &["serviceDate", "date", "scheduled_date"]),
        ("nextServiceDate", &["nextDueDate", "next_due_date", "dueDate"]),
        ("completedAt", &["completedDate", "completed_at"]),
    ]
);

impl Service {
    /// The date the service is due: the explicit next-service date, else the scheduled date.
    pub fn due_date(&self) -> Option<Timestamp> {
        self.next_service_date.or(self.scheduled_date)
    }
}
