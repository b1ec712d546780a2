//! Status derivation.
//!
//! Every status shown on the dashboard is computed here from the raw record:
//! free-form status strings, boolean flags and dates. The functions are pure;
//! the current date is always passed in.

use crate::model::{Battery, Charger, GatePass, Generator, Invoice, Service, Task, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Thresholds used by the derivations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusPolicy {
    /// Services due within this many days are "due soon".
    pub due_soon_days: i64,
    /// Batteries below this state of charge are "low".
    pub low_charge_percent: f64,
    /// Batteries below this state of health are "weak".
    pub weak_health_percent: f64,
    /// Batteries expiring within this many days are "expiring soon".
    pub expiry_warning_days: i64,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            due_soon_days: 7,
            low_charge_percent: 20.0,
            weak_health_percent: 50.0,
            expiry_warning_days: 30,
        }
    }
}

/// A record with a derived status.
pub trait Classify {
    type Status: Copy + Debug + Eq + Ord + Hash + Serialize;

    fn status(&self, policy: &StatusPolicy, today: NaiveDate) -> Self::Status;
}

macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Human-readable label.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

status_enum!(GeneratorStatus {
    Running => "Running",
    Idle => "Idle",
    Maintenance => "Maintenance",
    ServiceOverdue => "Service Overdue",
    Faulty => "Faulty",
    Unknown => "Unknown",
});

status_enum!(BatteryStatus {
    Healthy => "Healthy",
    Charging => "Charging",
    Low => "Low",
    Weak => "Weak",
    ExpiringSoon => "Expiring Soon",
    Expired => "Expired",
    Faulty => "Faulty",
});

status_enum!(ChargerStatus {
    Available => "Available",
    InUse => "In Use",
    Offline => "Offline",
    Faulty => "Faulty",
});

status_enum!(GatePassStatus {
    Pending => "Pending",
    Active => "Active",
    Returned => "Returned",
    Expired => "Expired",
    Rejected => "Rejected",
});

status_enum!(ServiceStatus {
    Scheduled => "Scheduled",
    DueSoon => "Due Soon",
    Overdue => "Overdue",
    Completed => "Completed",
    Cancelled => "Cancelled",
});

status_enum!(TaskStatus {
    Pending => "Pending",
    InProgress => "In Progress",
    Overdue => "Overdue",
    Completed => "Completed",
    Cancelled => "Cancelled",
});

status_enum!(InvoiceStatus {
    Unpaid => "Unpaid",
    Overdue => "Overdue",
    Paid => "Paid",
});

/// Whole days from `today` until `date`; negative when the date has passed.
pub fn days_until(date: Timestamp, today: NaiveDate) -> i64 {
    (date.date_naive() - today).num_days()
}

fn is_past(date: Option<Timestamp>, today: NaiveDate) -> bool {
    date.is_some_and(|d| days_until(d, today) < 0)
}

fn within_days(date: Option<Timestamp>, today: NaiveDate, days: i64) -> bool {
    date.is_some_and(|d| (0..=days).contains(&days_until(d, today)))
}

/// Lowercased words of a free-form status string.
fn words(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Words that negate a status word when they appear just before it.
const NEGATIONS: &[&str] = &["not", "no", "never", "isn", "hasn", "wasn"];

/// Whether one of the two words before `index` negates the word at `index`.
fn negated(words: &[String], index: usize) -> bool {
    words[index.saturating_sub(2)..index]
        .iter()
        .any(|w| NEGATIONS.contains(&w.as_str()))
}

/// Whole-word (or whole-phrase) match that ignores negated occurrences, so
/// "not paid" does not mention "paid".
fn mentions(raw: Option<&str>, needles: &[&str]) -> bool {
    let words = words(raw);
    needles.iter().any(|needle| {
        let parts: Vec<&str> = needle.split(' ').collect();
        if parts.len() > words.len() {
            return false;
        }
        (0..=words.len() - parts.len()).any(|i| {
            words[i..i + parts.len()]
                .iter()
                .zip(&parts)
                .all(|(word, part)| word == part)
                && !negated(&words, i)
        })
    })
}

/// Classifies a generator's free-form status string.
///
/// Fault words win over everything else, so "running with fault" is `Faulty`.
pub fn classify_generator(raw: Option<&str>) -> GeneratorStatus {
    if mentions(raw, &["fault", "faulty", "error", "down", "broken", "failed"]) {
        GeneratorStatus::Faulty
    } else if mentions(
        raw,
        &["maintenance", "repair", "repairing", "servicing", "workshop"],
    ) {
        GeneratorStatus::Maintenance
    } else if mentions(raw, &["idle", "standby", "stand by", "off", "available", "stopped", "inactive"]) {
        GeneratorStatus::Idle
    } else if mentions(raw, &["running", "active", "on", "operational", "deployed", "online"]) {
        GeneratorStatus::Running
    } else {
        GeneratorStatus::Unknown
    }
}

impl Classify for Generator {
    type Status = GeneratorStatus;

    fn status(&self, _policy: &StatusPolicy, today: NaiveDate) -> GeneratorStatus {
        let status = classify_generator(self.status.as_deref());
        match status {
            GeneratorStatus::Faulty | GeneratorStatus::Maintenance => status,
            _ if is_past(self.next_service_date, today) => GeneratorStatus::ServiceOverdue,
            _ => status,
        }
    }
}

impl Classify for Battery {
    type Status = BatteryStatus;

    fn status(&self, policy: &StatusPolicy, today: NaiveDate) -> BatteryStatus {
        if self.is_faulty.unwrap_or(false) {
            BatteryStatus::Faulty
        } else if is_past(self.expiry_date, today) {
            BatteryStatus::Expired
        } else if self.is_charging.unwrap_or(false) {
            BatteryStatus::Charging
        } else if self.charge_level.is_some_and(|c| c < policy.low_charge_percent) {
            BatteryStatus::Low
        } else if self.health_percent.is_some_and(|h| h < policy.weak_health_percent) {
            BatteryStatus::Weak
        } else if within_days(self.expiry_date, today, policy.expiry_warning_days) {
            BatteryStatus::ExpiringSoon
        } else {
            BatteryStatus::Healthy
        }
    }
}

impl Classify for Charger {
    type Status = ChargerStatus;

    fn status(&self, _policy: &StatusPolicy, _today: NaiveDate) -> ChargerStatus {
        let raw = self.status.as_deref();
        if self.is_online == Some(false) || mentions(raw, &["offline", "disconnected"]) {
            ChargerStatus::Offline
        } else if mentions(raw, &["fault", "faulty", "error", "broken", "damaged"]) {
            ChargerStatus::Faulty
        } else if self.battery_id.is_some() || mentions(raw, &["charging", "in use", "busy"]) {
            ChargerStatus::InUse
        } else {
            ChargerStatus::Available
        }
    }
}

impl Classify for GatePass {
    type Status = GatePassStatus;

    fn status(&self, _policy: &StatusPolicy, today: NaiveDate) -> GatePassStatus {
        let raw = self.status.as_deref();
        if self.returned_at.is_some() || mentions(raw, &["returned", "closed"]) {
            GatePassStatus::Returned
        } else if mentions(raw, &["rejected", "denied", "declined"]) {
            GatePassStatus::Rejected
        } else if !(self.approved.unwrap_or(false) || mentions(raw, &["approved", "active"])) {
            GatePassStatus::Pending
        } else if is_past(self.valid_until, today) {
            GatePassStatus::Expired
        } else {
            GatePassStatus::Active
        }
    }
}

impl Classify for Service {
    type Status = ServiceStatus;

    fn status(&self, policy: &StatusPolicy, today: NaiveDate) -> ServiceStatus {
        let raw = self.status.as_deref();
        if self.completed_at.is_some() || mentions(raw, &["completed", "complete", "done"]) {
            ServiceStatus::Completed
        } else if mentions(raw, &["cancelled", "canceled"]) {
            ServiceStatus::Cancelled
        } else if is_past(self.due_date(), today) {
            ServiceStatus::Overdue
        } else if within_days(self.due_date(), today, policy.due_soon_days) {
            ServiceStatus::DueSoon
        } else {
            ServiceStatus::Scheduled
        }
    }
}

impl Classify for Task {
    type Status = TaskStatus;

    fn status(&self, _policy: &StatusPolicy, today: NaiveDate) -> TaskStatus {
        let raw = self.status.as_deref();
        if self.completed_at.is_some() || mentions(raw, &["completed", "complete", "done", "resolved"]) {
            TaskStatus::Completed
        } else if mentions(raw, &["cancelled", "canceled"]) {
            TaskStatus::Cancelled
        } else if is_past(self.due_date, today) {
            TaskStatus::Overdue
        } else if mentions(raw, &["in progress", "progress", "started", "ongoing", "working"]) {
            TaskStatus::InProgress
        } else {
            TaskStatus::Pending
        }
    }
}

impl Classify for Invoice {
    type Status = InvoiceStatus;

    fn status(&self, _policy: &StatusPolicy, today: NaiveDate) -> InvoiceStatus {
        if self.paid.unwrap_or(false) || self.paid_at.is_some() || mentions(self.status.as_deref(), &["paid"]) {
            InvoiceStatus::Paid
        } else if is_past(self.due_date, today) {
            InvoiceStatus::Overdue
        } else {
            InvoiceStatus::Unpaid
        }
    }
}
