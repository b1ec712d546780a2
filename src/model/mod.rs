//! Records stored in the database.
//!
//! Each record type lives at a flat path (`generators/{id}`, `tasks/{id}`, ...)
//! and carries its database key in `id`. Records must be decoded with
//! [`decode_record`], which folds legacy field names onto the canonical ones
//! before deserializing.

macro_rules! impl_record {
    ($ty:ty, $resource:expr, $aliases:expr) => {
        impl $crate::model::Record for $ty {
            const RESOURCE: $crate::model::Resource = $resource;
            const ALIASES: &'static [(&'static str, &'static [&'static str])] = $aliases;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}
pub(crate) use impl_record;

pub mod de;

mod battery;
mod charger;
mod gatepass;
mod generator;
mod invoice;
mod notification;
mod service;
mod shop;
mod task;
mod user;

pub use battery::Battery;
pub use charger::Charger;
pub use gatepass::GatePass;
pub use generator::Generator;
pub use invoice::Invoice;
pub use notification::Notification;
pub use service::Service;
pub use shop::Shop;
pub use task::{Priority, Task};
pub use user::User;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// The top-level collections of the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Generators,
    Batteries,
    Chargers,
    GatePasses,
    Services,
    Tasks,
    Users,
    Shops,
    Invoices,
    Notifications,
}

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::Generators,
        Resource::Batteries,
        Resource::Chargers,
        Resource::GatePasses,
        Resource::Services,
        Resource::Tasks,
        Resource::Users,
        Resource::Shops,
        Resource::Invoices,
        Resource::Notifications,
    ];

    pub const fn path(&self) -> &'static str {
        match self {
            Resource::Generators => "generators",
            Resource::Batteries => "batteries",
            Resource::Chargers => "chargers",
            Resource::GatePasses => "gatepasses",
            Resource::Services => "services",
            Resource::Tasks => "tasks",
            Resource::Users => "users",
            Resource::Shops => "shops",
            Resource::Invoices => "invoices",
            Resource::Notifications => "notifications",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// A record type stored under one collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    const RESOURCE: Resource;

    /// Legacy field names, as `(canonical, &[aliases])`.
    const ALIASES: &'static [(&'static str, &'static [&'static str])] = &[];

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

/// Moves legacy field names onto their canonical names.
///
/// When both forms are present the canonical one wins and the aliases are dropped.
pub fn normalize_aliases(map: &mut serde_json::Map<String, Value>, aliases: &[(&str, &[&str])]) {
    for (canonical, names) in aliases {
        let mut filled = map.get(*canonical).is_some_and(|v| !v.is_null());
        for name in *names {
            if let Some(value) = map.remove(*name) {
                if !filled && !value.is_null() {
                    map.insert(canonical.to_string(), value);
                    filled = true;
                }
            }
        }
    }
}

/// Decodes the record stored under `key`. The key always wins over any stored `id`.
pub fn decode_record<T: Record>(key: &str, value: Value) -> Result<T, serde_json::Error> {
    let value = match value {
        Value::Object(mut map) => {
            normalize_aliases(&mut map, T::ALIASES);
            Value::Object(map)
        }
        other => other,
    };
    let mut record: T = serde_json::from_value(value)?;
    record.set_id(key.to_string());
    Ok(record)
}
