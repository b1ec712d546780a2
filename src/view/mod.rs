//! Read-side helpers: search and filtering, aggregate counts, and
//! resolution of the string-id relationships between records.

pub mod filter;
pub mod relations;
pub mod stats;

pub use filter::{search, sort_by_date, sort_by_text, Filter, Searchable};
pub use relations::{DanglingRef, Relations};
pub use stats::{DashboardStats, StatusCounts};

use crate::model::{Battery, Charger, GatePass, Generator, Invoice, Service, Shop, Task, User};

/// Every collection the dashboards read, loaded at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetSnapshot {
    pub generators: Vec<Generator>,
    pub batteries: Vec<Battery>,
    pub chargers: Vec<Charger>,
    pub gate_passes: Vec<GatePass>,
    pub services: Vec<Service>,
    pub tasks: Vec<Task>,
    pub users: Vec<User>,
    pub shops: Vec<Shop>,
    pub invoices: Vec<Invoice>,
}
