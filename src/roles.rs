//! Roles and the pages each role's dashboard is composed of.

use crate::model::Resource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Inventory,
    Operator,
    Technician,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Inventory, Role::Operator, Role::Technician];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Inventory => "inventory",
            Role::Operator => "operator",
            Role::Technician => "technician",
        }
    }

    /// Parses a role name case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" | "administrator" => Some(Role::Admin),
            "inventory" => Some(Role::Inventory),
            "operator" => Some(Role::Operator),
            "technician" | "tech" => Some(Role::Technician),
            _ => None,
        }
    }

    /// The pages shown in this role's sidebar, in order.
    pub fn pages(&self) -> &'static [Page] {
        match self {
            Role::Admin => &[
                Page::Overview,
                Page::Generators,
                Page::Batteries,
                Page::Chargers,
                Page::GatePasses,
                Page::Services,
                Page::Tasks,
                Page::Invoices,
                Page::Users,
                Page::Notifications,
            ],
            Role::Inventory => &[
                Page::Overview,
                Page::Generators,
                Page::Batteries,
                Page::Chargers,
                Page::GatePasses,
                Page::Notifications,
            ],
            Role::Operator => &[
                Page::Overview,
                Page::Generators,
                Page::Services,
                Page::Tasks,
                Page::GatePasses,
                Page::Invoices,
                Page::Notifications,
            ],
            Role::Technician => &[Page::MyTasks, Page::Services, Page::Generators, Page::Notifications],
        }
    }

    pub fn can_access(&self, page: Page) -> bool {
        self.pages().contains(&page)
    }

    /// Whether this role may create, update or delete records of `resource`.
    ///
    /// Every role may write its own notification inbox.
    pub fn can_write(&self, resource: Resource) -> bool {
        use Resource::*;
        match self {
            Role::Admin => true,
            Role::Inventory => matches!(
                resource,
                Generators | Batteries | Chargers | GatePasses | Notifications
            ),
            Role::Operator => matches!(
                resource,
                Services | Tasks | GatePasses | Invoices | Notifications
            ),
            Role::Technician => matches!(resource, Tasks | Services | Notifications),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Overview,
    Generators,
    Batteries,
    Chargers,
    GatePasses,
    Services,
    Tasks,
    MyTasks,
    Invoices,
    Users,
    Notifications,
}
