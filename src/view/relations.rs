use super::FleetSnapshot;
use crate::model::{Battery, Generator, Resource, Service, Shop, Task, User};
use std::collections::HashMap;

/// A reference to a record id that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingRef {
    pub resource: Resource,
    pub id: String,
    pub field: &'static str,
    pub target: String,
}

/// Id indexes over a `FleetSnapshot`.
///
/// Relationships are plain string ids on the records; this resolves them in
/// one pass instead of scanning the lists for every lookup.
pub struct Relations<'a> {
    snapshot: &'a FleetSnapshot,
    shops: HashMap<&'a str, &'a Shop>,
    generators: HashMap<&'a str, &'a Generator>,
    users: HashMap<&'a str, &'a User>,
    batteries_by_generator: HashMap<&'a str, Vec<&'a Battery>>,
    services_by_generator: HashMap<&'a str, Vec<&'a Service>>,
    tasks_by_technician: HashMap<&'a str, Vec<&'a Task>>,
}

impl<'a> Relations<'a> {
    pub fn new(snapshot: &'a FleetSnapshot) -> Self {
        let mut batteries_by_generator: HashMap<&str, Vec<&Battery>> = HashMap::new();
        for battery in &snapshot.batteries {
            if let Some(generator_id) = battery.generator_id.as_deref() {
                batteries_by_generator.entry(generator_id).or_default().push(battery);
            }
        }

        let mut services_by_generator: HashMap<&str, Vec<&Service>> = HashMap::new();
        for service in &snapshot.services {
            if let Some(generator_id) = service.generator_id.as_deref() {
                services_by_generator.entry(generator_id).or_default().push(service);
            }
        }

        let mut tasks_by_technician: HashMap<&str, Vec<&Task>> = HashMap::new();
        for task in &snapshot.tasks {
            if let Some(uid) = task.assigned_to.as_deref() {
                tasks_by_technician.entry(uid).or_default().push(task);
            }
        }

        Self {
            snapshot,
            shops: snapshot.shops.iter().map(|s| (s.id.as_str(), s)).collect(),
            generators: snapshot.generators.iter().map(|g| (g.id.as_str(), g)).collect(),
            users: snapshot.users.iter().map(|u| (u.id.as_str(), u)).collect(),
            batteries_by_generator,
            services_by_generator,
            tasks_by_technician,
        }
    }

    pub fn shop_of(&self, generator: &Generator) -> Option<&'a Shop> {
        generator
            .shop_id
            .as_deref()
            .and_then(|id| self.shops.get(id).copied())
    }

    pub fn generator_of_battery(&self, battery: &Battery) -> Option<&'a Generator> {
        battery
            .generator_id
            .as_deref()
            .and_then(|id| self.generators.get(id).copied())
    }

    pub fn generator_of_service(&self, service: &Service) -> Option<&'a Generator> {
        service
            .generator_id
            .as_deref()
            .and_then(|id| self.generators.get(id).copied())
    }

    pub fn technician_of(&self, task: &Task) -> Option<&'a User> {
        task.assigned_to
            .as_deref()
            .and_then(|id| self.users.get(id).copied())
    }

    pub fn batteries_of(&self, generator_id: &str) -> &[&'a Battery] {
        self.batteries_by_generator
            .get(generator_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn services_of(&self, generator_id: &str) -> &[&'a Service] {
        self.services_by_generator
            .get(generator_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn tasks_of(&self, technician_uid: &str) -> &[&'a Task] {
        self.tasks_by_technician
            .get(technician_uid)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn generators_at(&self, shop_id: &str) -> Vec<&'a Generator> {
        self.snapshot
            .generators
            .iter()
            .filter(|g| g.shop_id.as_deref() == Some(shop_id))
            .collect()
    }

    /// Every id reference whose target is missing from the snapshot.
    pub fn dangling(&self) -> Vec<DanglingRef> {
        let mut out = Vec::new();
        let mut check = |resource, id: &str, field, target: Option<&str>, exists: bool| {
            if let Some(target) = target {
                if !exists {
                    out.push(DanglingRef {
                        resource,
                        id: id.to_string(),
                        field,
                        target: target.to_string(),
                    });
                }
            }
        };

        for g in &self.snapshot.generators {
            let target = g.shop_id.as_deref();
            check(Resource::Generators, &g.id, "shopId", target, self.shop_of(g).is_some());
        }
        for b in &self.snapshot.batteries {
            let target = b.generator_id.as_deref();
            let exists = self.generator_of_battery(b).is_some();
            check(Resource::Batteries, &b.id, "generatorId", target, exists);
        }
        for s in &self.snapshot.services {
            let target = s.generator_id.as_deref();
            let exists = self.generator_of_service(s).is_some();
            check(Resource::Services, &s.id, "generatorId", target, exists);
        }
        for t in &self.snapshot.tasks {
            let target = t.assigned_to.as_deref();
            check(Resource::Tasks, &t.id, "assignedTo", target, self.technician_of(t).is_some());
        }
        out
    }
}
