use super::FleetSnapshot;
use crate::status::{
    BatteryStatus, ChargerStatus, Classify, GatePassStatus, GeneratorStatus, InvoiceStatus,
    ServiceStatus, StatusPolicy, TaskStatus,
};
use crate::roles::Role;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of records per derived status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusCounts<S: Ord>(BTreeMap<S, usize>);

impl<S: Ord> Default for StatusCounts<S> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<S: Copy + Ord> StatusCounts<S> {
    pub fn tally<T>(items: &[T], policy: &StatusPolicy, today: NaiveDate) -> Self
    where
        T: Classify<Status = S>,
    {
        let mut counts = BTreeMap::new();
        for item in items {
            *counts.entry(item.status(policy, today)).or_insert(0) += 1;
        }
        Self(counts)
    }

    pub fn get(&self, status: S) -> usize {
        self.0.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (S, usize)> + '_ {
        self.0.iter().map(|(s, n)| (*s, *n))
    }
}

/// The figures shown on the overview page and sent to the summary endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub as_of: NaiveDate,
    pub generators: StatusCounts<GeneratorStatus>,
    pub batteries: StatusCounts<BatteryStatus>,
    pub chargers: StatusCounts<ChargerStatus>,
    pub gate_passes: StatusCounts<GatePassStatus>,
    pub services: StatusCounts<ServiceStatus>,
    pub tasks: StatusCounts<TaskStatus>,
    pub invoices: StatusCounts<InvoiceStatus>,
    /// Sum of unpaid and overdue invoice amounts.
    pub outstanding_amount: f64,
    pub active_technicians: usize,
    pub unread_notifications: usize,
}

impl DashboardStats {
    pub fn compute(snapshot: &FleetSnapshot, policy: &StatusPolicy, today: NaiveDate) -> Self {
        let outstanding_amount = snapshot
            .invoices
            .iter()
            .filter(|invoice| invoice.status(policy, today) != InvoiceStatus::Paid)
            .filter_map(|invoice| invoice.amount)
            .sum();

        let active_technicians = snapshot
            .users
            .iter()
            .filter(|user| user.role() == Some(Role::Technician) && user.is_active())
            .count();

        Self {
            as_of: today,
            generators: StatusCounts::tally(&snapshot.generators, policy, today),
            batteries: StatusCounts::tally(&snapshot.batteries, policy, today),
            chargers: StatusCounts::tally(&snapshot.chargers, policy, today),
            gate_passes: StatusCounts::tally(&snapshot.gate_passes, policy, today),
            services: StatusCounts::tally(&snapshot.services, policy, today),
            tasks: StatusCounts::tally(&snapshot.tasks, policy, today),
            invoices: StatusCounts::tally(&snapshot.invoices, policy, today),
            outstanding_amount,
            active_technicians,
            unread_notifications: 0,
        }
    }

    pub fn with_unread_notifications(mut self, unread: usize) -> Self {
        self.unread_notifications = unread;
        self
    }

    /// Records that need someone to act: faults, expiries and overdue work.
    pub fn needs_attention(&self) -> usize {
        self.generators.get(GeneratorStatus::Faulty)
            + self.generators.get(GeneratorStatus::ServiceOverdue)
            + self.batteries.get(BatteryStatus::Faulty)
            + self.batteries.get(BatteryStatus::Expired)
            + self.chargers.get(ChargerStatus::Faulty)
            + self.gate_passes.get(GatePassStatus::Expired)
            + self.services.get(ServiceStatus::Overdue)
            + self.tasks.get(TaskStatus::Overdue)
    }
}
