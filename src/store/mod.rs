//! Typed access to the collections of the database.
//!
//! A [`Collection`] wraps the reference of one top-level path and converts
//! between stored JSON and [`Record`] types. Writes are point writes; the last
//! writer wins.

pub mod notifications;
pub mod users;

#[cfg(test)]
mod tests;

pub use self::notifications::{broadcast, NotificationBox};
pub use self::users::{NewUser, UserProvisioner};

use crate::database::sync;
use crate::database::{DatabaseError, DatabaseReference, DataSnapshot, FirebaseDatabase};
use crate::model::{
    decode_record, Battery, Charger, GatePass, Generator, Invoice, Record, Service, Shop, Task,
    User,
};
use crate::roles::Role;
use crate::view::FleetSnapshot;
use futures::Stream;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::warn;

/// Decodes the children of a snapshot, skipping the ones that are not records.
pub(crate) fn decode_children<T: Record>(snapshot: &DataSnapshot) -> Vec<T> {
    snapshot
        .children()
        .into_iter()
        .filter_map(|child| {
            let key = child.key().unwrap_or_default().to_string();
            match decode_record::<T>(&key, child.into_value()) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(resource = T::RESOURCE.path(), %key, error = %e, "skipping malformed record");
                    None
                }
            }
        })
        .collect()
}

/// The records stored under one path.
pub struct Collection<T> {
    reference: DatabaseReference,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            reference: self.reference.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Collection<T> {
    pub fn new(reference: DatabaseReference) -> Self {
        Self {
            reference,
            _record: PhantomData,
        }
    }

    pub fn reference(&self) -> &DatabaseReference {
        &self.reference
    }

    /// All records in key order.
    pub async fn list(&self) -> Result<Vec<T>, DatabaseError> {
        let snapshot = self.reference.snapshot().await?;
        Ok(decode_children(&snapshot))
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>, DatabaseError> {
        let snapshot = self.reference.child_key(id)?.snapshot().await?;
        if !snapshot.exists() {
            return Ok(None);
        }
        Ok(Some(decode_record(id, snapshot.into_value())?))
    }

    /// Stores `record` under a new key and returns the key.
    pub async fn create(&self, record: &T) -> Result<String, DatabaseError> {
        self.reference.push(record).await
    }

    pub async fn set(&self, id: &str, record: &T) -> Result<(), DatabaseError> {
        self.reference.child_key(id)?.set(record).await
    }

    /// Merges the fields of `patch` into the record. `null` fields are deleted.
    pub async fn update<P: Serialize + ?Sized>(&self, id: &str, patch: &P) -> Result<(), DatabaseError> {
        self.reference.child_key(id)?.update(patch).await
    }

    pub async fn remove(&self, id: &str) -> Result<(), DatabaseError> {
        self.reference.child_key(id)?.remove().await
    }

    /// Records whose `child` equals `value`, filtered by the server.
    pub async fn find_by<V: Serialize>(&self, child: &str, value: V) -> Result<Vec<T>, DatabaseError> {
        let snapshot = self
            .reference
            .query()
            .order_by_child(child)
            .equal_to(value)?
            .get()
            .await?;
        Ok(decode_children(&snapshot))
    }

    /// A stream of the full record list, refreshed after every remote change.
    pub async fn watch(&self) -> Result<impl Stream<Item = Result<Vec<T>, DatabaseError>> + Send, DatabaseError> {
        let events = self.reference.listen().await?;
        Ok(sync::watch::<T>(events))
    }
}

/// Entry point to every collection of one database.
#[derive(Clone)]
pub struct Store {
    db: FirebaseDatabase,
}

impl Store {
    pub fn new(db: FirebaseDatabase) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &FirebaseDatabase {
        &self.db
    }

    /// The collection stored at `T::RESOURCE`.
    pub fn collection<T: Record>(&self) -> Collection<T> {
        let mut root = self.db.root();
        root.segments.push(T::RESOURCE.path().to_string());
        Collection::new(root)
    }

    pub fn generators(&self) -> Collection<Generator> {
        self.collection()
    }

    pub fn batteries(&self) -> Collection<Battery> {
        self.collection()
    }

    pub fn chargers(&self) -> Collection<Charger> {
        self.collection()
    }

    pub fn gate_passes(&self) -> Collection<GatePass> {
        self.collection()
    }

    pub fn services(&self) -> Collection<Service> {
        self.collection()
    }

    pub fn tasks(&self) -> Collection<Task> {
        self.collection()
    }

    pub fn users(&self) -> Collection<User> {
        self.collection()
    }

    pub fn shops(&self) -> Collection<Shop> {
        self.collection()
    }

    pub fn invoices(&self) -> Collection<Invoice> {
        self.collection()
    }

    /// The inbox at `notifications/{role}/{uid}`.
    pub fn notifications(&self, role: Role, uid: &str) -> Result<NotificationBox, DatabaseError> {
        NotificationBox::new(&self.db, role, uid)
    }

    /// Tasks assigned to one technician.
    ///
    /// Matched on decoded records so legacy assignee keys count too.
    pub async fn tasks_for(&self, uid: &str) -> Result<Vec<Task>, DatabaseError> {
        let mut tasks = self.tasks().list().await?;
        tasks.retain(|task| task.assigned_to.as_deref() == Some(uid));
        Ok(tasks)
    }

    /// Reads every collection concurrently.
    pub async fn load_fleet(&self) -> Result<FleetSnapshot, DatabaseError> {
        let (generators, batteries, chargers) = (self.generators(), self.batteries(), self.chargers());
        let (gate_passes, services, tasks) = (self.gate_passes(), self.services(), self.tasks());
        let (users, shops, invoices) = (self.users(), self.shops(), self.invoices());

        let (generators, batteries, chargers, gate_passes, services, tasks, users, shops, invoices) = tokio::try_join!(
            generators.list(),
            batteries.list(),
            chargers.list(),
            gate_passes.list(),
            services.list(),
            tasks.list(),
            users.list(),
            shops.list(),
            invoices.list(),
        )?;

        Ok(FleetSnapshot {
            generators,
            batteries,
            chargers,
            gate_passes,
            services,
            tasks,
            users,
            shops,
            invoices,
        })
    }
}
