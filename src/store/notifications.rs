use super::decode_children;
use crate::database::push_id;
use crate::database::{DatabaseError, DatabaseReference, FirebaseDatabase};
use crate::model::{Notification, Resource};
use crate::roles::Role;
use serde_json::{Map, Value};
use std::cmp::Reverse;
use tracing::debug;

/// One user's inbox at `notifications/{role}/{uid}`.
#[derive(Clone, Debug)]
pub struct NotificationBox {
    reference: DatabaseReference,
}

impl NotificationBox {
    pub fn new(db: &FirebaseDatabase, role: Role, uid: &str) -> Result<Self, DatabaseError> {
        let reference = db
            .reference(Resource::Notifications.path())?
            .child(role.as_str())?
            .child_key(uid)?;
        Ok(Self { reference })
    }

    pub fn reference(&self) -> &DatabaseReference {
        &self.reference
    }

    /// Notifications, newest first. Undated entries come last.
    pub async fn list(&self) -> Result<Vec<Notification>, DatabaseError> {
        let snapshot = self.reference.snapshot().await?;
        let mut notifications: Vec<Notification> = decode_children(&snapshot);
        notifications.sort_by_key(|n| Reverse(n.created_at));
        Ok(notifications)
    }

    pub async fn send(&self, notification: &Notification) -> Result<String, DatabaseError> {
        self.reference.push(notification).await
    }

    pub async fn mark_read(&self, id: &str) -> Result<(), DatabaseError> {
        let mut patch = Map::new();
        patch.insert("read".into(), Value::Bool(true));
        self.reference.child_key(id)?.update(&patch).await
    }

    /// Marks every unread notification as read with a single write and
    /// returns how many were changed.
    pub async fn mark_all_read(&self) -> Result<usize, DatabaseError> {
        let unread: Vec<String> = self
            .list()
            .await?
            .into_iter()
            .filter(|n| !n.is_read())
            .map(|n| n.id)
            .collect();
        if unread.is_empty() {
            return Ok(0);
        }

        let patch: Map<String, Value> = unread
            .iter()
            .map(|id| (format!("{}/read", id), Value::Bool(true)))
            .collect();
        self.reference.update(&patch).await?;
        debug!(path = %self.reference.path(), count = unread.len(), "marked notifications read");
        Ok(unread.len())
    }

    pub async fn unread_count(&self) -> Result<usize, DatabaseError> {
        Ok(self.list().await?.iter().filter(|n| !n.is_read()).count())
    }

    pub async fn remove(&self, id: &str) -> Result<(), DatabaseError> {
        self.reference.child_key(id)?.remove().await
    }
}

/// Delivers `notification` to every inbox in `uids` with one multi-path write
/// at the root. Returns the generated id for each recipient, in order.
pub async fn broadcast(
    db: &FirebaseDatabase,
    role: Role,
    uids: &[&str],
    notification: &Notification,
) -> Result<Vec<String>, DatabaseError> {
    if uids.is_empty() {
        return Ok(Vec::new());
    }

    let value = serde_json::to_value(notification)?;
    let mut patch = Map::new();
    let mut ids = Vec::with_capacity(uids.len());
    let role_ref = db
        .reference(Resource::Notifications.path())?
        .child(role.as_str())?;
    for uid in uids {
        let inbox = role_ref.child_key(uid)?;
        let id = push_id::generate();
        patch.insert(format!("{}/{}", inbox.path(), id), value.clone());
        ids.push(id);
    }

    db.root().update(&patch).await?;
    debug!(role = %role, recipients = ids.len(), "broadcast notification");
    Ok(ids)
}
