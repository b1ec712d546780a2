//! Local mirrors of listened locations.

use super::listen::{EventData, EventStream, StreamEvent};
use super::reference::split_path;
use super::DatabaseError;
use crate::model::{decode_record, Record};
use futures::stream::{self, Stream, StreamExt};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// The JSON tree below a listened location, kept current by applying stream events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveTree {
    root: Value,
}

impl LiveTree {
    pub fn new() -> Self {
        Self { root: Value::Null }
    }

    pub fn value(&self) -> &Value {
        &self.root
    }

    /// Applies a stream event. Returns `true` if the event carried data.
    pub fn apply(&mut self, event: &StreamEvent) -> Result<bool, DatabaseError> {
        match event {
            StreamEvent::Put(EventData { path, data }) => {
                let segments = split_path(path)?;
                set_at(&mut self.root, &segments, data.clone());
                Ok(true)
            }
            StreamEvent::Patch(EventData { path, data }) => {
                let base = split_path(path)?;
                let Value::Object(children) = data else {
                    return Err(DatabaseError::StreamError(format!(
                        "patch at '{}' is not an object",
                        path
                    )));
                };
                for (key, value) in children {
                    let mut segments = base.clone();
                    segments.extend(split_path(key)?);
                    set_at(&mut self.root, &segments, value.clone());
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Writes `value` at `segments`, creating objects on the way down. Writing
/// `null` deletes the location and prunes parents left empty.
fn set_at(node: &mut Value, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    index_array(node);

    if value.is_null() {
        if let Value::Object(map) = node {
            if let Some(child) = map.get_mut(first) {
                set_at(child, rest, Value::Null);
                if child.is_null() || child.as_object().is_some_and(Map::is_empty) {
                    map.remove(first);
                }
            }
            if map.is_empty() {
                *node = Value::Null;
            }
        }
        return;
    }

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(first.clone()).or_insert(Value::Null);
        set_at(child, rest, value);
    }
}

/// The server stores arrays as objects keyed by index and only renders them
/// as arrays when the keys are dense. Writing below one turns it back into
/// that object form.
fn index_array(node: &mut Value) {
    if let Value::Array(items) = node {
        let map = std::mem::take(items)
            .into_iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .map(|(i, item)| (i.to_string(), item))
            .collect();
        *node = Value::Object(map);
    }
}

/// A typed view over a `LiveTree` whose children are records of one kind.
#[derive(Debug, Clone)]
pub struct LiveCollection<T> {
    tree: LiveTree,
    _record: PhantomData<fn() -> T>,
}

impl<T> Default for LiveCollection<T> {
    fn default() -> Self {
        Self {
            tree: LiveTree::new(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> LiveCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &StreamEvent) -> Result<bool, DatabaseError> {
        self.tree.apply(event)
    }

    /// Decodes every child; children that do not decode are skipped.
    pub fn records(&self) -> BTreeMap<String, T> {
        let children: Vec<(String, &Value)> = match self.tree.value() {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            _ => return BTreeMap::new(),
        };
        children
            .into_iter()
            .filter_map(|(key, value)| match decode_record::<T>(&key, value.clone()) {
                Ok(record) => Some((key, record)),
                Err(e) => {
                    warn!(resource = T::RESOURCE.path(), %key, error = %e, "skipping malformed record");
                    None
                }
            })
            .collect()
    }

    /// Records in key order.
    pub fn to_vec(&self) -> Vec<T> {
        self.records().into_values().collect()
    }
}

/// Turns an event stream into a stream of record lists, one per data-bearing event.
///
/// `cancel` and `auth_revoked` events end the stream with an error; keep-alives are skipped.
pub fn watch<T: Record>(events: EventStream) -> impl Stream<Item = Result<Vec<T>, DatabaseError>> + Send {
    stream::unfold(
        Some((events, LiveCollection::<T>::new())),
        |state| async move {
            let (mut events, mut live) = state?;
            loop {
                let event = match events.next().await {
                    Some(Ok(event)) => event,
                    Some(Err(e)) => return Some((Err(e), None)),
                    None => return None,
                };
                match event {
                    StreamEvent::Put(_) | StreamEvent::Patch(_) => {
                        if let Err(e) = live.apply(&event) {
                            return Some((Err(e), None));
                        }
                        let records = live.to_vec();
                        debug!(resource = T::RESOURCE.path(), count = records.len(), "live update");
                        return Some((Ok(records), Some((events, live))));
                    }
                    StreamEvent::KeepAlive => continue,
                    StreamEvent::Cancel(reason) => {
                        let reason = reason.unwrap_or_else(|| "cancelled by server".into());
                        return Some((Err(DatabaseError::StreamError(reason)), None));
                    }
                    StreamEvent::AuthRevoked => {
                        return Some((
                            Err(DatabaseError::StreamError("auth revoked".into())),
                            None,
                        ));
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;
    use bytes::Bytes;
    use serde_json::json;

    fn put(path: &str, data: Value) -> StreamEvent {
        StreamEvent::Put(EventData {
            path: path.into(),
            data,
        })
    }

    fn patch(path: &str, data: Value) -> StreamEvent {
        StreamEvent::Patch(EventData {
            path: path.into(),
            data,
        })
    }

    #[test]
    fn test_put_and_patch() {
        let mut tree = LiveTree::new();
        tree.apply(&put("/", json!({"t1": {"title": "Oil"}}))).unwrap();
        tree.apply(&put("/t2", json!({"title": "Filter"}))).unwrap();
        tree.apply(&patch("/t1", json!({"status": "done", "meta/by": "u1"}))).unwrap();
        assert_eq!(
            tree.value(),
            &json!({
                "t1": {"title": "Oil", "status": "done", "meta": {"by": "u1"}},
                "t2": {"title": "Filter"}
            })
        );
    }

    #[test]
    fn test_null_put_prunes() {
        let mut tree = LiveTree::new();
        tree.apply(&put("/", json!({"a": {"b": {"c": 1}}, "d": 2}))).unwrap();
        tree.apply(&put("/a/b/c", Value::Null)).unwrap();
        assert_eq!(tree.value(), &json!({"d": 2}));
        tree.apply(&patch("/", json!({"d": null}))).unwrap();
        assert_eq!(tree.value(), &Value::Null);
        assert!(!tree.apply(&StreamEvent::KeepAlive).unwrap());
    }

    #[test]
    fn test_collection_skips_malformed() {
        let mut live = LiveCollection::<Task>::new();
        live.apply(&put(
            "/",
            json!({"t1": {"title": "Oil change"}, "t2": "not a record"}),
        ))
        .unwrap();
        let records = live.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records["t1"].id, "t1");
    }

    #[test]
    fn test_collection_from_array_root() {
        let mut live = LiveCollection::<Task>::new();
        live.apply(&put("/", json!([{"title": "Oil"}, null, {"title": "Belt"}])))
            .unwrap();
        let records = live.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records["0"].title.as_deref(), Some("Oil"));
        assert_eq!(records["2"].id, "2");

        live.apply(&patch("/2", json!({"status": "done"}))).unwrap();
        live.apply(&put("/3", json!({"title": "Filter"}))).unwrap();
        assert_eq!(
            live.tree.value(),
            &json!({
                "0": {"title": "Oil"},
                "2": {"title": "Belt", "status": "done"},
                "3": {"title": "Filter"}
            })
        );

        live.apply(&put("/0", Value::Null)).unwrap();
        let titles: Vec<_> = live.to_vec().into_iter().filter_map(|t| t.title).collect();
        assert_eq!(titles, ["Belt", "Filter"]);
    }

    #[tokio::test]
    async fn test_watch_yields_snapshots() {
        let body = concat!(
            "event: put\ndata: {\"path\":\"/\",\"data\":{\"t1\":{\"title\":\"Oil\"}}}\n\n",
            "event: keep-alive\ndata: null\n\n",
            "event: put\ndata: {\"path\":\"/t2\",\"data\":{\"title\":\"Belt\"}}\n\n",
            "event: cancel\ndata: \"Permission denied\"\n\n",
        );
        let chunks: Vec<Result<Bytes, reqwest::Error>> = vec![Ok(Bytes::from_static(body.as_bytes()))];
        let events = EventStream::new(Box::pin(stream::iter(chunks)));

        let updates: Vec<_> = watch::<Task>(events).collect().await;
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].as_ref().unwrap().len(), 1);
        let titles: Vec<_> = updates[1]
            .as_ref()
            .unwrap()
            .iter()
            .map(|t| t.title.clone().unwrap_or_default())
            .collect();
        assert_eq!(titles, vec!["Oil", "Belt"]);
        assert!(matches!(updates[2], Err(DatabaseError::StreamError(ref m)) if m == "Permission denied"));
    }
}
