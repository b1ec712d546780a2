use super::reference::split_path;
use super::DatabaseError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A snapshot of the data at a database location.
///
/// The data can be extracted with `.val()`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSnapshot {
    key: Option<String>,
    value: Value,
}

impl DataSnapshot {
    pub fn new(key: Option<String>, value: Value) -> Self {
        Self { key, value }
    }

    /// The key of the location this snapshot was read from; `None` at the root.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns `true` if any data is stored at this location.
    pub fn exists(&self) -> bool {
        !self.value.is_null()
    }

    /// The raw JSON value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Decodes the data as a specific type.
    ///
    /// Returns `Ok(None)` if nothing is stored at this location.
    pub fn val<T: DeserializeOwned>(&self) -> Result<Option<T>, DatabaseError> {
        if self.value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(self.value.clone())?))
    }

    /// The snapshot of a descendant location. Missing locations yield an empty snapshot.
    pub fn child(&self, path: &str) -> Result<DataSnapshot, DatabaseError> {
        let segments = split_path(path)?;
        let mut current = &self.value;
        for segment in &segments {
            current = match current {
                Value::Object(map) => map.get(segment).unwrap_or(&Value::Null),
                _ => &Value::Null,
            };
        }
        let key = segments.last().cloned().or_else(|| self.key.clone());
        Ok(DataSnapshot::new(key, current.clone()))
    }

    /// The direct children, ordered by key.
    ///
    /// Arrays (which the database produces for objects with dense integer keys)
    /// are exposed with their indices as keys; `null` holes are skipped.
    pub fn children(&self) -> Vec<DataSnapshot> {
        match &self.value {
            Value::Object(map) => {
                let mut children: Vec<DataSnapshot> = map
                    .iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| DataSnapshot::new(Some(k.clone()), v.clone()))
                    .collect();
                children.sort_by(|a, b| a.key.cmp(&b.key));
                children
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| DataSnapshot::new(Some(i.to_string()), v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The number of direct children.
    pub fn num_children(&self) -> usize {
        self.children().len()
    }
}
