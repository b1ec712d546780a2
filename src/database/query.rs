use super::listen::{listen_request, EventStream};
use super::reference::DatabaseReference;
use super::snapshot::DataSnapshot;
use super::DatabaseError;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// How the server orders children before applying range filters and limits.
#[derive(Clone, Debug, PartialEq)]
pub enum OrderBy {
    Child(String),
    Key,
    Value,
    Priority,
}

impl OrderBy {
    fn as_param(&self) -> String {
        // The REST API expects the ordering as a JSON string.
        match self {
            OrderBy::Child(path) => Value::String(path.clone()).to_string(),
            OrderBy::Key => "\"$key\"".to_string(),
            OrderBy::Value => "\"$value\"".to_string(),
            OrderBy::Priority => "\"$priority\"".to_string(),
        }
    }
}

/// A filtered, ordered read of the children of a location.
///
/// The database does not guarantee result ordering in the JSON it returns, so
/// callers that need a particular order must sort the decoded children.
#[derive(Clone, Debug)]
pub struct Query {
    reference: DatabaseReference,
    order_by: Option<OrderBy>,
    start_at: Option<Value>,
    end_at: Option<Value>,
    equal_to: Option<Value>,
    limit_to_first: Option<u32>,
    limit_to_last: Option<u32>,
}

impl Query {
    pub(crate) fn new(reference: DatabaseReference) -> Self {
        Self {
            reference,
            order_by: None,
            start_at: None,
            end_at: None,
            equal_to: None,
            limit_to_first: None,
            limit_to_last: None,
        }
    }

    /// Orders by the value of a child, e.g. `"status"` or `"meta/createdAt"`.
    pub fn order_by_child(mut self, path: &str) -> Self {
        self.order_by = Some(OrderBy::Child(path.to_string()));
        self
    }

    pub fn order_by_key(mut self) -> Self {
        self.order_by = Some(OrderBy::Key);
        self
    }

    pub fn order_by_value(mut self) -> Self {
        self.order_by = Some(OrderBy::Value);
        self
    }

    pub fn order_by_priority(mut self) -> Self {
        self.order_by = Some(OrderBy::Priority);
        self
    }

    pub fn equal_to<T: Serialize>(mut self, value: T) -> Result<Self, DatabaseError> {
        self.equal_to = Some(serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn start_at<T: Serialize>(mut self, value: T) -> Result<Self, DatabaseError> {
        self.start_at = Some(serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn end_at<T: Serialize>(mut self, value: T) -> Result<Self, DatabaseError> {
        self.end_at = Some(serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn limit_to_first(mut self, limit: u32) -> Self {
        self.limit_to_first = Some(limit);
        self
    }

    pub fn limit_to_last(mut self, limit: u32) -> Self {
        self.limit_to_last = Some(limit);
        self
    }

    /// Query-string parameters for the REST API.
    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        let has_filter = self.start_at.is_some()
            || self.end_at.is_some()
            || self.equal_to.is_some()
            || self.limit_to_first.is_some()
            || self.limit_to_last.is_some();

        // Filters are rejected by the server unless an ordering is given.
        match (&self.order_by, has_filter) {
            (Some(order), _) => params.push(("orderBy", order.as_param())),
            (None, true) => params.push(("orderBy", OrderBy::Key.as_param())),
            (None, false) => {}
        }

        if let Some(value) = &self.start_at {
            params.push(("startAt", value.to_string()));
        }
        if let Some(value) = &self.end_at {
            params.push(("endAt", value.to_string()));
        }
        if let Some(value) = &self.equal_to {
            params.push(("equalTo", value.to_string()));
        }
        if let Some(limit) = self.limit_to_first {
            params.push(("limitToFirst", limit.to_string()));
        }
        if let Some(limit) = self.limit_to_last {
            params.push(("limitToLast", limit.to_string()));
        }

        params
    }

    /// Executes the query and returns the matching children as a `DataSnapshot`.
    pub async fn get(&self) -> Result<DataSnapshot, DatabaseError> {
        let params = self.params();
        debug!(path = %self.reference.path(), ?params, "database query");

        let request = self.reference.client.get(self.reference.url()?).query(&params);
        let response = self.reference.send(request, "Query").await?;

        let value: Value = response.json().await?;
        Ok(DataSnapshot::new(
            self.reference.key().map(str::to_string),
            value,
        ))
    }

    /// Listens to changes to the query results.
    pub async fn listen(&self) -> Result<EventStream, DatabaseError> {
        listen_request(&self.reference.client, self.reference.url()?, &self.params()).await
    }
}
