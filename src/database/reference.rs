use super::listen::{listen_request, EventStream};
use super::push_id;
use super::query::Query;
use super::snapshot::DataSnapshot;
use super::DatabaseError;
use crate::core::parse_error_response;
use reqwest::header;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

const FORBIDDEN_KEY_CHARS: &[char] = &['.', '#', '$', '[', ']'];

#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

/// Splits a slash-separated path into validated keys, dropping empty segments.
pub(crate) fn split_path(path: &str) -> Result<Vec<String>, DatabaseError> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if segment.contains(FORBIDDEN_KEY_CHARS) || segment.chars().any(char::is_control) {
                Err(DatabaseError::InvalidPath(path.to_string()))
            } else {
                Ok(segment.to_string())
            }
        })
        .collect()
}

/// A reference to a location in the database.
///
/// References are cheap to clone; they share the underlying HTTP client.
#[derive(Clone)]
pub struct DatabaseReference {
    pub(crate) client: ClientWithMiddleware,
    pub(crate) base_url: String,
    pub(crate) segments: Vec<String>,
}

impl std::fmt::Debug for DatabaseReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseReference")
            .field("path", &self.path())
            .finish()
    }
}

impl DatabaseReference {
    pub(crate) fn new(client: ClientWithMiddleware, base_url: String, segments: Vec<String>) -> Self {
        Self {
            client,
            base_url,
            segments,
        }
    }

    /// The slash-separated path of this location; empty for the root.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// The last key of the path, or `None` for the root.
    pub fn key(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The parent location, or `None` for the root.
    pub fn parent(&self) -> Option<DatabaseReference> {
        if self.segments.is_empty() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self::new(self.client.clone(), self.base_url.clone(), segments))
    }

    /// Gets a reference for the location at the specified relative path.
    pub fn child(&self, path: &str) -> Result<DatabaseReference, DatabaseError> {
        let mut segments = self.segments.clone();
        segments.extend(split_path(path)?);
        Ok(Self::new(self.client.clone(), self.base_url.clone(), segments))
    }

    /// Gets a reference for the direct child `key`.
    ///
    /// Unlike [`child`](Self::child), `key` must be exactly one non-empty key,
    /// so a blank or slash-containing id can never address this location or
    /// one of its descendants.
    pub fn child_key(&self, key: &str) -> Result<DatabaseReference, DatabaseError> {
        if key.is_empty() || key.contains('/') {
            return Err(DatabaseError::InvalidPath(key.to_string()));
        }
        self.child(key)
    }

    /// The REST URL of this location (`{base}/{path}.json`).
    pub(crate) fn url(&self) -> Result<Url, DatabaseError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DatabaseError::ApiError(format!("Invalid database URL: {}", e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| DatabaseError::ApiError("Database URL cannot be a base".into()))?;
            path.pop_if_empty();
            match self.segments.split_last() {
                Some((last, rest)) => {
                    path.extend(rest);
                    path.push(&format!("{}.json", last));
                }
                None => {
                    path.push(".json");
                }
            }
        }
        Ok(url)
    }

    pub(crate) async fn send(&self, request: RequestBuilder, action: &str) -> Result<reqwest::Response, DatabaseError> {
        debug!(path = %self.path(), action, "database request");
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(DatabaseError::ApiError(
                parse_error_response(response, &format!("{} failed", action)).await,
            ));
        }

        Ok(response)
    }

    /// Reads the value at this location. Returns `Ok(None)` when nothing is stored there.
    pub async fn get<T: DeserializeOwned>(&self) -> Result<Option<T>, DatabaseError> {
        let snapshot = self.snapshot().await?;
        snapshot.val()
    }

    /// Reads this location into a `DataSnapshot`.
    pub async fn snapshot(&self) -> Result<DataSnapshot, DatabaseError> {
        let response = self.send(self.client.get(self.url()?), "Get").await?;
        let value: Value = response.json().await?;
        Ok(DataSnapshot::new(self.key().map(str::to_string), value))
    }

    /// Reads only the keys directly under this location (`shallow=true`).
    pub async fn shallow_keys(&self) -> Result<Vec<String>, DatabaseError> {
        let request = self.client.get(self.url()?).query(&[("shallow", "true")]);
        let response = self.send(request, "Shallow get").await?;
        let value: Value = response.json().await?;
        Ok(match value {
            Value::Object(map) => map.into_iter().map(|(k, _)| k).collect(),
            _ => Vec::new(),
        })
    }

    /// Overwrites the value at this location.
    pub async fn set<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), DatabaseError> {
        let request = self
            .client
            .put(self.url()?)
            .query(&[("print", "silent")])
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(value)?);
        self.send(request, "Set").await?;
        Ok(())
    }

    /// Writes the given children without touching siblings.
    ///
    /// Keys may be nested paths (`"gen-1/status"`), which makes this a
    /// multi-path update applied atomically by the server.
    pub async fn update<T: Serialize + ?Sized>(&self, patch: &T) -> Result<(), DatabaseError> {
        let value = serde_json::to_value(patch)?;
        let Value::Object(map) = value else {
            return Err(DatabaseError::InvalidValue(
                "updates must be JSON objects".into(),
            ));
        };
        for key in map.keys() {
            split_path(key)?;
        }

        let request = self
            .client
            .patch(self.url()?)
            .query(&[("print", "silent")])
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&map)?);
        self.send(request, "Update").await?;
        Ok(())
    }

    /// Appends a value under a server-generated key and returns that key.
    pub async fn push<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, DatabaseError> {
        let request = self
            .client
            .post(self.url()?)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(value)?);
        let response = self.send(request, "Push").await?;
        let pushed: PushResponse = response.json().await?;
        Ok(pushed.name)
    }

    /// A child reference under a locally generated push id, for fan-out writes.
    pub fn new_child(&self) -> DatabaseReference {
        let mut segments = self.segments.clone();
        segments.push(push_id::generate());
        Self::new(self.client.clone(), self.base_url.clone(), segments)
    }

    /// Deletes the value at this location and everything below it.
    pub async fn remove(&self) -> Result<(), DatabaseError> {
        let request = self.client.delete(self.url()?).query(&[("print", "silent")]);
        self.send(request, "Remove").await?;
        Ok(())
    }

    /// Starts building a query against this location.
    pub fn query(&self) -> Query {
        Query::new(self.clone())
    }

    /// Opens a realtime event stream for this location.
    pub async fn listen(&self) -> Result<EventStream, DatabaseError> {
        debug!(path = %self.path(), "opening event stream");
        listen_request(&self.client, self.url()?, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use reqwest_middleware::ClientBuilder;

    fn reference(path: &str) -> DatabaseReference {
        let root = DatabaseReference::new(
            ClientBuilder::new(Client::new()).build(),
            "https://demo.firebaseio.com".to_string(),
            Vec::new(),
        );
        root.child(path).unwrap()
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("/generators//gen-1/").unwrap(), vec!["generators", "gen-1"]);
        assert!(split_path("").unwrap().is_empty());
        assert!(matches!(split_path("users/a.b"), Err(DatabaseError::InvalidPath(_))));
        assert!(split_path("tasks/$id").is_err());
        assert!(split_path("tasks/[0]").is_err());
    }

    #[test]
    fn test_child_key_is_single_key() {
        let generators = reference("generators");
        assert_eq!(generators.child_key("gen-1").unwrap().path(), "generators/gen-1");
        for bad in ["", "/", "gen-1/status", "a.b"] {
            assert!(
                matches!(generators.child_key(bad), Err(DatabaseError::InvalidPath(_))),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn test_url_building() {
        assert_eq!(reference("").url().unwrap().as_str(), "https://demo.firebaseio.com/.json");
        assert_eq!(
            reference("generators/gen 1").url().unwrap().as_str(),
            "https://demo.firebaseio.com/generators/gen%201.json"
        );
    }

    #[test]
    fn test_navigation() {
        let r = reference("notifications/admin/uid-1");
        assert_eq!(r.key(), Some("uid-1"));
        assert_eq!(r.parent().unwrap().path(), "notifications/admin");
        assert_eq!(r.child("n1/read").unwrap().path(), "notifications/admin/uid-1/n1/read");
        assert!(reference("").parent().is_none());
        assert_eq!(r.new_child().parent().unwrap().path(), r.path());
    }
}
