//! Firebase Realtime Database module.
//!
//! This module talks to the Realtime Database REST API. Data is addressed by
//! slash-separated paths (`generators/gen-1/status`) through [`DatabaseReference`],
//! queried with [`Query`], and observed in real time through [`listen::EventStream`],
//! which parses the server-sent event stream the database emits for `Accept: text/event-stream`.
//!
//! # Real-time Updates
//!
//! [`sync::watch`] folds the `put`/`patch` events of a listened path into a
//! local mirror and yields a fresh typed list after every change. Dropping the
//! returned stream closes the HTTP connection.

pub mod listen;
pub mod push_id;
pub mod query;
pub mod reference;
pub mod snapshot;
pub mod sync;

#[cfg(test)]
mod tests;

pub use self::query::Query;
pub use self::reference::DatabaseReference;
pub use self::snapshot::DataSnapshot;

use crate::core::{build_client, middleware::AuthMiddleware};
use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;

/// Errors that can occur during Realtime Database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Wrapper for `reqwest_middleware::Error`.
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    /// Errors returned by the database, e.g. "Permission denied".
    #[error("API error: {0}")]
    ApiError(String),
    /// Wrapper for `serde_json::Error`.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    /// The path contains a key the database does not accept.
    #[error("Invalid path '{0}': keys may not contain '.', '#', '$', '[' or ']'")]
    InvalidPath(String),
    /// The value cannot be written with the requested operation.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// The realtime stream was closed by the server or is malformed.
    #[error("Stream error: {0}")]
    StreamError(String),
}

/// Client for interacting with a Firebase Realtime Database instance.
#[derive(Clone)]
pub struct FirebaseDatabase {
    client: ClientWithMiddleware,
    base_url: String,
}

impl FirebaseDatabase {
    /// Creates a new `FirebaseDatabase` instance for the database at `database_url`
    /// (e.g. `https://my-project-default-rtdb.firebaseio.com`).
    pub fn new(middleware: AuthMiddleware, database_url: &str) -> Self {
        Self {
            client: build_client(middleware),
            base_url: database_url.trim_end_matches('/').to_string(),
        }
    }

    /// Creates a new `FirebaseDatabase` instance with a custom client, e.g. one
    /// pointed at the database emulator or a mock server.
    pub fn new_with_client(client: ClientWithMiddleware, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A reference to the root of the database.
    pub fn root(&self) -> DatabaseReference {
        DatabaseReference::new(self.client.clone(), self.base_url.clone(), Vec::new())
    }

    /// Gets a `DatabaseReference` for the location at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The slash-separated path (e.g., "generators/gen-1").
    pub fn reference(&self, path: &str) -> Result<DatabaseReference, DatabaseError> {
        self.root().child(path)
    }
}
