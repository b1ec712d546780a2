pub mod middleware;

use middleware::AuthMiddleware;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;

/// Error envelope returned by the Firebase HTTP APIs.
///
/// The Realtime Database answers with `{"error": "Permission denied"}`, while
/// Identity Toolkit uses the structured Google API form.
#[derive(Debug, Deserialize)]
pub struct FirebaseErrorResponse {
    pub error: FirebaseError,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FirebaseError {
    Message(String),
    Details(FirebaseErrorDetails),
}

#[derive(Debug, Deserialize)]
pub struct FirebaseErrorDetails {
    pub code: u16,
    pub message: String,
    pub status: Option<String>,
}

impl FirebaseErrorResponse {
    pub fn display_message(&self) -> String {
        match &self.error {
            FirebaseError::Message(message) => message.clone(),
            FirebaseError::Details(details) => {
                format!("{} (code: {})", details.message, details.code)
            }
        }
    }
}

pub async fn parse_error_response(response: reqwest::Response, default_msg: &str) -> String {
    let status = response.status();
    match response.json::<FirebaseErrorResponse>().await {
        Ok(error_resp) => format!("{}: {}", default_msg, error_resp.display_message()),
        Err(_) => format!("{}: {}", default_msg, status),
    }
}

/// Builds the shared HTTP client: transient retries first, then authentication.
pub fn build_client(middleware: AuthMiddleware) -> ClientWithMiddleware {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

    ClientBuilder::new(Client::new())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .with(middleware)
        .build()
}

/// Builds an HTTP client for unauthenticated endpoints.
pub fn build_plain_client() -> ClientWithMiddleware {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

    ClientBuilder::new(Client::new())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}
