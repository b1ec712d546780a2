//! Client for the dashboard's `POST /api/ai-summary` endpoint.
//!
//! The endpoint receives the overview figures and answers with a short
//! natural-language summary for the admin overview page.


use crate::core::build_plain_client;
use crate::view::DashboardStats;
use reqwest::header;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const SUMMARY_PATH: &str = "api/ai-summary";

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("HTTP Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("summary endpoint returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("summary endpoint returned an empty summary")]
    EmptySummary,
}

#[derive(Serialize)]
struct SummaryRequest<'a> {
    stats: &'a DashboardStats,
}

#[derive(Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct SummaryClient {
    client: ClientWithMiddleware,
    endpoint: String,
}

impl SummaryClient {
    /// `endpoint` is the base URL of the deployment serving the dashboard.
    pub fn new(endpoint: &str) -> Self {
        Self::new_with_client(build_plain_client(), endpoint.to_string())
    }

    pub fn new_with_client(client: ClientWithMiddleware, endpoint: String) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub async fn summarize(&self, stats: &DashboardStats) -> Result<String, SummaryError> {
        let url = format!("{}/{}", self.endpoint, SUMMARY_PATH);
        debug!(%url, "requesting summary");

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&SummaryRequest { stats })?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(SummaryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SummaryResponse = response.json().await?;
        match body.summary.map(|s| s.trim().to_string()) {
            Some(summary) if !summary.is_empty() => Ok(summary),
            _ => Err(SummaryError::EmptySummary),
        }
    }
}
