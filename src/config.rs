//! Runtime configuration.
//!
//! Configuration can be assembled from `FLEET_OPS_*` environment variables or
//! loaded from a JSON file. Status thresholds default to [`StatusPolicy::default`].

use crate::status::StatusPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;
use yup_oauth2::ServiceAccountKey;

const ENV_DATABASE_URL: &str = "FLEET_OPS_DATABASE_URL";
const ENV_PROJECT_ID: &str = "FLEET_OPS_PROJECT_ID";
const ENV_SERVICE_ACCOUNT: &str = "FLEET_OPS_SERVICE_ACCOUNT";
const ENV_SUMMARY_ENDPOINT: &str = "FLEET_OPS_SUMMARY_ENDPOINT";
const ENV_DUE_SOON_DAYS: &str = "FLEET_OPS_DUE_SOON_DAYS";
const ENV_LOW_CHARGE: &str = "FLEET_OPS_LOW_CHARGE_PERCENT";
const ENV_WEAK_HEALTH: &str = "FLEET_OPS_WEAK_HEALTH_PERCENT";

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root URL of the Realtime Database, e.g. `https://my-app.firebaseio.com`.
    pub database_url: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub service_account_path: Option<PathBuf>,
    /// Base URL of the deployment that serves `POST /api/ai-summary`.
    #[serde(default)]
    pub summary_endpoint: Option<String>,
    #[serde(default)]
    pub policy: StatusPolicy,
}

impl Config {
    pub fn new(database_url: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: normalize_database_url(&database_url.into())?,
            project_id: None,
            service_account_path: None,
            summary_endpoint: None,
            policy: StatusPolicy::default(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&raw)?;
        config.database_url = normalize_database_url(&config.database_url)?;
        Ok(config)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(ENV_DATABASE_URL).ok_or(ConfigError::Missing(ENV_DATABASE_URL))?;
        let mut config = Self::new(database_url)?;

        config.project_id = lookup(ENV_PROJECT_ID);
        config.service_account_path = lookup(ENV_SERVICE_ACCOUNT).map(PathBuf::from);
        config.summary_endpoint = lookup(ENV_SUMMARY_ENDPOINT);

        if let Some(raw) = lookup(ENV_DUE_SOON_DAYS) {
            config.policy.due_soon_days = parse_number(ENV_DUE_SOON_DAYS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_LOW_CHARGE) {
            config.policy.low_charge_percent = parse_number(ENV_LOW_CHARGE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_WEAK_HEALTH) {
            config.policy.weak_health_percent = parse_number(ENV_WEAK_HEALTH, &raw)?;
        }

        Ok(config)
    }

    /// Reads the service account key named by `service_account_path`.
    pub async fn service_account_key(&self) -> Result<ServiceAccountKey, ConfigError> {
        let path = self
            .service_account_path
            .as_ref()
            .ok_or(ConfigError::Missing(ENV_SERVICE_ACCOUNT))?;
        Ok(yup_oauth2::read_service_account_key(path).await?)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn normalize_database_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ConfigError::Invalid {
        key: ENV_DATABASE_URL,
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            key: ENV_DATABASE_URL,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(trimmed.to_string())
}
