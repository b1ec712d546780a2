//! Firebase Authentication admin module.
//!
//! Covers the account operations the dashboard needs: creating staff accounts,
//! looking them up, updating or deleting them, and assigning the `role` custom
//! claim that decides which dashboard a user is shown.

pub mod models;

#[cfg(test)]
mod tests;

use crate::auth::models::{
    CreateUserRequest, DeleteAccountRequest, GetAccountInfoRequest, GetAccountInfoResponse,
    UpdateUserRequest, UserRecord,
};
use crate::core::{build_client, middleware::AuthMiddleware, parse_error_response};
use reqwest::header;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

const IDENTITY_TOOLKIT_API: &str = "https://identitytoolkit.googleapis.com/v1/projects";

/// Serialized custom claims may not exceed this many bytes.
pub const MAX_CLAIMS_PAYLOAD: usize = 1000;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Custom claims payload is {0} bytes, the limit is 1000")]
    ClaimsTooLarge(usize),
    #[error("Claim '{0}' is reserved")]
    ReservedClaim(String),
}

/// Claims the token service sets itself.
const RESERVED_CLAIMS: &[&str] = &[
    "acr", "amr", "at_hash", "aud", "auth_time", "azp", "cnf", "c_hash", "exp", "firebase",
    "iat", "iss", "jti", "nbf", "nonce", "sub",
];

/// Client for the Identity Toolkit account endpoints.
#[derive(Clone)]
pub struct FirebaseAuth {
    client: ClientWithMiddleware,
    base_url: String,
}

impl FirebaseAuth {
    pub fn new(middleware: AuthMiddleware, project_id: &str) -> Self {
        Self {
            client: build_client(middleware),
            base_url: format!("{}/{}", IDENTITY_TOOLKIT_API, project_id),
        }
    }

    /// Creates a client against `base_url`, which already includes the project
    /// (`.../v1/projects/{project_id}`).
    pub fn new_with_client(client: ClientWithMiddleware, base_url: String) -> Self {
        Self { client, base_url }
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B, action: &str) -> Result<T, AuthError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(endpoint, action, "auth request");

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::ApiError(
                parse_error_response(response, &format!("{} failed", action)).await,
            ));
        }

        Ok(response.json().await?)
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<UserRecord, AuthError> {
        self.post("accounts", &request, "Create user").await
    }

    pub async fn update_user(&self, request: UpdateUserRequest) -> Result<UserRecord, AuthError> {
        self.post("accounts:update", &request, "Update user").await
    }

    pub async fn delete_user(&self, uid: &str) -> Result<(), AuthError> {
        let request = DeleteAccountRequest {
            local_id: uid.to_string(),
        };
        let _: Value = self.post("accounts:delete", &request, "Delete user").await?;
        Ok(())
    }

    async fn get_account_info(&self, request: GetAccountInfoRequest) -> Result<UserRecord, AuthError> {
        let result: GetAccountInfoResponse =
            self.post("accounts:lookup", &request, "Get user").await?;

        result
            .users
            .and_then(|mut users| users.pop())
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn get_user(&self, uid: &str) -> Result<UserRecord, AuthError> {
        let request = GetAccountInfoRequest {
            local_id: Some(vec![uid.to_string()]),
            email: None,
        };
        self.get_account_info(request).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, AuthError> {
        let request = GetAccountInfoRequest {
            local_id: None,
            email: Some(vec![email.to_string()]),
        };
        self.get_account_info(request).await
    }

    /// Replaces the user's custom claims. An empty map clears them.
    pub async fn set_custom_user_claims(
        &self,
        uid: &str,
        claims: &Map<String, Value>,
    ) -> Result<(), AuthError> {
        if let Some(reserved) = claims.keys().find(|k| RESERVED_CLAIMS.contains(&k.as_str())) {
            return Err(AuthError::ReservedClaim(reserved.clone()));
        }
        let payload = serde_json::to_string(claims)?;
        if payload.len() > MAX_CLAIMS_PAYLOAD {
            return Err(AuthError::ClaimsTooLarge(payload.len()));
        }

        let request = UpdateUserRequest {
            local_id: uid.to_string(),
            custom_attributes: Some(payload),
            ..Default::default()
        };
        self.update_user(request).await?;
        Ok(())
    }
}
