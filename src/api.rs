//! Outbound HTTP boundary — the backend API trait and its reqwest client.
//!
//! DESIGN
//! ======
//! Handlers never touch reqwest directly; they call [`AuthApi`], which tests
//! replace with a mock. Each trait method maps to exactly one request against
//! the endpoint table. Transport failures and non-2xx HTTP statuses surface
//! as [`ApiError`]; envelope-code branching stays in the handlers.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::config::{ApiConfig, ApiPaths, ConfigError};
use crate::envelope::Envelope;
use crate::intent::{PasswordChange, ProfilePatch};

/// Errors produced at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// Configuration could not be read from the environment.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// The request failed below the protocol level.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered outside the 2xx range.
    #[error("response status {status}")]
    Status { status: u16, body: String },

    /// The response body was not a parseable envelope.
    #[error("response parse failed: {0}")]
    Parse(String),
}

// =============================================================================
// TRAIT
// =============================================================================

/// Backend operations used by the handlers. One HTTP call per method.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<Envelope, ApiError>;

    async fn activate(&self, token: &str) -> Result<Envelope, ApiError>;

    async fn fetch_login_user(&self) -> Result<Envelope, ApiError>;

    async fn check_name(
        &self,
        kind: &str,
        id: Option<u64>,
        name: &str,
        params: &HashMap<String, String>,
    ) -> Result<Envelope, ApiError>;

    async fn check_name_unique(
        &self,
        pathname: &str,
        query: &HashMap<String, String>,
    ) -> Result<Envelope, ApiError>;

    async fn update_profile(&self, id: u64, patch: &ProfilePatch) -> Result<Envelope, ApiError>;

    async fn change_password(&self, info: &PasswordChange) -> Result<Envelope, ApiError>;

    async fn projects_check_name(
        &self,
        project_id: u64,
        id: Option<u64>,
        name: &str,
        kind: &str,
    ) -> Result<Envelope, ApiError>;
}

// =============================================================================
// REQWEST CLIENT
// =============================================================================

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// [`AuthApi`] over reqwest against a configured endpoint table.
pub struct HttpApi {
    http: reqwest::Client,
    paths: ApiPaths,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, paths: config.paths.clone() })
    }

    /// Build the client from `AUTH_API_BASE_URL` and the timeout variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(&ApiConfig::from_env()?)
    }

    async fn get(&self, url: String, query: &[(String, String)]) -> Result<Envelope, ApiError> {
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        read_envelope(response).await
    }

    async fn post<B: Serialize + ?Sized>(&self, url: String, body: &B) -> Result<Envelope, ApiError> {
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        read_envelope(response).await
    }

    async fn post_empty(&self, url: String) -> Result<Envelope, ApiError> {
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        read_envelope(response).await
    }
}

async fn read_envelope(response: reqwest::Response) -> Result<Envelope, ApiError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    if !(200..300).contains(&status) {
        return Err(ApiError::Status { status, body: text });
    }

    serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[async_trait::async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, username: &str, password: &str) -> Result<Envelope, ApiError> {
        self.post(self.paths.login.clone(), &LoginBody { username, password })
            .await
    }

    async fn activate(&self, token: &str) -> Result<Envelope, ApiError> {
        self.post_empty(format!("{}/active/{token}", self.paths.signup))
            .await
    }

    async fn fetch_login_user(&self) -> Result<Envelope, ApiError> {
        self.get(format!("{}/token", self.paths.user), &[]).await
    }

    async fn check_name(
        &self,
        kind: &str,
        id: Option<u64>,
        name: &str,
        params: &HashMap<String, String>,
    ) -> Result<Envelope, ApiError> {
        let mut query: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(id) = id {
            query.push(("id".into(), id.to_string()));
        }
        query.push(("name".into(), name.to_owned()));

        self.get(format!("{}/{kind}", self.paths.check_name), &query)
            .await
    }

    async fn check_name_unique(
        &self,
        pathname: &str,
        query: &HashMap<String, String>,
    ) -> Result<Envelope, ApiError> {
        let query: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.get(format!("{}/{pathname}", self.paths.check_name_unique), &query)
            .await
    }

    async fn update_profile(&self, id: u64, patch: &ProfilePatch) -> Result<Envelope, ApiError> {
        self.post(format!("{}/{id}", self.paths.signup), patch).await
    }

    async fn change_password(&self, info: &PasswordChange) -> Result<Envelope, ApiError> {
        self.post(format!("{}/users", self.paths.changepwd), info).await
    }

    async fn projects_check_name(
        &self,
        project_id: u64,
        id: Option<u64>,
        name: &str,
        kind: &str,
    ) -> Result<Envelope, ApiError> {
        let mut query: Vec<(String, String)> = vec![("name".into(), name.to_owned())];
        if let Some(id) = id {
            query.push(("id".into(), id.to_string()));
        }
        query.push(("projectId".into(), project_id.to_string()));

        self.get(format!("{}/{kind}", self.paths.projects_check_name), &query)
            .await
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
