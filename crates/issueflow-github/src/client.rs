//! Authenticated GitHub REST client.

use std::time::Duration;

use issueflow_core::{PipelineError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// Public GitHub API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const API_TIMEOUT_SECS: u64 = 30;

/// GitHub connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// API root, e.g. `https://api.github.com` or a GitHub Enterprise URL
    pub api_url: String,
    /// Personal access or installation token
    #[serde(skip_serializing)]
    pub token: String,
    pub user_agent: String,
}

impl GithubConfig {
    /// Config for the public API; see [`GithubConfig::with_api_url`].
    pub fn new(token: impl Into<String>) -> Self {
        GithubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            user_agent: format!("issueflow/{}", issueflow_core::VERSION),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// GitHub REST client implementing the issue tracker and change-request
/// writer collaborators.
#[derive(Debug, Clone)]
pub struct GithubClient {
    config: GithubConfig,
    http: reqwest::Client,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(PipelineError::Config("GitHub token is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .build()
            .map_err(|e| PipelineError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(GithubClient { config, http })
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", format!("Bearer {}", self.config.token))
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> std::result::Result<T, ApiError> {
        debug!(path = %path, "GET");
        let resp = self.request(reqwest::Method::GET, path).send().await?;
        decode(resp).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<T, ApiError> {
        debug!(path = %path, "POST");
        let resp = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> std::result::Result<T, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::from_body(status.as_u16(), &body))
}

/// `{"sha": ...}` payloads returned by the git data endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ShaRef {
    pub sha: String,
}
