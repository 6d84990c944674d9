//! HTTP client for a running Docster server.
//!
//! Typed wrappers over each route, used by the CLI's `status`, `rerun` and
//! `stop` commands.

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use docster_config::AppConfig;

use super::types::*;

/// Errors from the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("server is not running at {url}: {source}")]
    NotRunning { url: String, source: reqwest::Error },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
}

/// Client for one Docster server.
#[derive(Debug, Clone)]
pub struct DocsterClient {
    base_url: String,
    http: reqwest::Client,
}

impl DocsterClient {
    /// Client for the server at `base_url`, e.g. `http://127.0.0.1:3222`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Client for the server a config would start.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(format!("http://{}", config.bind_address()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%method, %url, "HTTP request");

        let resp = self
            .http
            .request(method, &url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ClientError::NotRunning {
                        url: self.base_url.clone(),
                        source: e,
                    }
                } else {
                    ClientError::Request(e)
                }
            })?;

        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&body)
                .map(|err| err.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| ClientError::Parse(format!("{path}: {e}")))
    }

    // ── Typed API methods ──────────────────────────────────────────────

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.request(Method::GET, "/health", &[]).await
    }

    /// Every crawled file, rendered.
    pub async fn all_content(&self) -> Result<ContentResponse, ClientError> {
        self.request(Method::GET, "/get_all", &[]).await
    }

    pub async fn search(&self, keyword: &str) -> Result<SearchResponse, ClientError> {
        self.request(Method::GET, "/search", &[("keyword", keyword)])
            .await
    }

    /// Ask the server to crawl again.
    pub async fn rerun(&self) -> Result<RerunResponse, ClientError> {
        self.request(Method::POST, "/rerun", &[]).await
    }

    /// The server's effective configuration.
    pub async fn config(&self) -> Result<AppConfig, ClientError> {
        self.request(Method::GET, "/get_config", &[]).await
    }

    /// Captured server logs; `limit` keeps only the newest entries.
    pub async fn logs(&self, limit: Option<usize>) -> Result<LogsResponse, ClientError> {
        match limit {
            Some(limit) => {
                let limit = limit.to_string();
                self.request(Method::GET, "/logs", &[("limit", limit.as_str())])
                    .await
            }
            None => self.request(Method::GET, "/logs", &[]).await,
        }
    }

    /// Request server shutdown.
    pub async fn stop(&self) -> Result<StopResponse, ClientError> {
        self.request(Method::POST, "/stop", &[]).await
    }
}
