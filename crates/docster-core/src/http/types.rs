//! Request/response bodies shared by the HTTP server and client.

use serde::{Deserialize, Serialize};

pub use crate::logging::LogEntry;

/// Liveness check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// The whole corpus rendered as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentResponse {
    pub content: String,
    pub file_count: usize,
    /// Time of the last crawl, or `N/A`.
    pub timestamp: String,
}

/// Query string of `/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub content: String,
    /// Number of files containing the keyword.
    pub match_count: usize,
    pub timestamp: String,
}

/// Result of a re-crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerunResponse {
    pub message: String,
    pub file_count: usize,
    pub timestamp: String,
}

/// Query string for `/logs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsQuery {
    /// Return only the newest `limit` entries.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub entries: Vec<LogEntry>,
    /// Entries buffered on the server, including any cut by `limit`.
    pub total: usize,
}

/// Shutdown acknowledgment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopResponse {
    pub acknowledged: bool,
    pub message: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
