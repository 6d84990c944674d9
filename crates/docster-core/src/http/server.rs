//! HTTP server: axum router over a TCP listener.
//!
//! Serves the crawled corpus, keyword search, re-crawls, the effective
//! configuration and captured logs. Searches and re-crawls run on the
//! blocking pool so they never stall the async workers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info};

use docster_config::AppConfig;

use super::types::*;
use crate::corpus::CorpusStore;
use crate::crawl::Crawler;
use crate::daemon::ShutdownSignal;
use crate::logging::LogReader;
use crate::search;

/// Shared state accessible to all route handlers.
pub struct AppState {
    pub config: AppConfig,
    pub crawler: Crawler,
    pub corpus: Arc<CorpusStore>,
    pub logs: LogReader,
    pub shutdown_tx: broadcast::Sender<ShutdownSignal>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Build the axum router with all routes.
pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/health", get(handle_health))
        .route("/get_all", get(handle_get_all))
        .route("/search", get(handle_search))
        .route("/rerun", post(handle_rerun))
        .route("/get_config", get(handle_get_config))
        .route("/logs", get(handle_logs))
        .route("/stop", post(handle_stop))
        .with_state(state)
}

/// Serve on an already-bound listener until the shutdown signal is received.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    mut shutdown_rx: broadcast::Receiver<ShutdownSignal>,
) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "HTTP server listening");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("HTTP server shutting down");
        })
        .await
}

// ── Route handlers ──────────────────────────────────────────────────────

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn handle_get_all(State(state): State<Arc<AppState>>) -> Json<ContentResponse> {
    let corpus = state.corpus.snapshot();
    Json(ContentResponse {
        content: search::format_all(&corpus.files),
        file_count: corpus.file_count(),
        timestamp: corpus.timestamp_or_na().to_string(),
    })
}

async fn handle_search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Some(keyword) = query.keyword.filter(|k| !k.is_empty()) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing search keyword"));
    };

    let corpus = state.corpus.snapshot();
    let searched = Arc::clone(&corpus);
    let task =
        tokio::task::spawn_blocking(move || search::search_corpus(&searched.files, &keyword));
    let outcome = task
        .await
        .map_err(|e| e.to_string())
        .and_then(|result| result.map_err(|e| e.to_string()))
        .map_err(|e| {
            error!(error = %e, "Search failed");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An internal error occurred during search: {e}"),
            )
        })?;

    Ok(Json(SearchResponse {
        content: outcome.render(),
        match_count: outcome.match_count(),
        timestamp: corpus.timestamp_or_na().to_string(),
    }))
}

async fn handle_rerun(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RerunResponse>, ApiError> {
    info!("Re-crawl requested");
    let worker = Arc::clone(&state);
    let corpus = tokio::task::spawn_blocking(move || worker.corpus.refresh(&worker.crawler))
        .await
        .map_err(|e| e.to_string())
        .and_then(|result| result.map_err(|e| e.to_string()))
        .map_err(|e| {
            error!(error = %e, "Re-crawl failed");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An internal error occurred during crawl: {e}"),
            )
        })?;

    let timestamp = corpus.timestamp_or_na().to_string();
    Ok(Json(RerunResponse {
        message: format!(
            "Crawl complete. {} files processed. Updated: {timestamp}",
            corpus.file_count()
        ),
        file_count: corpus.file_count(),
        timestamp,
    }))
}

async fn handle_get_config(State(state): State<Arc<AppState>>) -> Json<AppConfig> {
    Json(state.config.clone())
}

async fn handle_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> Json<LogsResponse> {
    let total = state.logs.count();
    let entries = match query.limit {
        Some(limit) => state.logs.tail(limit),
        None => state.logs.entries(),
    };
    Json(LogsResponse { entries, total })
}

async fn handle_stop(State(state): State<Arc<AppState>>) -> Json<StopResponse> {
    info!("Stop requested via HTTP");
    let _ = state.shutdown_tx.send(ShutdownSignal);
    Json(StopResponse {
        acknowledged: true,
        message: "Shutdown initiated".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::crawl::{CrawlStats, FileRecord, RecordKind};
    use crate::logging::LogCollector;
    use axum::body::Body;
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn record(path: &str, content: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            file_type: "ts".to_string(),
            content: content.to_string(),
            kind: RecordKind::Text,
        }
    }

    fn test_state(corpus: Corpus) -> Arc<AppState> {
        test_state_with_logs(corpus, LogCollector::new(10).reader())
    }

    fn test_state_with_logs(corpus: Corpus, logs: LogReader) -> Arc<AppState> {
        let config = AppConfig::default();
        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);
        Arc::new(AppState {
            crawler: Crawler::new(std::env::temp_dir().join("docster-missing-root"), &config),
            config,
            corpus: Arc::new(CorpusStore::with_corpus(corpus)),
            logs,
            shutdown_tx,
        })
    }

    fn sample_corpus() -> Corpus {
        Corpus {
            files: vec![
                record("src/a.ts", "export function greet() {\n  return 'hi';\n}\n"),
                record("src/b.ts", "greet();\n"),
            ],
            timestamp: Some("2024-05-01 12:00:00".to_string()),
            stats: CrawlStats::default(),
        }
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = router(test_state(Corpus::default()));
        let req = Request::get("/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let health: HealthResponse = body_json(resp).await;
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_get_all_before_first_crawl() {
        let app = router(test_state(Corpus::default()));
        let req = Request::get("/get_all").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let all: ContentResponse = body_json(resp).await;
        assert_eq!(all.file_count, 0);
        assert_eq!(all.content, "");
        assert_eq!(all.timestamp, "N/A");
    }

    #[tokio::test]
    async fn test_get_all_endpoint() {
        let app = router(test_state(sample_corpus()));
        let req = Request::get("/get_all").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();

        let all: ContentResponse = body_json(resp).await;
        assert_eq!(all.file_count, 2);
        assert_eq!(all.timestamp, "2024-05-01 12:00:00");
        assert!(all.content.starts_with("// src/a.ts\n```ts\n"));
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let app = router(test_state(sample_corpus()));
        let req = Request::get("/search?keyword=greet")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let found: SearchResponse = body_json(resp).await;
        assert_eq!(found.match_count, 2);
        assert!(found.content.contains("// src/a.ts (Code block for 'greet')"));
        assert!(
            found
                .content
                .contains("// src/b.ts (Keyword 'greet' found - full file shown)")
        );
    }

    #[tokio::test]
    async fn test_search_without_keyword_is_bad_request() {
        for uri in ["/search", "/search?keyword="] {
            let app = router(test_state(sample_corpus()));
            let req = Request::get(uri).body(Body::empty()).unwrap();
            let resp = app.oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let err: ErrorResponse = body_json(resp).await;
            assert_eq!(err.error, "Missing search keyword");
        }
    }

    #[tokio::test]
    async fn test_rerun_failure_is_internal_error() {
        let state = test_state(sample_corpus());
        let app = router(Arc::clone(&state));
        let req = Request::post("/rerun").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: ErrorResponse = body_json(resp).await;
        assert!(err.error.starts_with("An internal error occurred during crawl"));
        // The previous corpus is still served.
        assert_eq!(state.corpus.snapshot().file_count(), 2);
    }

    #[tokio::test]
    async fn test_rerun_endpoint() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("one.ts"), "const one = 1;").unwrap();

        let config = AppConfig::default();
        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);
        let state = Arc::new(AppState {
            crawler: Crawler::new(tmp.path(), &config),
            config,
            corpus: Arc::new(CorpusStore::new()),
            logs: LogCollector::new(10).reader(),
            shutdown_tx,
        });

        let app = router(Arc::clone(&state));
        let req = Request::post("/rerun").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let rerun: RerunResponse = body_json(resp).await;
        assert_eq!(rerun.file_count, 1);
        assert!(rerun.message.starts_with("Crawl complete. 1 files processed."));
        assert_ne!(rerun.timestamp, "N/A");
        assert_eq!(state.corpus.snapshot().files[0].path, "one.ts");
    }

    #[tokio::test]
    async fn test_get_config_endpoint() {
        let app = router(test_state(Corpus::default()));
        let req = Request::get("/get_config").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let config: AppConfig = body_json(resp).await;
        assert_eq!(config, AppConfig::default());
    }

    #[tokio::test]
    async fn test_logs_endpoint() {
        let app = router(test_state(Corpus::default()));
        let req = Request::get("/logs").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let logs: LogsResponse = body_json(resp).await;
        assert_eq!(logs.total, logs.entries.len());
    }

    #[tokio::test]
    async fn test_logs_limit_returns_newest_entries() {
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let collector = LogCollector::new(10);
        let reader = collector.reader();
        {
            let _guard = tracing_subscriber::registry().with(collector).set_default();
            for message in ["first", "second", "third"] {
                tracing::info!("{message}");
            }
        }

        let app = router(test_state_with_logs(Corpus::default(), reader));
        let req = Request::get("/logs?limit=2").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let logs: LogsResponse = body_json(resp).await;
        assert_eq!(logs.total, 3);
        let messages: Vec<&str> = logs.entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "third"]);
    }

    #[tokio::test]
    async fn test_stop_endpoint() {
        let state = test_state(Corpus::default());
        let mut rx = state.shutdown_tx.subscribe();
        let app = router(state);

        let req = Request::post("/stop").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let stop: StopResponse = body_json(resp).await;
        assert!(stop.acknowledged);
        assert!(rx.try_recv().is_ok());
    }
}
