//! Server process: initial crawl, bind, serve until stopped.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

use docster_config::AppConfig;

use crate::corpus::CorpusStore;
use crate::crawl::Crawler;
use crate::http::server::{self, AppState};
use crate::logging::LogReader;

/// Shutdown signal sent via broadcast channel.
#[derive(Debug, Clone)]
pub struct ShutdownSignal;

/// Errors from the server runtime.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("address {0} is already in use; is another docster server running?")]
    AddrInUse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The Docster server.
pub struct Daemon {
    config: AppConfig,
    crawler: Crawler,
    corpus: Arc<CorpusStore>,
    logs: LogReader,
    shutdown_tx: broadcast::Sender<ShutdownSignal>,
}

impl Daemon {
    /// A server for `root`. Logs are served from `logs`.
    pub fn new(config: AppConfig, root: impl Into<PathBuf>, logs: LogReader) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            crawler: Crawler::new(root, &config),
            config,
            corpus: Arc::new(CorpusStore::new()),
            logs,
            shutdown_tx,
        }
    }

    /// Crawl, bind the configured address and serve until `/stop` or Ctrl-C.
    pub async fn run(&self) -> Result<(), DaemonError> {
        let addr = self.config.bind_address();
        info!(%addr, root = %self.crawler.root().display(), "Docster server starting");

        self.initial_crawl().await;

        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                DaemonError::AddrInUse(addr.clone())
            } else {
                DaemonError::Io(e)
            }
        })?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener until shut down.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), DaemonError> {
        let shutdown_rx = self.shutdown_tx.subscribe();
        let server = server::serve(listener, self.state(), shutdown_rx);
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => result?,
            _ = tokio::signal::ctrl_c() => {
                warn!("Ctrl-C received, initiating graceful shutdown");
                self.shutdown();
                server.await?;
            }
        }

        info!("Server stopped");
        Ok(())
    }

    /// Crawl once; a failure leaves the corpus empty but does not stop startup.
    pub async fn initial_crawl(&self) {
        let corpus = Arc::clone(&self.corpus);
        let crawler = self.crawler.clone();
        match tokio::task::spawn_blocking(move || corpus.refresh(&crawler)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(error = %e, "Initial crawl failed, serving an empty corpus"),
            Err(e) => warn!(error = %e, "Initial crawl task failed"),
        }
    }

    /// Request a graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(ShutdownSignal);
    }

    pub fn corpus(&self) -> &Arc<CorpusStore> {
        &self.corpus
    }

    fn state(&self) -> Arc<AppState> {
        Arc::new(AppState {
            config: self.config.clone(),
            crawler: self.crawler.clone(),
            corpus: Arc::clone(&self.corpus),
            logs: self.logs.clone(),
            shutdown_tx: self.shutdown_tx.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogCollector;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_initial_crawl_populates_corpus() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.ts"), "const a = 1;").unwrap();

        let daemon = Daemon::new(AppConfig::default(), tmp.path(), LogCollector::new(1).reader());
        daemon.initial_crawl().await;
        assert_eq!(daemon.corpus().snapshot().file_count(), 1);
    }

    #[tokio::test]
    async fn test_initial_crawl_failure_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let daemon = Daemon::new(
            AppConfig::default(),
            tmp.path().join("missing"),
            LogCollector::new(1).reader(),
        );
        daemon.initial_crawl().await;
        assert_eq!(daemon.corpus().snapshot().timestamp_or_na(), "N/A");
    }

    #[tokio::test]
    async fn test_addr_in_use() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let mut config = AppConfig::default();
        config.server.listen_port = port;
        let tmp = TempDir::new().unwrap();
        let daemon = Daemon::new(config, tmp.path(), LogCollector::new(1).reader());

        let result = daemon.run().await;
        assert!(matches!(result, Err(DaemonError::AddrInUse(_))));
    }

    #[tokio::test]
    async fn test_shutdown_without_server() {
        let tmp = TempDir::new().unwrap();
        let daemon = Daemon::new(AppConfig::default(), tmp.path(), LogCollector::new(1).reader());
        // No receivers yet; must not panic.
        daemon.shutdown();
    }
}
