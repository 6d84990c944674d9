//! The crawled corpus and the store that publishes it.
//!
//! A [`Corpus`] is immutable once built. [`CorpusStore`] holds the current one
//! behind an `Arc` in a `tokio::sync::watch` channel: readers take a cheap
//! snapshot, and a refresh swaps in a complete new corpus, so a reader never
//! sees a half-built crawl.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::crawl::{CrawlError, CrawlOutput, CrawlStats, Crawler, FileRecord};

/// Format of [`Corpus::timestamp`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shown in place of a timestamp before the first crawl.
pub const NO_TIMESTAMP: &str = "N/A";

/// The files of one crawl plus when it happened.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub files: Vec<FileRecord>,
    /// Local time the crawl finished, `None` before the first crawl.
    pub timestamp: Option<String>,
    pub stats: CrawlStats,
}

impl Corpus {
    /// Stamp a crawl result with the current local time.
    pub fn from_crawl(output: CrawlOutput) -> Self {
        Self {
            files: output.files,
            timestamp: Some(chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()),
            stats: output.stats,
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// The timestamp, or `N/A` before the first crawl.
    pub fn timestamp_or_na(&self) -> &str {
        self.timestamp.as_deref().unwrap_or(NO_TIMESTAMP)
    }
}

/// Shared holder of the current [`Corpus`].
#[derive(Debug)]
pub struct CorpusStore {
    tx: watch::Sender<Arc<Corpus>>,
}

impl CorpusStore {
    /// Create a store holding an empty, unstamped corpus.
    pub fn new() -> Self {
        Self::with_corpus(Corpus::default())
    }

    pub fn with_corpus(corpus: Corpus) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(corpus));
        Self { tx }
    }

    /// The current corpus. Later refreshes do not affect the returned value.
    pub fn snapshot(&self) -> Arc<Corpus> {
        Arc::clone(&self.tx.borrow())
    }

    /// Publish `corpus`, returning the shared handle to it.
    pub fn replace(&self, corpus: Corpus) -> Arc<Corpus> {
        let corpus = Arc::new(corpus);
        self.tx.send_replace(Arc::clone(&corpus));
        corpus
    }

    /// Crawl with `crawler` and publish the result.
    ///
    /// Blocks on filesystem I/O; async callers should run it on a blocking
    /// thread. On error the previous corpus stays published.
    pub fn refresh(&self, crawler: &Crawler) -> Result<Arc<Corpus>, CrawlError> {
        let corpus = Corpus::from_crawl(crawler.crawl()?);
        info!(
            files = corpus.file_count(),
            timestamp = corpus.timestamp_or_na(),
            "Corpus refreshed"
        );
        Ok(self.replace(corpus))
    }
}

impl Default for CorpusStore {
    fn default() -> Self {
        Self::new()
    }
}
