#![deny(unsafe_code)]

//! Docster core: crawl a project, find code blocks, serve them over HTTP.
//!
//! The extraction engine ([`extract`]) is pure and synchronous. The crawler
//! ([`crawl`]) produces a [`Corpus`] that [`CorpusStore`] publishes to the
//! HTTP server ([`http`]) and the CLI.

/// Source compactor for pasting whole folders into a prompt.
pub mod compact;
/// Immutable crawl snapshots and the store that swaps them.
pub mod corpus;
/// Directory walking and file selection.
pub mod crawl;
/// Server process lifecycle.
pub mod daemon;
/// Brace matcher and declaration locator.
pub mod extract;
/// HTTP server, client and wire types.
pub mod http;
/// In-memory log collector served at `/logs`.
pub mod logging;
/// Keyword search and text rendering.
pub mod search;

pub use corpus::{Corpus, CorpusStore};
pub use crawl::{CrawlError, Crawler, FileRecord, RecordKind};
pub use daemon::{Daemon, DaemonError};
pub use extract::{ExtractedBlock, extract_code_block, find_matching_brace};
pub use http::DocsterClient;
pub use logging::{LogCollector, LogReader};
pub use search::{SearchOutcome, format_all, search_corpus};
