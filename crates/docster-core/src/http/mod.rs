//! Local HTTP façade over the corpus.
//!
//! The server exposes a small JSON API on a TCP port (default
//! `127.0.0.1:3222`). The CLI talks to a running server through
//! [`DocsterClient`].
//!
//! ```text
//! ┌──────────┐      HTTP/1.1 + JSON      ┌──────────────┐
//! │   CLI    │──────────────────────────▶│  HTTP server │
//! │ browser  │                           │   (axum)     │
//! └──────────┘                           └──────┬───────┘
//!                                               │ snapshot / refresh
//!                                        ┌──────▼───────┐
//!                                        │ CorpusStore  │
//!                                        └──────────────┘
//! ```

pub mod client;
pub mod server;
pub mod types;

pub use client::{ClientError, DocsterClient};
pub use server::AppState;
pub use types::*;
