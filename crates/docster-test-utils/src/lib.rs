#![deny(unsafe_code)]

//! Shared test utilities for the Docster workspace.
//!
//! Provides config builders, on-disk project fixtures and tracing helpers so
//! that individual crate tests stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! docster-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod project;
pub mod tracing_setup;

pub use config::TestConfigBuilder;
pub use project::TestProject;
