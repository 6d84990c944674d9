//! Tracing initialisation for tests.
//!
//! Call [`init_test_tracing`] at the top of any test that wants its tracing
//! events captured by the test harness. Tests that only need per-test capture
//! can use `#[test_log::test]` instead.

use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber honouring `RUST_LOG` (default `info`).
///
/// Only the first call in a process installs it; later calls are no-ops.
///
/// ```ignore
/// #[tokio::test]
/// async fn crawls_quietly() {
///     docster_test_utils::tracing_setup::init_test_tracing();
///     tracing::info!("visible when RUST_LOG=info");
/// }
/// ```
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
