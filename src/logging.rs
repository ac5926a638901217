//! Tracing setup for test binaries.

use std::sync::Once;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

static INIT: Once = Once::new();

/// Route the mocks' `tracing` output through the test harness.
///
/// Honors `RUST_LOG` (default `info`; `appservice_mock=debug` shows every
/// recorded call). Safe to call from every test; only the first call installs
/// the subscriber, and an already installed global subscriber is left alone.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let result = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_filter(
                        EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
                    ),
            )
            .try_init();
        if let Err(e) = result {
            eprintln!("Tracing subscriber not installed: {e}");
        }
    });
}
