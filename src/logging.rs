// src/logging.rs
// =============================================================================
// Sets up the tracing subscriber.
//
// Library code logs through the `tracing` macros; this decides where those
// events go. Everything is written to stderr, so stdout only carries the
// user-facing output (and stays valid JSON with `crawl --json`).
//
// RUST_LOG overrides the default level, e.g.:
//   RUST_LOG=debug                      everything, including each GET
//   RUST_LOG=pdf_scout=info,reqwest=warn
// =============================================================================

use tracing_subscriber::EnvFilter;

// Per-page failures are logged at info; the terminal output already shows them
const DEFAULT_FILTER: &str = "warn";

pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // try_init: a second call (e.g. from tests) is not an error worth dying for
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
