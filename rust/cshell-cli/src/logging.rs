//! Diagnostic logging setup.
//!
//! User-facing messages go straight to the terminal; `tracing` output is for
//! debugging the shell itself and is filtered through `CSHELL_LOG`
//! (e.g. `CSHELL_LOG=cshell_core=debug`).

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "CSHELL_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber, writing to stderr. Safe to call twice.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
