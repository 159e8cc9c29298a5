//! Structured logging setup. Replaces the teacher's `util::log`/`LogLevel`
//! free-function logger with a `tracing` subscriber; the verbosity
//! vocabulary is kept the same (debug, verbose, notice, warning) by mapping
//! onto `tracing`'s levels.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
