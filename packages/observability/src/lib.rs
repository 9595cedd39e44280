//! # Observability
//!
//! Logging setup shared by the authgate crates.
//!
//! Library crates never configure logging themselves. They emit events through
//! the standard `tracing` macros and the binary calls [`init_with_config`] once
//! at startup to decide where those events go:
//!
//! - With a `log_path`, every event is appended as one JSON object per line
//!   (`tail -f ~/.authgate/logs/authgate.jsonl | jq`), optionally mirrored to
//!   stderr in compact form.
//! - Without a `log_path`, a compact stderr formatter is installed.
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "authgate".into(),
//!     default_level: "debug".into(),
//!     log_path: Some(paths.log_file()),
//!     also_stderr: true,
//! });
//! ```

mod file_sink;
mod json_layer;

use std::path::PathBuf;

pub use file_sink::{CentralLogWriter, WriterFactory};
pub use json_layer::{JsonLayer, LogEntry};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, written into every JSONL line.
    pub service_name: String,

    /// Default filter (e.g. "debug", "info", "gateway_auth=trace").
    /// `RUST_LOG` takes precedence when set.
    pub default_level: String,

    /// JSONL output file. `None` logs to stderr only.
    pub log_path: Option<PathBuf>,

    /// Mirror events to stderr when a log file is configured.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize logging with default settings for a named service.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize logging with custom configuration.
///
/// Installing a global subscriber twice is a no-op; the second call is ignored
/// so tests and embedders can call this freely.
pub fn init_with_config(config: LogConfig) {
    if let Some(path) = config.log_path.clone() {
        match CentralLogWriter::new(&path) {
            Ok(writer) => {
                file_sink::init_file_subscriber(&config, &path, writer);
                return;
            }
            Err(e) => {
                eprintln!(
                    "failed to open log file {}: {}; falling back to stderr",
                    path.display(),
                    e
                );
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(&config.default_level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn build_env_filter(default_level: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
}

pub use tracing::{debug, error, info, instrument, trace, warn};

pub use tracing::Level;
