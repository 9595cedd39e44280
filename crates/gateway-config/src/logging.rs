//! Logging initialization for authgate.
//!
//! Events are written as structured JSONL to `~/.authgate/logs/authgate.jsonl`
//! when a log path is given. Without one, a compact formatter writes to stderr.

pub use observability::LogConfig;

/// Service name written into every log line.
const SERVICE_NAME: &str = "authgate";

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// ```ignore
/// init_logging("info", Some(paths.log_file()));
/// tracing::info!("authgate started");
/// ```
pub fn init_logging(level: &str, log_path: Option<std::path::PathBuf>) {
    observability::init_with_config(LogConfig {
        service_name: SERVICE_NAME.into(),
        default_level: level.into(),
        log_path,
        also_stderr: false,
    });
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
