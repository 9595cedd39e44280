//! authgate - command-line front end for the authenticated API client.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::Context;
use gateway_config::{init_logging, Config, Paths};
use std::path::PathBuf;

/// authgate - send requests with automatic credential refresh.
#[derive(Parser)]
#[command(name = "authgate")]
#[command(about = "Authenticated API client with single-flight credential refresh")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(long, env = "AUTHGATE_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Directory holding config, credentials and logs (default ~/.authgate)
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a credential pair obtained elsewhere
    Login {
        /// Access token
        #[arg(long)]
        access_token: String,
        /// Refresh token
        #[arg(long)]
        refresh_token: String,
    },

    /// Clear the stored credential pair
    Logout,

    /// Show authentication status
    Status,

    /// Send a request through the authenticated client
    Request {
        /// HTTP method (GET, POST, ...)
        method: String,
        /// Path relative to the API base URL
        path: String,
        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Show the effective configuration
    Config,
}

fn build_context(cli: &Cli) -> anyhow::Result<Context> {
    let paths = match &cli.base_dir {
        Some(dir) => Paths::with_base_dir(dir.clone()),
        None => Paths::new()?,
    };
    paths.ensure_dirs()?;
    let config = Config::load(&paths)?;
    Ok(Context::new(paths, config, cli.format))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let ctx = match build_context(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            output::print_error(&e.to_string(), cli.format);
            std::process::exit(1);
        }
    };

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| ctx.config.log_level.clone());
    init_logging(&level, Some(ctx.paths.log_file()));
    tracing::debug!(base_dir = %ctx.paths.base_dir().display(), "authgate starting");

    let result = match cli.command {
        Commands::Login {
            access_token,
            refresh_token,
        } => commands::login(&ctx, access_token, refresh_token),
        Commands::Logout => commands::logout(&ctx),
        Commands::Status => commands::status(&ctx),
        Commands::Request { method, path, data } => {
            commands::request(&ctx, &method, &path, data.as_deref()).await
        }
        Commands::Config => commands::show_config(&ctx),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        output::print_error(&e.to_string(), cli.format);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_request_with_data() {
        let cli = Cli::try_parse_from([
            "authgate",
            "request",
            "POST",
            "/orders",
            "--data",
            r#"{"qty":2}"#,
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.format, output::OutputFormat::Json);
        match cli.command {
            Commands::Request { method, path, data } => {
                assert_eq!(method, "POST");
                assert_eq!(path, "/orders");
                assert_eq!(data.as_deref(), Some(r#"{"qty":2}"#));
            }
            _ => panic!("expected request command"),
        }
    }

    #[test]
    fn test_login_requires_both_tokens() {
        assert!(Cli::try_parse_from(["authgate", "login", "--access-token", "A1"]).is_err());
        assert!(Cli::try_parse_from([
            "authgate",
            "login",
            "--access-token",
            "A1",
            "--refresh-token",
            "R1"
        ])
        .is_ok());
    }

    #[test]
    fn test_base_dir_is_global() {
        let cli = Cli::try_parse_from(["authgate", "status", "--base-dir", "/tmp/ag"]).unwrap();
        assert_eq!(cli.base_dir, Some(PathBuf::from("/tmp/ag")));
    }

    #[test]
    fn test_build_context_uses_base_dir() {
        let temp = tempfile::tempdir().unwrap();
        let base = temp.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["authgate", "config", "--base-dir", base]).unwrap();

        let ctx = build_context(&cli).unwrap();
        assert_eq!(ctx.paths.base_dir(), temp.path());
        assert!(ctx.paths.logs_dir().exists());
    }
}
