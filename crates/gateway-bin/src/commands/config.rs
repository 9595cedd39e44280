//! Configuration command.

use super::Context;
use crate::output::{self, row};
use anyhow::Result;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
struct ConfigOutput<'a> {
    #[serde(flatten)]
    config: &'a gateway_config::Config,
    config_file: String,
    log_file: String,
}

impl fmt::Display for ConfigOutput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration")?;
        writeln!(f, "{}", "-".repeat(40))?;
        writeln!(f, "{}", row("API base URL", &self.config.api_base_url))?;
        writeln!(f, "{}", row("Refresh path", &self.config.refresh_path))?;
        writeln!(
            f,
            "{}",
            row("Timeout", format!("{}s", self.config.request_timeout_secs))
        )?;
        writeln!(f, "{}", row("Log level", &self.config.log_level))?;
        writeln!(f, "{}", row("Config file", &self.config_file))?;
        write!(f, "{}", row("Log file", &self.log_file))
    }
}

/// Print the configuration after file and environment overrides.
pub fn show_config(ctx: &Context) -> Result<()> {
    let view = ConfigOutput {
        config: &ctx.config,
        config_file: ctx.paths.config_file().display().to_string(),
        log_file: ctx.paths.log_file().display().to_string(),
    };
    output::print(&view, ctx.format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_config::Config;

    #[test]
    fn test_json_view_flattens_config() {
        let config = Config::default();
        let view = ConfigOutput {
            config: &config,
            config_file: "/tmp/config.json".into(),
            log_file: "/tmp/logs/authgate.jsonl".into(),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["refresh_path"], config.refresh_path.as_str());
        assert_eq!(json["config_file"], "/tmp/config.json");
    }
}
