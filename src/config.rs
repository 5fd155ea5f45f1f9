use std::path::Path;
use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Config file picked up from the working directory when none is given.
const CWD_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Host to bind
    #[arg(long, env = "BIND_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Disable timeout middleware
    #[arg(long, env = "TIMEOUT_DISABLED")]
    pub timeout_disabled: Option<bool>,

    /// Delay before the chat assistant replies, in milliseconds
    #[arg(long, env = "CHAT_REPLY_DELAY_MS")]
    pub reply_delay_ms: Option<u64>,

    /// Log output format (compact or json)
    #[arg(long, env = "LOG_FORMAT")]
    pub log_format: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub resilience: ResilienceConfig,
    pub chat: ChatConfig,
    pub sessions: SessionConfig,
    pub site: SiteConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResilienceConfig {
    pub timeout_disabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    pub reply_delay_ms: u64,
}

impl ChatConfig {
    #[must_use]
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
    pub sweep_interval_secs: u64,
}

impl SessionConfig {
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        // A zero interval would make tokio's interval panic.
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    pub static_dir: String,
}

/// Log line format.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Layering, lowest to highest: defaults, config file, `SOFTSELL_*`
    /// environment, CLI flags (and their plain env fallbacks).
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("resilience.timeout_disabled", false)?
            .set_default("chat.reply_delay_ms", 800)?
            .set_default("sessions.idle_timeout_secs", 30 * 60)?
            .set_default("sessions.sweep_interval_secs", 60)?
            .set_default("site.static_dir", "static")?
            .set_default("telemetry.log_format", "compact")?;

        // Explicit file must exist; the cwd fallback is optional.
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else if Path::new(CWD_CONFIG_FILE).exists() {
            builder = builder.add_source(File::with_name(CWD_CONFIG_FILE).required(false));
        }

        // E.g. SOFTSELL_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("SOFTSELL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(td) = cli.timeout_disabled {
            builder = builder.set_override("resilience.timeout_disabled", td)?;
        }
        if let Some(delay) = cli.reply_delay_ms {
            builder = builder.set_override("chat.reply_delay_ms", delay)?;
        }
        if let Some(format) = cli.log_format {
            builder = builder.set_override("telemetry.log_format", format)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_defaults() {
        let config = AppConfig::load_from_args([
            "softsell",
            "--port",
            "4040",
            "--reply-delay-ms",
            "25",
            "--timeout-disabled",
            "true",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(config.server.port, 4040);
        assert_eq!(config.chat.reply_delay(), Duration::from_millis(25));
        assert!(config.resilience.timeout_disabled);
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_flag_is_an_error() {
        let err = AppConfig::load_from_args(["softsell", "--bogus"]).unwrap_err();
        assert!(err.to_string().contains("--bogus"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result =
            AppConfig::load_from_args(["softsell", "--config", "/nonexistent/softsell.yaml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sweep_interval_never_zero() {
        let sessions = SessionConfig {
            idle_timeout_secs: 1,
            sweep_interval_secs: 0,
        };
        assert_eq!(sessions.sweep_interval(), Duration::from_secs(1));
    }
}
