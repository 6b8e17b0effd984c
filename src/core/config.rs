//! Configuration management

use clap::{Parser, Subcommand};
use config::{builder::DefaultState, Config as ConfigBuilder, ConfigError as BuilderError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Public MangaDex API root
pub const DEFAULT_BASE_URL: &str = "https://api.mangadex.org";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid api configuration: {0}")]
    InvalidApi(String),

    #[error("Invalid logging configuration: {0}")]
    InvalidLogging(String),

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

impl From<BuilderError> for ConfigError {
    fn from(err: BuilderError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

impl From<ConfigError> for crate::core::error::ExtensionError {
    fn from(err: ConfigError) -> Self {
        crate::core::error::ExtensionError::ConfigError(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration with precedence: CLI args > Environment variables > Config file > Defaults
    pub fn load(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let mut builder = with_defaults(ConfigBuilder::builder())?;

        if let Some(config_path) = &cli_args.config {
            if !config_path.exists() {
                return Err(ConfigError::FileNotFound(config_path.display().to_string()));
            }
            builder = builder.add_source(File::from(config_path.as_path()));
        }

        // Example: MANGADEX_API__BASE_URL=https://api.mangadex.dev
        builder = builder.add_source(
            Environment::with_prefix("MANGADEX")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(base_url) = &cli_args.base_url {
            builder = builder.set_override("api.base_url", base_url.clone())?;
        }
        if let Some(log_level) = &cli_args.log_level {
            builder = builder.set_override("logging.level", log_level.clone())?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file path, on top of the defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let config: Config = with_defaults(ConfigBuilder::builder())?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults only
    pub fn defaults() -> Result<Self, ConfigError> {
        let config: Config = with_defaults(ConfigBuilder::builder())?
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

fn with_defaults(
    builder: config::ConfigBuilder<DefaultState>,
) -> Result<config::ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("api.request_timeout", 30)?
        .set_default("api.rate_limit_cooldown_secs", 60)?
        .set_default(
            "api.user_agent",
            concat!("mangadex-extension/", env!("CARGO_PKG_VERSION")),
        )?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")?)
}

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "mangadex-extension")]
#[command(about = "Query the MangaDex catalogue through the extension interface", long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Catalogue API root
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search manga by title
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        /// Restrict results to safe and suggestive content
        #[arg(long)]
        safe: bool,
        /// Sort order as field:direction, e.g. followedCount:desc
        #[arg(long, value_name = "FIELD:DIR")]
        order: Option<String>,
    },
    /// Latest and most followed manga
    Explorer {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        safe: bool,
    },
    /// Manga details
    Info { manga_id: String },
    /// One page of a manga's chapter feed
    Chapters {
        manga_id: String,
        #[arg(long, default_value = "en")]
        language: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
    /// Page image URLs of a chapter
    Reader { chapter_id: String },
    /// Whether the local rate-limit cooldown is active
    RateLimit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout: u64, // seconds
    pub rate_limit_cooldown_secs: u64,
    pub user_agent: String,
}

impl ApiConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidApi(format!("base_url is not a valid URL: {}", e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApi("base_url must use http or https".to_string()));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidApi("request_timeout must be greater than 0".to_string()));
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::InvalidApi("user_agent cannot be empty".to_string()));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.rate_limit_cooldown_secs)
    }

    /// API root without a trailing slash
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(ConfigError::InvalidLogging(
                format!("level must be one of: {:?}", valid_levels)
            ));
        }

        let valid_formats = ["json", "text"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(ConfigError::InvalidLogging(
                format!("format must be one of: {:?}", valid_formats)
            ));
        }

        let valid_outputs = ["stderr", "stdout", "file"];
        if !valid_outputs.contains(&self.output.as_str()) {
            return Err(ConfigError::InvalidLogging(
                format!("output must be one of: {:?}", valid_outputs)
            ));
        }

        if self.output == "file" && self.log_file.is_none() {
            return Err(ConfigError::InvalidLogging(
                "log_file must be specified when output is 'file'".to_string()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::defaults().unwrap();

        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.cooldown(), Duration::from_secs(60));
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert!(config.api.user_agent.starts_with("mangadex-extension/"));
        assert_eq!(config.logging.output, "stderr");
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"https://api.mangadex.dev/\"\nrate_limit_cooldown_secs = 5\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.api.trimmed_base_url(), "https://api.mangadex.dev");
        assert_eq!(config.api.cooldown(), Duration::from_secs(5));
        assert_eq!(config.api.request_timeout, 30);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = CliArgs::parse_from([
            "mangadex-extension",
            "--base-url",
            "http://localhost:8080",
            "--log-level",
            "info",
            "rate-limit",
        ]);

        let config = Config::load(&cli).unwrap();

        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.logging.level, "info");
        assert!(matches!(cli.command, Command::RateLimit));
    }

    #[test]
    fn test_api_validation() {
        let mut api = Config::defaults().unwrap().api;
        api.base_url = "not a url".to_string();
        assert!(matches!(api.validate(), Err(ConfigError::InvalidApi(_))));

        api.base_url = "ftp://api.mangadex.org".to_string();
        assert!(api.validate().is_err());

        api.base_url = DEFAULT_BASE_URL.to_string();
        api.request_timeout = 0;
        assert!(api.validate().is_err());
    }

    #[test]
    fn test_logging_validation() {
        let mut logging = Config::defaults().unwrap().logging;
        logging.level = "verbose".to_string();
        assert!(logging.validate().is_err());

        logging.level = "info".to_string();
        logging.output = "file".to_string();
        assert!(matches!(logging.validate(), Err(ConfigError::InvalidLogging(_))));

        logging.log_file = Some(PathBuf::from("./logs/extension.log"));
        assert!(logging.validate().is_ok());
    }

    #[test]
    fn test_search_subcommand_parsing() {
        let cli = CliArgs::parse_from([
            "mangadex-extension",
            "search",
            "berserk",
            "--limit",
            "5",
            "--safe",
            "--order",
            "followedCount:desc",
        ]);

        match cli.command {
            Command::Search { query, limit, safe, order } => {
                assert_eq!(query, "berserk");
                assert_eq!(limit, 5);
                assert!(safe);
                assert_eq!(order.as_deref(), Some("followedCount:desc"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
