//! Layered configuration for the `repo-ledger` binary.
//!
//! Precedence (lowest to highest):
//! 1. Programmatic defaults
//! 2. The TOML file given by `--config` (optional; missing file is skipped)
//! 3. `REPO_LEDGER_*` environment variables, `__` separating nested keys
//! 4. `NOTION_TOKEN` / `NOTION_DATABASE`

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use notion::NotionConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = ".repo-ledger/config.toml";

const ENV_PREFIX: &str = "REPO_LEDGER_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Missing Notion access token (set NOTION_TOKEN or notion.token)")]
    MissingToken,

    #[error("Missing Notion database id (set NOTION_DATABASE or notion.database_id)")]
    MissingDatabase,

    #[error("Invalid notion.timeout_secs: must be at least 1")]
    InvalidTimeout,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Output format of the stdout log layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level; `RUST_LOG` overrides it.
    pub level: String,
    pub format: LogFormat,
    /// OTLP gRPC endpoint (e.g. `http://localhost:4317`). Export is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            otlp_endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub notion: NotionConfig,
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Loads configuration from `path` and the process environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_figment(
            Figment::new()
                .merge(Serialized::defaults(CliConfig::default()))
                .merge(Toml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__"))
                .merge(notion_env()),
        )
    }

    /// Extracts and validates configuration from an assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: CliConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notion.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.notion.database_id.trim().is_empty() {
            return Err(ConfigError::MissingDatabase);
        }
        if self.notion.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.logging.level.clone()));
        }
        Ok(())
    }
}

/// The two variables the ledger has always been configured with.
fn notion_env() -> Env {
    Env::raw().filter_map(|key| {
        if key == "NOTION_TOKEN" {
            Some("notion.token".into())
        } else if key == "NOTION_DATABASE" {
            Some("notion.database_id".into())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn defaults() -> Figment {
        Figment::new().merge(Serialized::defaults(CliConfig::default()))
    }

    #[test]
    fn file_values_are_applied_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[notion]
token = "secret_file"
database_id = "db-file"
timeout_secs = 10

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = CliConfig::from_figment(defaults().merge(Toml::file(file.path()))).unwrap();

        assert_eq!(config.notion.token, "secret_file");
        assert_eq!(config.notion.database_id, "db-file");
        assert_eq!(config.notion.timeout_secs, 10);
        assert_eq!(config.notion.base_url, notion::config::DEFAULT_BASE_URL);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.otlp_endpoint, None);
    }

    #[test]
    fn later_providers_override_earlier_ones() {
        let figment = defaults()
            .merge(Toml::string(
                "[notion]\ntoken = \"from-file\"\ndatabase_id = \"db\"\n",
            ))
            .merge(Serialized::default("notion.token", "from-env"));

        let config = CliConfig::from_figment(figment).unwrap();

        assert_eq!(config.notion.token, "from-env");
        assert_eq!(config.notion.database_id, "db");
    }

    #[test]
    fn environment_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[notion]
token = "tok-file"
database_id = "db-file"
timeout_secs = 20

[logging]
format = "pretty"
"#,
            )?;
            jail.set_env("NOTION_TOKEN", "tok-env");
            jail.set_env("NOTION_DATABASE", "db-env");
            jail.set_env("REPO_LEDGER_NOTION__TIMEOUT_SECS", "7");
            jail.set_env("REPO_LEDGER_LOGGING__FORMAT", "json");

            let config = CliConfig::load(Path::new("config.toml")).map_err(|e| e.to_string())?;

            assert_eq!(config.notion.token, "tok-env");
            assert_eq!(config.notion.database_id, "db-env");
            assert_eq!(config.notion.timeout_secs, 7);
            assert_eq!(config.logging.format, LogFormat::Json);
            Ok(())
        });
    }

    #[test]
    fn notion_variables_win_over_prefixed_ones() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("REPO_LEDGER_NOTION__TOKEN", "tok-prefixed");
            jail.set_env("REPO_LEDGER_NOTION__DATABASE_ID", "db-prefixed");
            jail.set_env("NOTION_TOKEN", "tok-env");

            let config =
                CliConfig::load(Path::new("missing.toml")).map_err(|e| e.to_string())?;

            assert_eq!(config.notion.token, "tok-env");
            assert_eq!(config.notion.database_id, "db-prefixed");
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let figment = defaults()
            .merge(Toml::file("/nonexistent/repo-ledger.toml"))
            .merge(Serialized::default("notion.token", "t"))
            .merge(Serialized::default("notion.database_id", "d"));

        assert!(CliConfig::from_figment(figment).is_ok());
    }

    #[test]
    fn missing_token_is_rejected() {
        let figment = defaults().merge(Serialized::default("notion.database_id", "d"));
        assert!(matches!(
            CliConfig::from_figment(figment),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn missing_database_is_rejected() {
        let figment = defaults().merge(Serialized::default("notion.token", "t"));
        assert!(matches!(
            CliConfig::from_figment(figment),
            Err(ConfigError::MissingDatabase)
        ));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let figment = defaults()
            .merge(Serialized::default("notion.token", "t"))
            .merge(Serialized::default("notion.database_id", "d"))
            .merge(Serialized::default("logging.level", "loud"));
        assert!(matches!(
            CliConfig::from_figment(figment),
            Err(ConfigError::InvalidLogLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn malformed_file_is_a_load_error() {
        let figment = defaults().merge(Toml::string("[notion\ntoken = "));
        assert!(matches!(
            CliConfig::from_figment(figment),
            Err(ConfigError::Load(_))
        ));
    }
}
