//! Pipeline configuration
//!
//! Settings come from, in increasing precedence: built-in defaults, a TOML
//! file (`--config <path>` or `kiva.toml` in the working directory),
//! `KIVA_*` environment variables, and finally command-line flags.

use crate::error::{PipelineError, Result};
use crate::model::ModelPlan;
use crate::transform::{BuildOptions, Mode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "kiva.toml";

pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Directory of raw source files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_dir: Option<PathBuf>,

    /// Where the built table is written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    #[serde(default)]
    pub build: BuildOptions,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub model: ModelPlan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_user")]
    pub user: String,

    /// Never written back out by `show-config`
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    #[serde(default = "default_database")]
    pub name: String,

    /// Table the cleaned loans are loaded into
    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: None,
            name: default_database(),
            table: default_table(),
            max_connections: default_max_connections(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_database() -> String {
    "kiva".to_string()
}

fn default_table() -> String {
    "loans".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

impl PipelineConfig {
    /// Load from `path`, or from `kiva.toml` in the working directory when it
    /// exists, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::from_file(local)?
                } else {
                    Self::default()
                }
            }
        };
        config.merge_env_vars();
        config.resolve_model_table();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| PipelineError::io_at(path, e))?;
        let config: Self = toml::from_str(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_env_from(|key| std::env::var(key).ok());
    }

    /// Apply `KIVA_*` overrides from any variable lookup
    pub fn merge_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("KIVA_LOG_LEVEL") {
            self.log_level = Some(level);
        }

        if let Some(mode) = lookup("KIVA_MODE").and_then(|m| m.parse::<Mode>().ok()) {
            self.build.mode = mode;
        }

        if let Some(host) = lookup("KIVA_DB_HOST") {
            self.database.host = host;
        }

        if let Some(port) = lookup("KIVA_DB_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.database.port = port;
        }

        if let Some(user) = lookup("KIVA_DB_USER") {
            self.database.user = user;
        }

        if let Some(password) = lookup("KIVA_DB_PASSWORD") {
            self.database.password = Some(password);
        }

        if let Some(name) = lookup("KIVA_DB_NAME") {
            self.database.name = name;
        }

        if let Some(table) = lookup("KIVA_DB_TABLE") {
            self.database.table = table;
        }
    }

    /// Point the model plan at the configured database table
    pub fn resolve_model_table(&mut self) {
        self.model.table = self.database.table.clone();
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(level) = &self.log_level {
            if !VALID_LOG_LEVELS.contains(&level.as_str()) {
                return Err(PipelineError::Config(format!(
                    "invalid log_level '{level}', expected one of {}",
                    VALID_LOG_LEVELS.join(", ")
                )));
            }
        }

        if self.build.window.is_empty() {
            return Err(PipelineError::Config(format!(
                "date window {} .. {} is empty",
                self.build.window.after, self.build.window.before
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::DateWindow;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.build.mode, Mode::Simple);
        assert_eq!(config.build.window, DateWindow::policy());
        assert_eq!(config.database.name, "kiva");
        assert_eq!(config.database.table, "loans");
        assert_eq!(config.database.port, 5432);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
log_level = "debug"
input_dir = "data/raw"
output = "data/loans.snap"

[build]
mode = "complex"
derive_features = true

[build.window]
after = "2013-01-01"
before = "2013-12-31"

[database]
host = "db.internal"
user = "analyst"
connect_timeout = "5s"
"#;

        let config: PipelineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.input_dir, Some(PathBuf::from("data/raw")));
        assert_eq!(config.build.mode, Mode::Complex);
        assert!(config.build.derive_features);
        assert_eq!(
            config.build.window.after,
            NaiveDate::from_ymd_opt(2013, 1, 1).unwrap()
        );
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_merge_env_from() {
        let env: HashMap<&str, &str> = [
            ("KIVA_LOG_LEVEL", "warn"),
            ("KIVA_MODE", "complex"),
            ("KIVA_DB_HOST", "pg"),
            ("KIVA_DB_PORT", "6543"),
            ("KIVA_DB_USER", "me"),
            ("KIVA_DB_PASSWORD", "secret"),
            ("KIVA_DB_NAME", "lending"),
            ("KIVA_DB_TABLE", "loans_2014"),
        ]
        .into_iter()
        .collect();

        let mut config = PipelineConfig::default();
        config.merge_env_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert_eq!(config.build.mode, Mode::Complex);
        assert_eq!(config.database.host, "pg");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.user, "me");
        assert_eq!(config.database.password.as_deref(), Some("secret"));
        assert_eq!(config.database.name, "lending");
        assert_eq!(config.database.table, "loans_2014");
    }

    #[test]
    fn test_merge_env_ignores_unparseable_values() {
        let mut config = PipelineConfig::default();
        config.merge_env_from(|key| match key {
            "KIVA_DB_PORT" => Some("not-a-port".to_string()),
            "KIVA_MODE" => Some("fancy".to_string()),
            _ => None,
        });
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.build.mode, Mode::Simple);
    }

    #[test]
    fn test_model_table_follows_database_table() {
        let mut config: PipelineConfig = toml::from_str(
            "[database]\ntable = \"loans_file\"\n\n[model]\ntable = \"ignored\"\n",
        )
        .unwrap();
        config.merge_env_from(|key| (key == "KIVA_DB_TABLE").then(|| "loans_env".to_string()));
        config.resolve_model_table();

        assert_eq!(config.database.table, "loans_env");
        assert_eq!(config.model.table, "loans_env");
        assert!(config
            .model
            .training_query()
            .to_sql()
            .unwrap()
            .contains("FROM loans_env"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PipelineConfig {
            log_level: Some("loud".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.log_level = None;
        let day = NaiveDate::from_ymd_opt(2013, 1, 1).unwrap();
        config.build.window = DateWindow::new(day, day);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pipeline.toml");
        fs::write(&path, "[database]\ntable = \"loans_test\"\n").unwrap();

        let config = PipelineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.model.table, config.database.table);

        assert!(PipelineConfig::load(Some(&temp.path().join("missing.toml"))).is_err());
    }
}
