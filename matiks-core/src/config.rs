//! Dashboard settings read from `config.toml`.
//!
//! Paths follow XDG conventions. Settings live in `$XDG_CONFIG_HOME/matiks/`
//! and rolling logs in `$XDG_STATE_HOME/matiks/`. Every section is optional.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

fn home() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `$var` when set and non-empty, else `fallback` under the home directory.
fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    match env::var_os(var) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home().join(fallback),
    }
}

/// Top-level settings file.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub insights: InsightConfig,
    pub logging: LoggingConfig,
}

/// Where the activity dataset lives.
#[derive(Debug, Deserialize)]
pub struct DatasetConfig {
    /// Path to the CSV file (relative paths resolve against the working directory)
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("Matiks_dataset.csv")
}

/// Thresholds used by the insight heuristics.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InsightConfig {
    /// Quantile of revenue above which a user is high value
    #[serde(default = "default_percentile")]
    pub high_value_percentile: f64,

    /// Quantile of play sessions above which a user is high retention
    #[serde(default = "default_percentile")]
    pub high_retention_percentile: f64,

    /// Days without a login before a user counts as churn risk
    #[serde(default = "default_churn_inactive_days")]
    pub churn_inactive_days: i64,

    /// Users with at most this many play sessions are low engagement
    #[serde(default = "default_low_session_threshold")]
    pub low_session_threshold: u32,

    /// Subscription tier label treated as the mid tier
    #[serde(default = "default_mid_tier_label")]
    pub mid_tier_label: String,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            high_value_percentile: default_percentile(),
            high_retention_percentile: default_percentile(),
            churn_inactive_days: default_churn_inactive_days(),
            low_session_threshold: default_low_session_threshold(),
            mid_tier_label: default_mid_tier_label(),
        }
    }
}

impl InsightConfig {
    /// Reject quantiles outside `[0, 1]` and negative day counts.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("insights.high_value_percentile", self.high_value_percentile),
            (
                "insights.high_retention_percentile",
                self.high_retention_percentile,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }
        if self.churn_inactive_days < 0 {
            return Err(Error::Config(
                "insights.churn_inactive_days must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_percentile() -> f64 {
    0.9
}

fn default_churn_inactive_days() -> i64 {
    30
}

fn default_low_session_threshold() -> u32 {
    2
}

fn default_mid_tier_label() -> String {
    "Mid".to_string()
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Dated log files kept before the oldest is removed
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Read `config_path()`, or fall back to defaults when it does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            return Self::load_from(&path);
        }
        tracing::info!(path = %path.display(), "no config file, using defaults");
        Ok(Self::default())
    }

    /// Parse and validate the settings file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("invalid {}: {}", path.display(), e)))?;
        config.insights.validate()?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        xdg_dir("XDG_CONFIG_HOME", ".config")
            .join("matiks")
            .join("config.toml")
    }

    /// Directory holding the rolling log files.
    pub fn state_dir() -> PathBuf {
        xdg_dir("XDG_STATE_HOME", ".local/state").join("matiks")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dataset.path, PathBuf::from("Matiks_dataset.csv"));
        assert_eq!(config.insights.high_value_percentile, 0.9);
        assert_eq!(config.insights.churn_inactive_days, 30);
        assert_eq!(config.insights.low_session_threshold, 2);
        assert_eq!(config.insights.mid_tier_label, "Mid");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[dataset]
path = "/data/activity.csv"

[insights]
high_value_percentile = 0.95
churn_inactive_days = 14

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.dataset.path, PathBuf::from("/data/activity.csv"));
        assert_eq!(config.insights.high_value_percentile, 0.95);
        assert_eq!(config.insights.high_retention_percentile, 0.9);
        assert_eq!(config.insights.churn_inactive_days, 14);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_insight_config_validation() {
        assert!(InsightConfig::default().validate().is_ok());

        let config = InsightConfig {
            high_value_percentile: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = InsightConfig {
            churn_inactive_days: -1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_rejects_bad_percentile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[insights]\nhigh_retention_percentile = -0.1\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
