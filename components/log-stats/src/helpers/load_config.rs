// Local crates
use crate::helpers::errors::StatsError;

// External crates
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Lines between two periodic snapshots when no configuration says otherwise.
pub const DEFAULT_CADENCE: u64 = 10;

/// Top level log-stats configuration. Every section is optional.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `[report]` section
    pub report: ReportConfig,
    /// `[metrics]` section
    pub metrics: MetricsConfig,
    /// `[logging]` section
    pub logging: LoggingConfig,
}

impl Config {
    /// Load, parse and validate the configuration file
    #[instrument(
        name = "config_loader",
        target = "helpers::load_config",
        level = "trace",
        skip_all
    )]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        tracing::trace!(
            configuration_file_path = %path_ref.display(),
            "Loading log-stats configuration file"
        );

        let config_str = match fs::read_to_string(path_ref) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read configuration file");
                return Err(e)
                    .with_context(|| format!("Failed to read config file at {:?}", path_ref));
            }
        };
        let config: Config = match toml::from_str(&config_str) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse TOML configuration");
                return Err(e)
                    .with_context(|| format!("Failed to parse TOML from {:?}", path_ref));
            }
        };

        config.validate(path_ref)?;

        tracing::trace!(configuration_file_path = %path_ref.display(), "log-stats configuration file loaded successfully");
        Ok(config)
    }

    /// Loads `path` when given, otherwise falls back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self, path: &Path) -> Result<(), StatsError> {
        if self.report.cadence == 0 {
            return Err(StatsError::InvalidConfig {
                path: path.to_path_buf(),
                reason: "report.cadence must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Snapshot settings
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Number of processed lines between two periodic snapshots
    pub cadence: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            cadence: DEFAULT_CADENCE,
        }
    }
}

/// Accumulator settings
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Handling of status codes outside the tracked set
    pub unknown_status: UnknownStatusPolicy,
}

/// What the accumulator does with a status code outside the tracked set.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownStatusPolicy {
    /// Count the file size, leave every status counter alone
    #[default]
    Ignore,
    /// Reject the line and stop the stream after a final snapshot
    Fatal,
}

/// Diagnostics settings
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive, `RUST_LOG` takes precedence
    pub level: String,
    /// Directory for the rolling JSON diagnostics file
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.report.cadence, 10);
        assert_eq!(cfg.metrics.unknown_status, UnknownStatusPolicy::Ignore);
        assert_eq!(cfg.logging.level, "warn");
        assert!(cfg.logging.directory.is_none());
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        let file = write_config("");
        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_load_full_file() {
        let file = write_config(
            r#"
[report]
cadence = 25

[metrics]
unknown_status = "fatal"

[logging]
level = "debug"
directory = "/tmp/log-stats"
"#,
        );
        let cfg = Config::load(file.path()).unwrap();

        assert_eq!(cfg.report.cadence, 25);
        assert_eq!(cfg.metrics.unknown_status, UnknownStatusPolicy::Fatal);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.directory, Some(PathBuf::from("/tmp/log-stats")));
    }

    #[test]
    fn test_zero_cadence_is_rejected() {
        let file = write_config("[report]\ncadence = 0\n");
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StatsError>(),
            Some(StatsError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let file = write_config("[report]\ncadense = 5\n");
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::load("/definitely/not/here/log_stats.toml").is_err());
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(Config::load_or_default(None).unwrap(), Config::default());
    }
}
