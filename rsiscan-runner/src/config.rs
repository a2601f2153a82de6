//! Serializable pipeline configuration.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! reproduces the stock behaviour: the six standard OHLCV columns, `NA` and
//! `-` as placeholders, output under `DATA/CLEAN`, a 14-interval RSI.

use rsiscan_core::data::{
    Cleaner, ColumnSchema, OverwritePolicy, SchemaError, DEFAULT_OUTPUT_DIR, PLACEHOLDERS,
    REQUIRED_COLUMNS,
};
use rsiscan_core::indicators::{Rsi, DEFAULT_PERIOD};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What a failing file does to the rest of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Record the failure and move on to the next file.
    #[default]
    Skip,
    /// Stop at the first failure.
    Abort,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => Err(format!(
                "unknown error policy '{other}' (expected skip or abort)"
            )),
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::Abort => f.write_str("abort"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Column names kept by the Cleaner.
    pub required_columns: Vec<String>,

    /// Values treated as a missing observation.
    pub placeholders: Vec<String>,

    /// Where cleaned files are written.
    pub output_dir: PathBuf,

    /// Intervals averaged by the RSI.
    pub rsi_period: usize,

    pub on_error: ErrorPolicy,

    pub on_existing: OverwritePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            required_columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            placeholders: PLACEHOLDERS.iter().map(|p| p.to_string()).collect(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            rsi_period: DEFAULT_PERIOD,
            on_error: ErrorPolicy::default(),
            on_existing: OverwritePolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rsi_period == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        self.schema()?;
        Ok(())
    }

    /// The immutable column schema this configuration describes.
    pub fn schema(&self) -> Result<ColumnSchema, ConfigError> {
        Ok(ColumnSchema::new(
            self.required_columns.iter().cloned(),
            self.placeholders.iter().cloned(),
        )?)
    }

    pub fn cleaner(&self) -> Result<Cleaner, ConfigError> {
        Ok(Cleaner::new(self.schema()?, &self.output_dir).with_overwrite(self.on_existing))
    }

    pub fn rsi(&self) -> Result<Rsi, ConfigError> {
        if self.rsi_period == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        Ok(Rsi::new(self.rsi_period))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid column set: {0}")]
    Schema(#[from] SchemaError),

    #[error("rsi_period must be at least 1")]
    ZeroPeriod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.output_dir, PathBuf::from("DATA/CLEAN"));
        assert_eq!(config.rsi_period, 14);
        assert_eq!(config.on_error, ErrorPolicy::Skip);
        assert_eq!(config.on_existing, OverwritePolicy::Overwrite);
        assert_eq!(config.schema().unwrap(), ColumnSchema::default());
    }

    #[test]
    fn partial_document_overrides_named_fields() {
        let config = PipelineConfig::from_toml(
            r#"
            output_dir = "out/clean"
            rsi_period = 9
            on_error = "abort"
            on_existing = "error"
            placeholders = ["NA", "-", "N/A"]
            "#,
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out/clean"));
        assert_eq!(config.rsi().unwrap().name(), "rsi_9");
        assert_eq!(config.on_error, ErrorPolicy::Abort);
        assert_eq!(config.on_existing, OverwritePolicy::Error);
        assert!(config.schema().unwrap().is_placeholder("N/A"));
    }

    #[test]
    fn zero_period_is_rejected() {
        let err = PipelineConfig::from_toml("rsi_period = 0").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroPeriod));
    }

    #[test]
    fn bad_column_sets_are_rejected() {
        let short = PipelineConfig::from_toml(r#"required_columns = ["DATE", "CLOSE"]"#);
        assert!(matches!(
            short,
            Err(ConfigError::Schema(SchemaError::WrongWidth { found: 2 }))
        ));

        let dup = PipelineConfig::from_toml(
            r#"required_columns = ["DATE", "OPEN", "HIGH", "LOW", "CLOSE", "CLOSE"]"#,
        );
        assert!(matches!(
            dup,
            Err(ConfigError::Schema(SchemaError::DuplicateColumn(_)))
        ));
    }

    #[test]
    fn unknown_keys_and_values_fail_to_parse() {
        assert!(matches!(
            PipelineConfig::from_toml("rsi_perid = 3"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml(r#"on_error = "retry""#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn toml_roundtrip() {
        let config = PipelineConfig {
            rsi_period: 21,
            on_error: ErrorPolicy::Abort,
            ..PipelineConfig::default()
        };
        let text = config.to_toml().unwrap();
        assert_eq!(PipelineConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = PipelineConfig::from_file(Path::new("/nonexistent/rsiscan.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("rsiscan.toml"));
    }

    #[test]
    fn error_policy_parses() {
        assert_eq!("skip".parse::<ErrorPolicy>(), Ok(ErrorPolicy::Skip));
        assert_eq!("ABORT".parse::<ErrorPolicy>(), Ok(ErrorPolicy::Abort));
        assert!("ignore".parse::<ErrorPolicy>().is_err());
        assert_eq!(ErrorPolicy::Abort.to_string(), "abort");
    }
}
