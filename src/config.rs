//! Optional `.codegraph.toml` settings for the command line tool.
//!
//! ```toml
//! [analysis]
//! max_cycles = 500
//! max_search_steps = 50000
//!
//! [output]
//! format = "markdown"
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::analysis::CycleLimits;
use crate::error::ParseValueError;
use crate::export::ExportFormat;

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".codegraph.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value: {0}")]
    InvalidValue(#[from] ParseValueError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub analysis: AnalysisSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub cycle_limits: CycleLimits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSettings {
    pub format: ExportFormat,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    analysis: Option<RawAnalysis>,
    output: Option<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    max_cycles: Option<usize>,
    max_search_steps: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    format: Option<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Json,
        }
    }
}

impl Config {
    /// Loads `.codegraph.toml` from `dir`, falling back to defaults when the
    /// file does not exist.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml_str(&content)
    }

    /// Parses settings from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let defaults = CycleLimits::default();

        let analysis = match raw.analysis {
            Some(a) => AnalysisSettings {
                cycle_limits: CycleLimits {
                    max_cycles: a.max_cycles.unwrap_or(defaults.max_cycles),
                    max_steps: a.max_search_steps.unwrap_or(defaults.max_steps),
                },
            },
            None => AnalysisSettings::default(),
        };

        let output = match raw.output.and_then(|o| o.format) {
            Some(format) => OutputSettings {
                format: format.parse()?,
            },
            None => OutputSettings::default(),
        };

        Ok(Self { analysis, output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.analysis.cycle_limits, CycleLimits::default());
        assert_eq!(config.output.format, ExportFormat::Json);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[analysis]\nmax_cycles = 25\n\n[output]\nformat = \"MD\"\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.analysis.cycle_limits.max_cycles, 25);
        assert_eq!(
            config.analysis.cycle_limits.max_steps,
            CycleLimits::default().max_steps
        );
        assert_eq!(config.output.format, ExportFormat::Markdown);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str("[analysis]\nmax_search_steps = 10\n").unwrap();
        assert_eq!(config.analysis.cycle_limits.max_steps, 10);
        assert_eq!(config.output, OutputSettings::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            Config::from_toml_str("[analysis]\nmax_cycles = \"many\"\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[output]\nformat = \"yaml\"\n"),
            Err(ConfigError::InvalidValue(_))
        ));
    }
}
