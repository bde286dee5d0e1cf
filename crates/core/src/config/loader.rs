//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::Path;

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist; without one the standard locations are
    /// searched and defaults are used when none is found.
    pub fn load(path: Option<&str>) -> Result<Self> {
        if let Some(p) = path {
            if !Path::new(p).exists() {
                return Err(Error::config_not_found(p));
            }
        }

        let config_path = path.map(String::from).or_else(find_config_file);

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        schema
            .validate()
            .context(format!("Validating {}", config_path.as_deref().unwrap_or("defaults")))?;

        tracing::debug!(path = ?config_path, "Configuration loaded");

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let schema: ConfigSchema = toml::from_str(content)?;
        schema.validate()?;
        Ok(Self { schema, path: None })
    }
}

impl Default for Config {
    /// Defaults only (no file)
    fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<String> {
    let candidates = ["ecoroute.toml", ".ecoroute.toml", ".config/ecoroute.toml"];

    candidates
        .into_iter()
        .find(|candidate| Path::new(candidate).exists())
        .map(String::from)
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &str) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Reading {path}"))
        .with_suggestion("Check that the configuration file is readable")?;

    let schema = toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Parsing {path}"))?;
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.simulation.approach_fraction, 0.08);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::load(Some("/definitely/not/here/ecoroute.toml")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[proximity]\nrange_meters = 150.0\n\n[tray]\nslide_in_ms = 250"
        )
        .unwrap();

        let config = Config::load(file.path().to_str()).unwrap();
        assert_eq!(config.schema.proximity.range_meters, 150.0);
        assert_eq!(config.schema.tray.slide_in_ms, 250);
        assert_eq!(config.schema.tray.slide_out_ms, 300);
        assert_eq!(config.schema.simulation.tick_interval_ms, 2000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = Config::from_toml("[simulation]\napproach_fraction = 2.0");
        assert!(result.is_err());
    }

    #[test]
    fn test_unreadable_path_keeps_io_code() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().to_str()).unwrap_err();
        assert_eq!(err.code.category(), "IO");
        assert!(err.context.as_deref().unwrap().starts_with("Reading"));
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_malformed_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tray\nslide_in_ms = 1").unwrap();

        let err = Config::load(file.path().to_str()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert_eq!(err.exit_code(), crate::error::exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn test_malformed_toml() {
        let err = Config::from_toml("[simulation\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }
}
