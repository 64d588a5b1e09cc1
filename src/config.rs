use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::aggregate::DEFAULT_TOP_N;
use crate::data::SourceEncoding;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "sales-dashboard.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Dashboard settings. Every field is optional in the file.
///
/// ```json
/// { "source": "superstore.csv", "encoding": "latin1", "show_charts": true, "top_n": 10 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Sales table opened at startup.
    pub source: PathBuf,
    /// Character encoding of CSV sources.
    pub encoding: SourceEncoding,
    /// Initial state of the "Show Visual Analysis" toggle.
    pub show_charts: bool,
    /// Rows in the top-products table.
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("superstore.csv"),
            encoding: SourceEncoding::default(),
            show_charts: true,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl DashboardConfig {
    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read `path` if it exists; fall back to defaults (with a warning) when
    /// it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config: {e}");
                Self::default()
            }
        }
    }

    /// Apply command-line overrides: an optional first positional argument
    /// replaces the source path.
    pub fn with_args<I: IntoIterator<Item = String>>(mut self, args: I) -> Self {
        if let Some(source) = args.into_iter().next() {
            self.source = PathBuf::from(source);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "encoding": "utf8", "top_n": 5 }"#).unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.encoding, SourceEncoding::Utf8);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.source, PathBuf::from("superstore.csv"));
        assert!(config.show_charts);
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "top_n": "ten" }"#).unwrap();

        assert!(matches!(DashboardConfig::from_file(&path), Err(ConfigError::Parse { .. })));
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "sorce": "typo.csv" }"#).unwrap();
        assert!(DashboardConfig::from_file(&path).is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_or_default(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.encoding, SourceEncoding::Latin1);
    }

    #[test]
    fn first_argument_overrides_source() {
        let config = DashboardConfig::default().with_args(vec!["orders.parquet".to_string()]);
        assert_eq!(config.source, PathBuf::from("orders.parquet"));
        let unchanged = DashboardConfig::default().with_args(Vec::new());
        assert_eq!(unchanged.source, PathBuf::from("superstore.csv"));
    }
}
