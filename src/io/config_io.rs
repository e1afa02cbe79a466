use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid date_format {format:?} in {path}")]
    InvalidDateFormat { path: PathBuf, format: String },
}

/// Read and parse a config file. Missing keys take their defaults.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    if !config.display.date_format_is_valid() {
        return Err(ConfigError::InvalidDateFormat {
            path: path.to_path_buf(),
            format: config.display.date_format,
        });
    }
    Ok(config)
}

/// Load the config at `path`, or the defaults when no path was given.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => read_config(path),
        None => Ok(Config::default()),
    }
}
