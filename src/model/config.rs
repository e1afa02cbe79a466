use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::task::DEFAULT_DATE_FORMAT;

/// Undo stack size when the config does not set one
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

/// Category tree root label when the config does not set one
pub const DEFAULT_ROOT_LABEL: &str = "root";

/// Configuration read from an optional TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of entries kept on the undo stack
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            limit: default_history_limit(),
        }
    }
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Label printed for the category tree root
    #[serde(default = "default_root_label")]
    pub root_label: String,
    /// strftime format for due dates in listings
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            root_label: default_root_label(),
            date_format: default_date_format(),
        }
    }
}

impl DisplayConfig {
    /// Whether `date_format` is a strftime string chrono can render
    pub fn date_format_is_valid(&self) -> bool {
        is_valid_date_format(&self.date_format)
    }
}

/// Whether `fmt` parses as a strftime format with no unknown specifiers
pub fn is_valid_date_format(fmt: &str) -> bool {
    !StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error))
}

fn default_root_label() -> String {
    DEFAULT_ROOT_LABEL.into()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.into()
}
