use crate::error::{DeckError, Result};
use crate::store::{ListQuery, DEFAULT_LIST_LIMIT, DEFAULT_LIST_SORT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_BASE_URL: &str = "http://localhost:8080/tables";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DEBOUNCE_MS: u64 = 300;

pub const ENV_BASE_URL: &str = "APPDECK_BASE_URL";
pub const ENV_LIST_LIMIT: &str = "APPDECK_LIST_LIMIT";
pub const ENV_TIMEOUT_SECS: &str = "APPDECK_TIMEOUT_SECS";

/// Settable keys, in display order.
pub const KEYS: [&str; 5] = [
    "base_url",
    "list_limit",
    "list_sort",
    "timeout_secs",
    "debounce_ms",
];

/// Configuration for appdeck, stored in `<config dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeckConfig {
    /// Root of the table API, e.g. `https://example.com/tables`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    #[serde(default = "default_list_sort")]
    pub list_sort: String,

    /// Per-request HTTP timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Quiet period before interactive search re-filters
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_list_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

fn default_list_sort() -> String {
    DEFAULT_LIST_SORT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            list_limit: default_list_limit(),
            list_sort: default_list_sort(),
            timeout_secs: default_timeout_secs(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl DeckConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: DeckConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        fs::create_dir_all(config_dir)?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// Applies `APPDECK_*` environment overrides on top of the loaded values.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        for (name, key) in [
            (ENV_BASE_URL, "base_url"),
            (ENV_LIST_LIMIT, "list_limit"),
            (ENV_TIMEOUT_SECS, "timeout_secs"),
        ] {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                self.set(key, &value)
                    .map_err(|e| DeckError::Config(format!("{}: {}", name, e)))?;
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "base_url" => Some(self.base_url.clone()),
            "list_limit" => Some(self.list_limit.to_string()),
            "list_sort" => Some(self.list_sort.clone()),
            "timeout_secs" => Some(self.timeout_secs.to_string()),
            "debounce_ms" => Some(self.debounce_ms.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "base_url" => {
                url::Url::parse(value)
                    .map_err(|e| DeckError::Config(format!("Invalid base_url '{}': {}", value, e)))?;
                self.base_url = value.trim_end_matches('/').to_string();
            }
            "list_limit" => self.list_limit = parse_positive(key, value)? as usize,
            "list_sort" => {
                if value.is_empty() {
                    return Err(DeckError::Config("list_sort cannot be empty".to_string()));
                }
                self.list_sort = value.to_string();
            }
            "timeout_secs" => self.timeout_secs = parse_positive(key, value)?,
            "debounce_ms" => {
                self.debounce_ms = value.parse().map_err(|_| {
                    DeckError::Config(format!("debounce_ms must be a number, got '{}'", value))
                })?
            }
            other => {
                return Err(DeckError::Config(format!(
                    "Unknown config key: {} (expected one of: {})",
                    other,
                    KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    pub fn list_query(&self) -> ListQuery {
        ListQuery {
            limit: self.list_limit,
            sort: self.list_sort.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(DeckError::Config(format!(
            "{} must be a positive number, got '{}'",
            key, value
        ))),
    }
}
