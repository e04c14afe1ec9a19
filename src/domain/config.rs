//! Explicit run configuration, built once from a [`ConfigPort`].

use crate::domain::config_validation::{parse_date, validate_manager_config};
use crate::domain::error::StockError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;

pub const DEFAULT_PORTFOLIO_NAME: &str = "main";
pub const DEFAULT_PORTFOLIO_EXT: &str = ".csv";
pub const DEFAULT_IEX_BASE_URL: &str = "https://cloud.iexapis.com/stable";
pub const DEFAULT_FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";
pub const DEFAULT_TIINGO_BASE_URL: &str = "https://api.tiingo.com";
pub const DEFAULT_HISTORY_START: &str = "2000-01-01";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_FILE_LOG_LEVEL: &str = "debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Json,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub dir: Option<PathBuf>,
    pub sqlite_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiKeyPaths {
    pub iex: PathBuf,
    pub finnhub: PathBuf,
    pub tiingo: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub iex_base_url: String,
    pub finnhub_base_url: String,
    pub tiingo_base_url: String,
    /// First date requested when no history is stored for a symbol.
    pub history_start: NaiveDate,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    /// Console level; `RUST_LOG` replaces it when set.
    pub level: String,
    /// Rotated log files are written here when set.
    pub dir: Option<PathBuf>,
    pub file_level: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    pub portfolio_dir: PathBuf,
    pub portfolio_name: String,
    pub portfolio_ext: String,
    pub index_trackers_file: PathBuf,
    pub watchlist_file: PathBuf,
    pub categories_file: PathBuf,
    pub allocations_file: PathBuf,
    pub api_keys: ApiKeyPaths,
    pub store: StoreSettings,
    pub providers: ProviderSettings,
    pub logging: LogSettings,
}

impl ManagerConfig {
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, StockError> {
        validate_manager_config(config)?;

        let history_start = config
            .get_string("providers", "history_start")
            .unwrap_or_else(|| DEFAULT_HISTORY_START.to_string());

        let backend = match config.get_string("store", "backend").as_deref().map(str::trim) {
            Some("sqlite") => StoreBackend::Sqlite,
            _ => StoreBackend::Json,
        };

        Ok(Self {
            portfolio_dir: path(config, "portfolio", "dir")?,
            portfolio_name: config
                .get_string("portfolio", "name")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_PORTFOLIO_NAME.to_string()),
            portfolio_ext: config
                .get_string("portfolio", "ext")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_PORTFOLIO_EXT.to_string()),
            index_trackers_file: path(config, "inputs", "index_trackers")?,
            watchlist_file: path(config, "inputs", "watchlist")?,
            categories_file: path(config, "inputs", "categories")?,
            allocations_file: path(config, "inputs", "allocations")?,
            api_keys: ApiKeyPaths {
                iex: path(config, "api_keys", "iex")?,
                finnhub: path(config, "api_keys", "finnhub")?,
                tiingo: path(config, "api_keys", "tiingo")?,
            },
            store: StoreSettings {
                backend,
                dir: optional_path(config, "store", "dir"),
                sqlite_path: optional_path(config, "store", "sqlite_path"),
            },
            providers: ProviderSettings {
                iex_base_url: url(config, "iex_base_url", DEFAULT_IEX_BASE_URL),
                finnhub_base_url: url(config, "finnhub_base_url", DEFAULT_FINNHUB_BASE_URL),
                tiingo_base_url: url(config, "tiingo_base_url", DEFAULT_TIINGO_BASE_URL),
                history_start: parse_date(&history_start, "history_start")?,
                timeout_secs: config.get_int("providers", "timeout_secs", 10) as u64,
                max_retries: config.get_int("providers", "max_retries", 2) as u32,
            },
            logging: LogSettings {
                level: level(config, "level", DEFAULT_LOG_LEVEL),
                dir: optional_path(config, "logging", "dir"),
                file_level: level(config, "file_level", DEFAULT_FILE_LOG_LEVEL),
            },
        })
    }

    /// `{portfolio_dir}/{portfolio_name}{portfolio_ext}`
    pub fn portfolio_file(&self) -> PathBuf {
        self.portfolio_dir
            .join(format!("{}{}", self.portfolio_name, self.portfolio_ext))
    }

    pub fn with_portfolio_name(mut self, name: &str) -> Self {
        self.portfolio_name = name.to_string();
        self
    }
}

fn path(config: &dyn ConfigPort, section: &str, key: &str) -> Result<PathBuf, StockError> {
    optional_path(config, section, key).ok_or_else(|| StockError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    })
}

fn optional_path(config: &dyn ConfigPort, section: &str, key: &str) -> Option<PathBuf> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

fn level(config: &dyn ConfigPort, key: &str, default: &str) -> String {
    config
        .get_string("logging", key)
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn url(config: &dyn ConfigPort, key: &str, default: &str) -> String {
    config
        .get_string("providers", key)
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    const FULL: &str = r#"
[portfolio]
dir = /data/inputs
name = retirement

[inputs]
index_trackers = /data/inputs/index_trackers.yml
watchlist = /data/inputs/watchlist.yml
categories = /data/inputs/stock_categories.yml
allocations = /data/inputs/category_allocation.yml

[api_keys]
iex = /keys/iex
finnhub = /keys/finnhub
tiingo = /keys/tiingo

[store]
backend = sqlite
sqlite_path = /data/stocks.db

[providers]
tiingo_base_url = http://localhost:9000/
history_start = 2015-06-01
timeout_secs = 30
max_retries = 4

[logging]
level = DEBUG
dir = /var/log/stockcache
file_level = trace
"#;

    #[test]
    fn builds_full_config() {
        let adapter = FileConfigAdapter::from_string(FULL).unwrap();
        let config = ManagerConfig::from_port(&adapter).unwrap();

        assert_eq!(config.portfolio_name, "retirement");
        assert_eq!(
            config.portfolio_file(),
            PathBuf::from("/data/inputs/retirement.csv")
        );
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.sqlite_path, Some(PathBuf::from("/data/stocks.db")));
        assert_eq!(config.api_keys.finnhub, PathBuf::from("/keys/finnhub"));
        assert_eq!(config.providers.tiingo_base_url, "http://localhost:9000");
        assert_eq!(config.providers.iex_base_url, DEFAULT_IEX_BASE_URL);
        assert_eq!(
            config.providers.history_start,
            NaiveDate::from_ymd_opt(2015, 6, 1).unwrap()
        );
        assert_eq!(config.providers.timeout_secs, 30);
        assert_eq!(config.providers.max_retries, 4);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.dir, Some(PathBuf::from("/var/log/stockcache")));
        assert_eq!(config.logging.file_level, "trace");
    }

    #[test]
    fn applies_defaults() {
        let minimal = FULL
            .replace("name = retirement\n", "")
            .replace("backend = sqlite\nsqlite_path = /data/stocks.db\n", "dir = /data/store\n")
            .replace("history_start = 2015-06-01\n", "")
            .replace("timeout_secs = 30\nmax_retries = 4\n", "")
            .replace("level = DEBUG\n", "")
            .replace("dir = /var/log/stockcache\nfile_level = trace\n", "");
        let adapter = FileConfigAdapter::from_string(&minimal).unwrap();
        let config = ManagerConfig::from_port(&adapter).unwrap();

        assert_eq!(config.portfolio_name, DEFAULT_PORTFOLIO_NAME);
        assert_eq!(config.store.backend, StoreBackend::Json);
        assert_eq!(config.store.dir, Some(PathBuf::from("/data/store")));
        assert_eq!(
            config.providers.history_start,
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
        );
        assert_eq!(config.providers.timeout_secs, 10);
        assert_eq!(config.providers.max_retries, 2);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.dir, None);
        assert_eq!(config.logging.file_level, "debug");
    }

    #[test]
    fn portfolio_override() {
        let adapter = FileConfigAdapter::from_string(FULL).unwrap();
        let config = ManagerConfig::from_port(&adapter)
            .unwrap()
            .with_portfolio_name("taxable");
        assert_eq!(config.portfolio_file(), PathBuf::from("/data/inputs/taxable.csv"));
    }
}
