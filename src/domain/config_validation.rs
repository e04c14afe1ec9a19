//! Configuration validation.
//!
//! Validates every config field before any input file is read or any
//! provider is constructed.

use crate::domain::error::StockError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn validate_manager_config(config: &dyn ConfigPort) -> Result<(), StockError> {
    require(config, "portfolio", "dir")?;
    for key in ["index_trackers", "watchlist", "categories", "allocations"] {
        require(config, "inputs", key)?;
    }
    for key in ["iex", "finnhub", "tiingo"] {
        require(config, "api_keys", key)?;
    }
    validate_store(config)?;
    validate_history_start(config)?;
    validate_timeout(config)?;
    validate_retries(config)?;
    validate_log_level(config, "level")?;
    validate_log_level(config, "file_level")?;
    Ok(())
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, StockError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(StockError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_store(config: &dyn ConfigPort) -> Result<(), StockError> {
    let backend = config
        .get_string("store", "backend")
        .unwrap_or_else(|| "json".to_string());
    match backend.trim() {
        "json" => require(config, "store", "dir").map(|_| ()),
        "sqlite" => require(config, "store", "sqlite_path").map(|_| ()),
        other => Err(StockError::ConfigInvalid {
            section: "store".to_string(),
            key: "backend".to_string(),
            reason: format!("unknown backend '{other}', expected json or sqlite"),
        }),
    }
}

fn validate_history_start(config: &dyn ConfigPort) -> Result<(), StockError> {
    if let Some(value) = config.get_string("providers", "history_start") {
        parse_date(&value, "history_start")?;
    }
    Ok(())
}

pub(crate) fn parse_date(value: &str, field: &str) -> Result<NaiveDate, StockError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| StockError::ConfigInvalid {
        section: "providers".to_string(),
        key: field.to_string(),
        reason: format!("invalid {} format, expected YYYY-MM-DD", field),
    })
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), StockError> {
    let value = config.get_int("providers", "timeout_secs", 10);
    if value <= 0 {
        return Err(StockError::ConfigInvalid {
            section: "providers".to_string(),
            key: "timeout_secs".to_string(),
            reason: "timeout_secs must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_retries(config: &dyn ConfigPort) -> Result<(), StockError> {
    let value = config.get_int("providers", "max_retries", 2);
    if !(0..=10).contains(&value) {
        return Err(StockError::ConfigInvalid {
            section: "providers".to_string(),
            key: "max_retries".to_string(),
            reason: "max_retries must be between 0 and 10".to_string(),
        });
    }
    Ok(())
}

fn validate_log_level(config: &dyn ConfigPort, key: &str) -> Result<(), StockError> {
    if let Some(level) = config.get_string("logging", key) {
        let level = level.trim().to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(StockError::ConfigInvalid {
                section: "logging".to_string(),
                key: key.to_string(),
                reason: format!("expected one of {}", LOG_LEVELS.join(", ")),
            });
        }
    }
    Ok(())
}
