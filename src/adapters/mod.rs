//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod file_input_adapter;
pub mod finnhub_adapter;
pub mod http_adapter;
pub mod iex_adapter;
pub mod json_store_adapter;
pub mod provider_support;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
pub mod tiingo_adapter;
pub mod yaml_adapter;
