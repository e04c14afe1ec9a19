//! Domain error types.

/// Top-level error type for stockcache.
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("category allocations add up to {total}, expected 100")]
    AllocationTotal { total: f64 },

    #[error("missing API key for {provider} at {path}")]
    MissingApiKey { provider: String, path: String },

    #[error("input error in {file}: {reason}")]
    Input { file: String, reason: String },

    #[error("{provider} fetch failed for {symbol}: {reason}")]
    Provider {
        provider: String,
        symbol: String,
        reason: String,
    },

    #[error("store error: {reason}")]
    Store { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockError {
    pub(crate) fn store(reason: impl Into<String>) -> Self {
        StockError::Store {
            reason: reason.into(),
        }
    }

    pub(crate) fn provider(
        provider: &str,
        symbol: &str,
        reason: impl Into<String>,
    ) -> Self {
        StockError::Provider {
            provider: provider.to_string(),
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&StockError> for std::process::ExitCode {
    fn from(err: &StockError) -> Self {
        let code: u8 = match err {
            StockError::Io(_) => 1,
            StockError::ConfigParse { .. }
            | StockError::ConfigMissing { .. }
            | StockError::ConfigInvalid { .. }
            | StockError::AllocationTotal { .. }
            | StockError::MissingApiKey { .. }
            | StockError::Input { .. } => 2,
            StockError::Store { .. } => 3,
            StockError::Provider { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
