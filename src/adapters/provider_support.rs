//! Helpers shared by the provider adapters.

use crate::domain::error::StockError;
use crate::ports::http_port::HttpPort;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

const MAX_BODY_IN_ERROR: usize = 200;

/// Reads an API key file. A missing, unreadable or blank file is fatal.
pub fn read_api_key<P: AsRef<Path>>(provider: &str, path: P) -> Result<String, StockError> {
    let path = path.as_ref();
    let missing = || StockError::MissingApiKey {
        provider: provider.to_string(),
        path: path.display().to_string(),
    };
    let key = fs::read_to_string(path).map_err(|_| missing())?;
    let key = key.trim();
    if key.is_empty() {
        return Err(missing());
    }
    Ok(key.to_string())
}

/// `base` extended by `segments` and `query`, each percent-encoded.
pub fn endpoint_url(
    provider: &str,
    symbol: &str,
    base: &str,
    segments: &[&str],
    query: &[(&str, &str)],
) -> Result<String, StockError> {
    let invalid = |reason: String| StockError::provider(provider, symbol, reason);
    let mut url = Url::parse(base).map_err(|e| invalid(format!("invalid base URL {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| invalid(format!("base URL {base} cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url.into())
}

/// GET `url` and decode a JSON body, mapping every failure to a
/// recoverable provider error for `symbol`.
pub fn get_json<T: DeserializeOwned>(
    http: &dyn HttpPort,
    provider: &str,
    symbol: &str,
    url: &str,
) -> Result<T, StockError> {
    let response = http.get(url).map_err(|e| match e {
        StockError::Provider { reason, .. } => StockError::provider(provider, symbol, reason),
        other => StockError::provider(provider, symbol, other.to_string()),
    })?;

    if response.status == 404 {
        return Err(StockError::provider(provider, symbol, "unknown symbol (HTTP 404)"));
    }
    if !response.is_success() {
        let body: String = response.body.chars().take(MAX_BODY_IN_ERROR).collect();
        return Err(StockError::provider(
            provider,
            symbol,
            format!("HTTP {}: {}", response.status, body.trim()),
        ));
    }

    serde_json::from_str(&response.body)
        .map_err(|e| StockError::provider(provider, symbol, format!("malformed response: {e}")))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::ports::http_port::HttpResponse;
    use std::cell::RefCell;

    /// Replays canned responses in order and records requested URLs.
    pub struct ScriptedHttp {
        responses: RefCell<Vec<Result<HttpResponse, StockError>>>,
        pub requests: RefCell<Vec<String>>,
    }

    impl ScriptedHttp {
        pub fn new(mut responses: Vec<Result<HttpResponse, StockError>>) -> Self {
            responses.reverse();
            Self {
                responses: RefCell::new(responses),
                requests: RefCell::new(Vec::new()),
            }
        }

        pub fn json(body: &str) -> Self {
            Self::new(vec![Ok(HttpResponse::ok_json(body))])
        }

        pub fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl HttpPort for ScriptedHttp {
        fn get(&self, url: &str) -> Result<HttpResponse, StockError> {
            self.requests.borrow_mut().push(url.to_string());
            self.responses
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Err(StockError::store("no scripted response left")))
        }
    }
}
