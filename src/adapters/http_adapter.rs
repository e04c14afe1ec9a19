//! Blocking `reqwest` transport with bounded retry.

use crate::domain::error::StockError;
use crate::ports::http_port::{HttpPort, HttpResponse};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const BASE_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(4);

/// Delay before retry number `attempt` (0-based): doubles, capped.
pub fn backoff_delay(attempt: u32) -> Duration {
    let scaled = BASE_BACKOFF.saturating_mul(2u32.saturating_pow(attempt));
    scaled.min(MAX_BACKOFF)
}

/// Rate limiting and server-side errors are worth another attempt.
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Strip query parameters, which carry API tokens, before logging a URL.
pub fn redact(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

#[derive(Clone)]
pub struct ReqwestHttpAdapter {
    client: reqwest::blocking::Client,
    max_retries: u32,
}

impl ReqwestHttpAdapter {
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self, StockError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stockcache/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StockError::ConfigInvalid {
                section: "providers".into(),
                key: "timeout_secs".into(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            max_retries,
        })
    }

    fn attempt(&self, url: &str) -> Result<HttpResponse, String> {
        let response = self.client.get(url).send().map_err(|e| e.without_url().to_string())?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| e.without_url().to_string())?;
        Ok(HttpResponse { status, body })
    }
}

impl HttpPort for ReqwestHttpAdapter {
    fn get(&self, url: &str) -> Result<HttpResponse, StockError> {
        let mut attempt = 0;
        loop {
            debug!(url = redact(url), attempt, "GET");
            let result = self.attempt(url);

            let retryable = match &result {
                Ok(response) => is_retryable_status(response.status),
                Err(_) => true,
            };
            if !retryable || attempt >= self.max_retries {
                return result.map_err(|reason| StockError::Provider {
                    provider: "http".into(),
                    symbol: redact(url).to_string(),
                    reason,
                });
            }

            let delay = backoff_delay(attempt);
            warn!(url = redact(url), attempt, ?delay, "request failed, retrying");
            thread::sleep(delay);
            attempt += 1;
        }
    }
}
