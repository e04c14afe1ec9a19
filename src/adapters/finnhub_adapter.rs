//! Finnhub latest-quote provider.
//!
//! The quote is fetched every run; it only replaces the stored one when its
//! quote timestamp is strictly newer.

use crate::adapters::provider_support::{endpoint_url, get_json};
use crate::domain::error::StockError;
use crate::domain::stock::{Quote, StockLatest};
use crate::ports::http_port::HttpPort;
use crate::ports::provider_port::{LatestProvider, Refresh};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

pub const PROVIDER: &str = "finnhub";

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    c: f64,
    d: Option<f64>,
    dp: Option<f64>,
    h: f64,
    l: f64,
    o: f64,
    pc: f64,
    t: i64,
}

pub struct FinnhubAdapter<H> {
    http: H,
    base_url: String,
    api_key: String,
}

impl<H: HttpPort> FinnhubAdapter<H> {
    pub fn new(http: H, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn quote_url(&self, symbol: &str) -> Result<String, StockError> {
        endpoint_url(
            PROVIDER,
            symbol,
            &self.base_url,
            &["quote"],
            &[("symbol", symbol), ("token", self.api_key.as_str())],
        )
    }
}

fn to_quote(symbol: &str, raw: QuoteResponse) -> Result<Quote, StockError> {
    // Finnhub answers unknown symbols with an all-zero quote.
    if raw.c == 0.0 && raw.t == 0 {
        return Err(StockError::provider(PROVIDER, symbol, "unknown symbol (empty quote)"));
    }
    let timestamp = DateTime::<Utc>::from_timestamp(raw.t, 0).ok_or_else(|| {
        StockError::provider(PROVIDER, symbol, format!("invalid quote timestamp {}", raw.t))
    })?;

    Ok(Quote {
        price: raw.c,
        change: raw.d.unwrap_or(raw.c - raw.pc),
        change_percent: raw.dp.unwrap_or_default(),
        high: raw.h,
        low: raw.l,
        open: raw.o,
        previous_close: raw.pc,
        timestamp,
    })
}

impl<H: HttpPort> LatestProvider for FinnhubAdapter<H> {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn refresh_latest(
        &self,
        symbol: &str,
        current: Option<&StockLatest>,
    ) -> Result<Refresh<StockLatest>, StockError> {
        let raw: QuoteResponse = get_json(&self.http, PROVIDER, symbol, &self.quote_url(symbol)?)?;
        let fetched = StockLatest {
            symbol: symbol.to_string(),
            quote: to_quote(symbol, raw)?,
            fetched_at: Utc::now(),
        };

        match current {
            Some(stored) if !stored.is_superseded_by(&fetched) => {
                debug!(symbol, quote_time = %stored.quote.timestamp, "quote not newer than stored");
                Ok(Refresh::Unchanged)
            }
            _ => Ok(Refresh::Updated(fetched)),
        }
    }
}
