//! IEX Cloud company metadata provider.
//!
//! Metadata rarely changes, so a complete stored record is never re-fetched.

use crate::adapters::provider_support::{endpoint_url, get_json};
use crate::domain::error::StockError;
use crate::domain::stock::StockMetadata;
use crate::ports::http_port::HttpPort;
use crate::ports::provider_port::{MetadataProvider, Refresh};
use serde::Deserialize;
use tracing::debug;

pub const PROVIDER: &str = "iex";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyResponse {
    company_name: Option<String>,
    industry: Option<String>,
    issue_type: Option<String>,
}

pub struct IexAdapter<H> {
    http: H,
    base_url: String,
    api_key: String,
}

impl<H: HttpPort> IexAdapter<H> {
    pub fn new(http: H, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn company_url(&self, symbol: &str) -> Result<String, StockError> {
        endpoint_url(
            PROVIDER,
            symbol,
            &self.base_url,
            &["stock", symbol, "company"],
            &[("token", self.api_key.as_str())],
        )
    }
}

impl<H: HttpPort> MetadataProvider for IexAdapter<H> {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn refresh_metadata(
        &self,
        symbol: &str,
        current: Option<&StockMetadata>,
    ) -> Result<Refresh<StockMetadata>, StockError> {
        if current.is_some_and(StockMetadata::is_complete) {
            debug!(symbol, "metadata complete, skipping fetch");
            return Ok(Refresh::Unchanged);
        }

        let company: CompanyResponse =
            get_json(&self.http, PROVIDER, symbol, &self.company_url(symbol)?)?;

        let fetched = StockMetadata {
            symbol: symbol.to_string(),
            company_name: company.company_name.unwrap_or_default().trim().to_string(),
            industry: company.industry.unwrap_or_default().trim().to_string(),
            issue_type: company.issue_type.unwrap_or_default().trim().to_string(),
        };

        if fetched.company_name.is_empty() {
            return Err(StockError::provider(
                PROVIDER,
                symbol,
                "response has no company name",
            ));
        }
        if current == Some(&fetched) {
            return Ok(Refresh::Unchanged);
        }
        Ok(Refresh::Updated(fetched))
    }
}
