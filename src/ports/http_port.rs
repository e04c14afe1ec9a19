//! Minimal HTTP transport used by the provider adapters.

use crate::domain::error::StockError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

pub trait HttpPort {
    /// Blocking GET. Transport failures are `Err`; non-2xx statuses are
    /// returned as responses for the caller to interpret.
    fn get(&self, url: &str) -> Result<HttpResponse, StockError>;
}
