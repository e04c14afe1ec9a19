//! Provider client ports, one per data category.

use crate::domain::error::StockError;
use crate::domain::stock::{DayQuote, StockLatest, StockMetadata};
use chrono::NaiveDate;

/// Result of asking a provider to refresh a stored record.
#[derive(Debug, Clone, PartialEq)]
pub enum Refresh<R> {
    /// The stored record is still current; nothing to write.
    Unchanged,
    Updated(R),
}

/// Metadata source. Decides for itself whether `current` is stale.
pub trait MetadataProvider {
    fn name(&self) -> &str;

    fn refresh_metadata(
        &self,
        symbol: &str,
        current: Option<&StockMetadata>,
    ) -> Result<Refresh<StockMetadata>, StockError>;
}

/// Latest-quote source. Must never report an older quote as `Updated`.
pub trait LatestProvider {
    fn name(&self) -> &str;

    fn refresh_latest(
        &self,
        symbol: &str,
        current: Option<&StockLatest>,
    ) -> Result<Refresh<StockLatest>, StockError>;
}

/// Daily bar source.
pub trait HistoricalProvider {
    fn name(&self) -> &str;

    /// Bars dated strictly after `since`; the full available history when
    /// `since` is `None`.
    fn fetch_daily(
        &self,
        symbol: &str,
        since: Option<NaiveDate>,
    ) -> Result<Vec<DayQuote>, StockError>;
}
