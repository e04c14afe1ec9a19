//! Incremental update engine.
//!
//! For each (symbol, category) the engine reads the stored record, asks the
//! category's provider for a refresh and writes back only when the provider
//! reports new data. Provider and store failures are contained to the pair
//! they occurred on: the previously stored record stays in effect for the
//! run and the remaining categories and symbols proceed.

use crate::domain::error::StockError;
use crate::domain::record::{Category, CategoryRecord};
use crate::domain::stock::{Stock, StockHistorical, StockLatest, StockMetadata};
use crate::ports::provider_port::{HistoricalProvider, LatestProvider, MetadataProvider, Refresh};
use crate::ports::store_port::{read_typed, StorePort};
use tracing::{debug, error, warn};

/// What happened to one (symbol, category) pair during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryOutcome {
    Unchanged,
    Updated,
    /// The provider failed; the stored record (if any) was kept.
    FetchFailed(String),
    /// New data was fetched but could not be persisted.
    WriteFailed(String),
}

impl CategoryOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            CategoryOutcome::FetchFailed(_) | CategoryOutcome::WriteFailed(_)
        )
    }
}

/// The three records of one symbol after an update pass.
#[derive(Debug, Clone)]
pub struct SymbolUpdate {
    pub symbol: String,
    pub metadata: Option<StockMetadata>,
    pub latest: Option<StockLatest>,
    pub historical: Option<StockHistorical>,
    pub metadata_outcome: CategoryOutcome,
    pub latest_outcome: CategoryOutcome,
    pub historical_outcome: CategoryOutcome,
}

impl SymbolUpdate {
    pub fn outcome(&self, category: Category) -> &CategoryOutcome {
        match category {
            Category::Metadata => &self.metadata_outcome,
            Category::Latest => &self.latest_outcome,
            Category::Historical => &self.historical_outcome,
        }
    }

    /// Number of categories persisted by this update.
    pub fn writes(&self) -> usize {
        Category::ALL
            .into_iter()
            .filter(|c| *self.outcome(*c) == CategoryOutcome::Updated)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        Category::ALL
            .into_iter()
            .any(|c| self.outcome(c).is_failure())
    }

    pub fn to_stock(&self) -> Stock {
        Stock::assemble(
            &self.symbol,
            self.metadata.clone(),
            self.latest.clone(),
            self.historical.clone(),
        )
    }
}

pub struct UpdateEngine<'a> {
    store: &'a dyn StorePort,
    metadata: &'a dyn MetadataProvider,
    latest: &'a dyn LatestProvider,
    historical: &'a dyn HistoricalProvider,
}

impl<'a> UpdateEngine<'a> {
    pub fn new(
        store: &'a dyn StorePort,
        metadata: &'a dyn MetadataProvider,
        latest: &'a dyn LatestProvider,
        historical: &'a dyn HistoricalProvider,
    ) -> Self {
        Self {
            store,
            metadata,
            latest,
            historical,
        }
    }

    /// Refresh all three categories for `symbol`. Never fails as a whole.
    pub fn update_symbol(&self, symbol: &str) -> SymbolUpdate {
        let (metadata, metadata_outcome) = self.update_metadata(symbol);
        let (latest, latest_outcome) = self.update_latest(symbol);
        let (historical, historical_outcome) = self.update_historical(symbol);

        SymbolUpdate {
            symbol: symbol.to_string(),
            metadata,
            latest,
            historical,
            metadata_outcome,
            latest_outcome,
            historical_outcome,
        }
    }

    pub fn update_metadata(&self, symbol: &str) -> (Option<StockMetadata>, CategoryOutcome) {
        let current = self.load::<StockMetadata>(symbol);
        let refreshed = self.metadata.refresh_metadata(symbol, current.as_ref());
        self.apply(symbol, self.metadata.name(), current, refreshed)
    }

    pub fn update_latest(&self, symbol: &str) -> (Option<StockLatest>, CategoryOutcome) {
        let current = self.load::<StockLatest>(symbol);
        let refreshed = self.latest.refresh_latest(symbol, current.as_ref());
        self.apply(symbol, self.latest.name(), current, refreshed)
    }

    /// Requests only bars after the last stored date and appends them.
    pub fn update_historical(&self, symbol: &str) -> (Option<StockHistorical>, CategoryOutcome) {
        let current = self.load::<StockHistorical>(symbol);
        let since = current.as_ref().and_then(StockHistorical::last_date);
        debug!(symbol, ?since, "requesting daily bars");

        match self.historical.fetch_daily(symbol, since) {
            Err(e) => self.apply(symbol, self.historical.name(), current, Err(e)),
            Ok(bars) => {
                let had_record = current.is_some();
                let mut series = current.unwrap_or_else(|| StockHistorical::empty(symbol));
                let appended = series.append_newer(bars);
                if appended == 0 {
                    debug!(symbol, "no new daily bars");
                    return (had_record.then_some(series), CategoryOutcome::Unchanged);
                }
                debug!(symbol, appended, "appending daily bars");
                self.persist(symbol, series)
            }
        }
    }

    /// Stored record, or `None` on a cold start or unreadable record.
    fn load<R: CategoryRecord>(&self, symbol: &str) -> Option<R> {
        match read_typed::<R>(self.store, symbol) {
            Ok(record) => record,
            Err(e) => {
                warn!(symbol, category = %R::CATEGORY, error = %e, "stored record unreadable, treating as absent");
                None
            }
        }
    }

    fn apply<R: CategoryRecord>(
        &self,
        symbol: &str,
        provider: &str,
        current: Option<R>,
        refreshed: Result<Refresh<R>, StockError>,
    ) -> (Option<R>, CategoryOutcome) {
        match refreshed {
            Ok(Refresh::Unchanged) => {
                debug!(symbol, category = %R::CATEGORY, provider, "up to date");
                (current, CategoryOutcome::Unchanged)
            }
            Ok(Refresh::Updated(record)) => self.persist(symbol, record),
            Err(e) => {
                warn!(symbol, category = %R::CATEGORY, provider, error = %e, "fetch failed, keeping stored record");
                (current, CategoryOutcome::FetchFailed(e.to_string()))
            }
        }
    }

    fn persist<R: CategoryRecord>(&self, symbol: &str, record: R) -> (Option<R>, CategoryOutcome) {
        let record = record.into_record();
        let outcome = match self.store.write(symbol, &record) {
            Ok(()) => {
                debug!(symbol, category = %R::CATEGORY, "record written");
                CategoryOutcome::Updated
            }
            Err(e) => {
                error!(symbol, category = %R::CATEGORY, error = %e, "failed to persist record");
                CategoryOutcome::WriteFailed(e.to_string())
            }
        };
        (R::from_record(record), outcome)
    }
}

/// Counts of category outcomes across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl UpdateSummary {
    pub fn from_updates(updates: &[SymbolUpdate]) -> Self {
        let mut summary = Self::default();
        for update in updates {
            for category in Category::ALL {
                match update.outcome(category) {
                    CategoryOutcome::Updated => summary.updated += 1,
                    CategoryOutcome::Unchanged => summary.unchanged += 1,
                    _ => summary.failed += 1,
                }
            }
        }
        summary
    }
}
