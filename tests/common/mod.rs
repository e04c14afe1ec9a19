#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use stockcache::domain::allocation::{AllocationMap, CategoryMap};
use stockcache::domain::error::StockError;
use stockcache::domain::position::Position;
use stockcache::domain::record::{Category, Record};
use stockcache::domain::stock::{DayQuote, Quote, StockLatest, StockMetadata};
use stockcache::ports::input_port::InputPort;
use stockcache::ports::provider_port::{
    HistoricalProvider, LatestProvider, MetadataProvider, Refresh,
};
use stockcache::ports::store_port::StorePort;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};

/// In-memory store that counts successful writes.
#[derive(Default)]
pub struct MockStore {
    pub records: RefCell<HashMap<(String, Category), Record>>,
    pub writes: Cell<usize>,
    pub failing_writes: HashSet<String>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_writes(mut self, symbol: &str) -> Self {
        self.failing_writes.insert(symbol.to_string());
        self
    }

    pub fn seed(&self, record: Record) {
        self.records
            .borrow_mut()
            .insert((record_symbol(&record).to_string(), record.category()), record);
    }

    pub fn get(&self, symbol: &str, category: Category) -> Option<Record> {
        self.records
            .borrow()
            .get(&(symbol.to_string(), category))
            .cloned()
    }

    pub fn snapshot(&self) -> HashMap<(String, Category), Record> {
        self.records.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl StorePort for MockStore {
    fn read(&self, symbol: &str, category: Category) -> Result<Option<Record>, StockError> {
        Ok(self.get(symbol, category))
    }

    fn write(&self, symbol: &str, record: &Record) -> Result<(), StockError> {
        if self.failing_writes.contains(symbol) {
            return Err(StockError::Store {
                reason: format!("disk full writing {symbol}"),
            });
        }
        self.records
            .borrow_mut()
            .insert((symbol.to_string(), record.category()), record.clone());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockError> {
        let mut symbols: Vec<String> = self
            .records
            .borrow()
            .keys()
            .map(|(s, _)| s.clone())
            .collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }
}

/// Serves a fixed company record per symbol; skips complete stored records.
#[derive(Default)]
pub struct MockMetadata {
    pub data: HashMap<String, StockMetadata>,
    pub errors: HashMap<String, String>,
    pub calls: Cell<usize>,
}

impl MockMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_company(mut self, symbol: &str) -> Self {
        self.data.insert(symbol.to_string(), make_metadata(symbol));
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MetadataProvider for MockMetadata {
    fn name(&self) -> &str {
        "mock-metadata"
    }

    fn refresh_metadata(
        &self,
        symbol: &str,
        current: Option<&StockMetadata>,
    ) -> Result<Refresh<StockMetadata>, StockError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(provider_error("mock-metadata", symbol, reason));
        }
        if current.is_some_and(StockMetadata::is_complete) {
            return Ok(Refresh::Unchanged);
        }
        match self.data.get(symbol) {
            Some(found) if current != Some(found) => Ok(Refresh::Updated(found.clone())),
            Some(_) => Ok(Refresh::Unchanged),
            None => Err(provider_error("mock-metadata", symbol, "unknown symbol")),
        }
    }
}

/// Serves one quote per symbol; reports it only when strictly newer.
#[derive(Default)]
pub struct MockLatest {
    pub quotes: RefCell<HashMap<String, StockLatest>>,
    pub errors: HashMap<String, String>,
    pub calls: Cell<usize>,
}

impl MockLatest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(self, symbol: &str, timestamp: DateTime<Utc>, price: f64) -> Self {
        self.set_quote(symbol, timestamp, price);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn set_quote(&self, symbol: &str, timestamp: DateTime<Utc>, price: f64) {
        self.quotes
            .borrow_mut()
            .insert(symbol.to_string(), make_latest(symbol, timestamp, price));
    }
}

impl LatestProvider for MockLatest {
    fn name(&self) -> &str {
        "mock-latest"
    }

    fn refresh_latest(
        &self,
        symbol: &str,
        current: Option<&StockLatest>,
    ) -> Result<Refresh<StockLatest>, StockError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(provider_error("mock-latest", symbol, reason));
        }
        let Some(fetched) = self.quotes.borrow().get(symbol).cloned() else {
            return Err(provider_error("mock-latest", symbol, "unknown symbol"));
        };
        match current {
            Some(stored) if !stored.is_superseded_by(&fetched) => Ok(Refresh::Unchanged),
            _ => Ok(Refresh::Updated(fetched)),
        }
    }
}

/// Serves bars after `since` and records every requested window.
#[derive(Default)]
pub struct MockHistory {
    pub bars: RefCell<HashMap<String, Vec<DayQuote>>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, Option<NaiveDate>)>>,
}

impl MockHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(self, symbol: &str, bars: Vec<DayQuote>) -> Self {
        self.set_bars(symbol, bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn set_bars(&self, symbol: &str, bars: Vec<DayQuote>) {
        self.bars.borrow_mut().insert(symbol.to_string(), bars);
    }

    pub fn call_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_since(&self, symbol: &str) -> Option<Option<NaiveDate>> {
        self.requests
            .borrow()
            .iter()
            .rev()
            .find(|(s, _)| s == symbol)
            .map(|(_, since)| *since)
    }
}

impl HistoricalProvider for MockHistory {
    fn name(&self) -> &str {
        "mock-history"
    }

    fn fetch_daily(
        &self,
        symbol: &str,
        since: Option<NaiveDate>,
    ) -> Result<Vec<DayQuote>, StockError> {
        self.requests.borrow_mut().push((symbol.to_string(), since));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(provider_error("mock-history", symbol, reason));
        }
        Ok(self
            .bars
            .borrow()
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| since.is_none_or(|last| b.date > last))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Fixed run inputs.
#[derive(Default)]
pub struct MockInputPort {
    pub positions: Vec<Position>,
    pub index_trackers: Vec<String>,
    pub watchlist: Vec<String>,
    pub categories: CategoryMap,
    pub allocations: AllocationMap,
}

impl MockInputPort {
    /// Everything allocated to a single category.
    pub fn new() -> Self {
        Self {
            allocations: BTreeMap::from([("Equity".to_string(), 100.0)]),
            ..Self::default()
        }
    }

    pub fn with_positions(mut self, symbols: &[&str]) -> Self {
        self.positions = symbols.iter().map(|s| make_position(s, 10.0)).collect();
        self
    }

    pub fn with_trackers(mut self, symbols: &[&str]) -> Self {
        self.index_trackers = strings(symbols);
        self
    }

    pub fn with_watchlist(mut self, symbols: &[&str]) -> Self {
        self.watchlist = strings(symbols);
        self
    }

    pub fn with_allocations(mut self, allocations: &[(&str, f64)]) -> Self {
        self.allocations = allocations
            .iter()
            .map(|(c, p)| (c.to_string(), *p))
            .collect();
        self
    }

    pub fn with_category(mut self, symbol: &str, category: &str) -> Self {
        self.categories
            .insert(symbol.to_string(), category.to_string());
        self
    }
}

impl InputPort for MockInputPort {
    fn read_positions(&self) -> Result<Vec<Position>, StockError> {
        Ok(self.positions.clone())
    }

    fn read_index_trackers(&self) -> Result<Vec<String>, StockError> {
        Ok(self.index_trackers.clone())
    }

    fn read_watchlist(&self) -> Result<Vec<String>, StockError> {
        Ok(self.watchlist.clone())
    }

    fn read_categories(&self) -> Result<CategoryMap, StockError> {
        Ok(self.categories.clone())
    }

    fn read_allocations(&self) -> Result<AllocationMap, StockError> {
        Ok(self.allocations.clone())
    }
}

pub fn record_symbol(record: &Record) -> &str {
    match record {
        Record::Metadata(r) => &r.symbol,
        Record::Latest(r) => &r.symbol,
        Record::Historical(r) => &r.symbol,
    }
}

pub fn provider_error(provider: &str, symbol: &str, reason: &str) -> StockError {
    StockError::Provider {
        provider: provider.to_string(),
        symbol: symbol.to_string(),
        reason: reason.to_string(),
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn make_position(symbol: &str, quantity: f64) -> Position {
    Position {
        symbol: symbol.to_string(),
        quantity,
        purchase_price: 100.0,
        trade_date: None,
        commission: 0.0,
    }
}

pub fn make_metadata(symbol: &str) -> StockMetadata {
    StockMetadata {
        symbol: symbol.to_string(),
        company_name: format!("{symbol} Inc"),
        industry: "Investment Trusts/Mutual Funds".to_string(),
        issue_type: "et".to_string(),
    }
}

pub fn make_latest(symbol: &str, timestamp: DateTime<Utc>, price: f64) -> StockLatest {
    StockLatest {
        symbol: symbol.to_string(),
        quote: Quote {
            price,
            change: 0.0,
            change_percent: 0.0,
            high: price,
            low: price,
            open: price,
            previous_close: price,
            timestamp,
        },
        fetched_at: timestamp,
    }
}

pub fn make_bar(day: NaiveDate, close: f64) -> DayQuote {
    DayQuote {
        date: day,
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000_000,
        adj_close: close,
    }
}

/// `count` consecutive calendar-day bars starting at `start`.
pub fn generate_bars(start: NaiveDate, count: usize, base: f64) -> Vec<DayQuote> {
    (0..count)
        .map(|i| make_bar(start + Duration::days(i as i64), base + i as f64))
        .collect()
}
