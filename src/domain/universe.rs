//! Symbol universe resolution and output partitioning.
//!
//! The universe is the deduplicated union of position, index-tracker and
//! watchlist symbols in first-seen order. After a run the aggregate stocks
//! are split into non-exclusive buckets by membership in each source list.

use crate::domain::stock::Stock;
use std::collections::HashSet;

/// Upper-cased, trimmed symbol; `None` for blank input.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Universe {
    pub symbols: Vec<String>,
}

impl Universe {
    /// Union of the given lists, first occurrence wins.
    pub fn from_sources(sources: &[&[String]]) -> Self {
        let mut seen = HashSet::new();
        let mut symbols = Vec::new();

        for source in sources {
            for symbol in source.iter() {
                if seen.insert(symbol.as_str()) {
                    symbols.push(symbol.clone());
                }
            }
        }

        Self { symbols }
    }

    pub fn count(&self) -> usize {
        self.symbols.len()
    }
}

/// Stocks grouped by the list(s) that brought them into the universe.
#[derive(Debug, Clone, Default)]
pub struct Partitions {
    pub portfolio: Vec<Stock>,
    pub index_trackers: Vec<Stock>,
    pub watchlist: Vec<Stock>,
}

impl Partitions {
    pub fn split(
        stocks: &[Stock],
        position_symbols: &[String],
        tracker_symbols: &[String],
        watchlist_symbols: &[String],
    ) -> Self {
        let positions: HashSet<&str> = position_symbols.iter().map(String::as_str).collect();
        let trackers: HashSet<&str> = tracker_symbols.iter().map(String::as_str).collect();
        let watchlist: HashSet<&str> = watchlist_symbols.iter().map(String::as_str).collect();

        let mut parts = Partitions::default();
        for stock in stocks {
            let symbol = stock.symbol.as_str();
            if trackers.contains(symbol) {
                parts.index_trackers.push(stock.clone());
            }
            if watchlist.contains(symbol) {
                parts.watchlist.push(stock.clone());
            }
            if positions.contains(symbol) {
                parts.portfolio.push(stock.clone());
            }
        }
        parts
    }
}
