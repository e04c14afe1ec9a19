//! Per-symbol stock records and the aggregate [`Stock`] view.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Static-ish company attributes for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMetadata {
    pub symbol: String,
    pub company_name: String,
    pub industry: String,
    pub issue_type: String,
}

impl StockMetadata {
    /// A record is complete once every descriptive field is populated.
    pub fn is_complete(&self) -> bool {
        !self.company_name.trim().is_empty()
            && !self.industry.trim().is_empty()
            && !self.issue_type.trim().is_empty()
    }
}

/// A point-in-time quote snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub previous_close: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLatest {
    pub symbol: String,
    pub quote: Quote,
    pub fetched_at: DateTime<Utc>,
}

impl StockLatest {
    /// True when `candidate` carries a strictly newer quote than `self`.
    pub fn is_superseded_by(&self, candidate: &StockLatest) -> bool {
        candidate.quote.timestamp > self.quote.timestamp
    }
}

/// One daily bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayQuote {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub adj_close: f64,
}

/// Daily bars for one symbol, strictly ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHistorical {
    pub symbol: String,
    pub day_quotes: Vec<DayQuote>,
}

impl StockHistorical {
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            day_quotes: Vec::new(),
        }
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.day_quotes.last().map(|q| q.date)
    }

    /// Append the bars dated strictly after the last stored bar.
    ///
    /// Incoming bars may arrive unsorted or with repeated dates; they are
    /// ordered and deduplicated (first occurrence wins) before appending.
    /// Returns the number of bars appended.
    pub fn append_newer(&mut self, bars: Vec<DayQuote>) -> usize {
        let last = self.last_date();
        let mut fresh: Vec<DayQuote> = bars
            .into_iter()
            .filter(|bar| last.is_none_or(|d| bar.date > d))
            .collect();
        fresh.sort_by_key(|bar| bar.date);
        fresh.dedup_by_key(|bar| bar.date);

        let appended = fresh.len();
        self.day_quotes.extend(fresh);
        appended
    }

    pub fn is_strictly_ascending(&self) -> bool {
        self.day_quotes.windows(2).all(|w| w[0].date < w[1].date)
    }
}

/// Output-only aggregate of a symbol's three records. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stock {
    pub symbol: String,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub issue_type: Option<String>,
    pub latest_quote: Option<Quote>,
    pub day_quotes: Vec<DayQuote>,
}

impl Stock {
    pub fn assemble(
        symbol: &str,
        metadata: Option<StockMetadata>,
        latest: Option<StockLatest>,
        historical: Option<StockHistorical>,
    ) -> Self {
        let (company_name, industry, issue_type) = match metadata {
            Some(m) => (Some(m.company_name), Some(m.industry), Some(m.issue_type)),
            None => (None, None, None),
        };
        Self {
            symbol: symbol.to_string(),
            company_name,
            industry,
            issue_type,
            latest_quote: latest.map(|l| l.quote),
            day_quotes: historical.map(|h| h.day_quotes).unwrap_or_default(),
        }
    }
}
