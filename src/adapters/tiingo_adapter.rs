//! Tiingo end-of-day prices provider.

use crate::adapters::provider_support::{endpoint_url, get_json};
use crate::domain::error::StockError;
use crate::domain::stock::DayQuote;
use crate::ports::http_port::HttpPort;
use crate::ports::provider_port::HistoricalProvider;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::debug;

pub const PROVIDER: &str = "tiingo";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    adj_close: f64,
}

pub struct TiingoAdapter<H> {
    http: H,
    base_url: String,
    api_key: String,
    history_start: NaiveDate,
    end_date: Option<NaiveDate>,
}

impl<H: HttpPort> TiingoAdapter<H> {
    pub fn new(
        http: H,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        history_start: NaiveDate,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            history_start,
            end_date: None,
        }
    }

    /// Pin the end of the request window instead of using today's date.
    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    fn end_date(&self) -> NaiveDate {
        self.end_date.unwrap_or_else(|| Local::now().date_naive())
    }

    fn prices_url(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<String, StockError> {
        let start = start.format(DATE_FORMAT).to_string();
        let end = end.format(DATE_FORMAT).to_string();
        endpoint_url(
            PROVIDER,
            symbol,
            &self.base_url,
            &["tiingo", "daily", symbol, "prices"],
            &[
                ("startDate", start.as_str()),
                ("endDate", end.as_str()),
                ("token", self.api_key.as_str()),
            ],
        )
    }
}

fn to_day_quote(symbol: &str, row: PriceRow) -> Result<DayQuote, StockError> {
    // Tiingo dates are midnight timestamps such as 2024-05-01T00:00:00.000Z.
    let day = row.date.get(..10).unwrap_or(&row.date);
    let date = NaiveDate::parse_from_str(day, DATE_FORMAT).map_err(|e| {
        StockError::provider(PROVIDER, symbol, format!("bad bar date '{}': {e}", row.date))
    })?;
    Ok(DayQuote {
        date,
        open: row.open,
        high: row.high,
        low: row.low,
        close: row.close,
        volume: row.volume.round() as i64,
        adj_close: row.adj_close,
    })
}

impl<H: HttpPort> HistoricalProvider for TiingoAdapter<H> {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn fetch_daily(
        &self,
        symbol: &str,
        since: Option<NaiveDate>,
    ) -> Result<Vec<DayQuote>, StockError> {
        let start = match since {
            Some(last) => match last.succ_opt() {
                Some(next) => next,
                None => return Ok(Vec::new()),
            },
            None => self.history_start,
        };
        let end = self.end_date();
        if start > end {
            debug!(symbol, %start, %end, "history already current, no request");
            return Ok(Vec::new());
        }

        let rows: Vec<PriceRow> =
            get_json(&self.http, PROVIDER, symbol, &self.prices_url(symbol, start, end)?)?;

        let mut bars = rows
            .into_iter()
            .map(|row| to_day_quote(symbol, row))
            .collect::<Result<Vec<_>, _>>()?;
        bars.retain(|bar| since.is_none_or(|last| bar.date > last));
        debug!(symbol, %start, %end, bars = bars.len(), "fetched daily bars");
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::provider_support::testing::ScriptedHttp;

    const PRICES: &str = r#"[
        {"date":"2024-05-01T00:00:00.000Z","close":251.3,"high":252.0,"low":249.1,"open":250.0,
         "volume":3100000,"adjClose":250.9,"adjHigh":251.6,"adjLow":248.7,"adjOpen":249.6,
         "adjVolume":3100000,"divCash":0.0,"splitFactor":1.0},
        {"date":"2024-05-02T00:00:00.000Z","close":253.0,"high":253.5,"low":250.8,"open":251.5,
         "volume":2800000,"adjClose":252.6,"adjHigh":253.1,"adjLow":250.4,"adjOpen":251.1,
         "adjVolume":2800000,"divCash":0.0,"splitFactor":1.0}
    ]"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn adapter(http: ScriptedHttp) -> TiingoAdapter<ScriptedHttp> {
        TiingoAdapter::new(http, "https://tiingo.test", "KEY", date(2000, 1, 1))
            .with_end_date(date(2024, 5, 3))
    }

    #[test]
    fn cold_start_requests_full_history() {
        let tiingo = adapter(ScriptedHttp::json(PRICES));

        let bars = tiingo.fetch_daily("VTI", None).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, date(2024, 5, 1));
        assert_eq!(bars[0].volume, 3_100_000);
        assert_eq!(bars[1].adj_close, 252.6);
        assert_eq!(
            tiingo.http.requests.borrow()[0],
            "https://tiingo.test/tiingo/daily/VTI/prices?startDate=2000-01-01&endDate=2024-05-03&token=KEY"
        );
    }

    #[test]
    fn incremental_request_starts_after_last_bar() {
        let tiingo = adapter(ScriptedHttp::json(PRICES));

        let bars = tiingo.fetch_daily("VTI", Some(date(2024, 5, 1))).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, date(2024, 5, 2));
        assert!(tiingo.http.requests.borrow()[0].contains("startDate=2024-05-02"));
    }

    #[test]
    fn symbol_is_escaped_as_one_path_segment() {
        let tiingo = adapter(ScriptedHttp::json("[]"));

        tiingo.fetch_daily("BRK/B", Some(date(2024, 5, 1))).unwrap();

        assert_eq!(
            tiingo.http.requests.borrow()[0],
            "https://tiingo.test/tiingo/daily/BRK%2FB/prices?startDate=2024-05-02&endDate=2024-05-03&token=KEY"
        );
    }

    #[test]
    fn current_history_makes_no_request() {
        let tiingo = adapter(ScriptedHttp::new(Vec::new()));

        let bars = tiingo.fetch_daily("VTI", Some(date(2024, 5, 3))).unwrap();

        assert!(bars.is_empty());
        assert_eq!(tiingo.http.request_count(), 0);
    }

    #[test]
    fn empty_window_is_not_an_error() {
        let tiingo = adapter(ScriptedHttp::json("[]"));
        assert!(tiingo.fetch_daily("VTI", Some(date(2024, 5, 2))).unwrap().is_empty());
    }

    #[test]
    fn bad_date_is_provider_error() {
        let body = r#"[{"date":"May 1","close":1,"high":1,"low":1,"open":1,"volume":1,"adjClose":1}]"#;
        let tiingo = adapter(ScriptedHttp::json(body));

        let err = tiingo.fetch_daily("VTI", None).unwrap_err();

        assert!(matches!(err, StockError::Provider { provider, .. } if provider == PROVIDER));
    }
}
