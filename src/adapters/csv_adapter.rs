//! Portfolio positions CSV reader (Yahoo Finance portfolio export).
//!
//! Columns are located by header name. `Symbol` and `Quantity` are required;
//! `Purchase Price`, `Trade Date` (YYYYMMDD) and `Commission` are optional.
//! Rows with a blank quantity are watch-only entries and are skipped.

use crate::domain::error::StockError;
use crate::domain::position::Position;
use crate::domain::universe::normalize_symbol;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

struct Columns {
    symbol: usize,
    quantity: usize,
    purchase_price: Option<usize>,
    trade_date: Option<usize>,
    commission: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord, file: &str) -> Result<Self, StockError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| StockError::Input {
                file: file.to_string(),
                reason: format!("missing {name} column"),
            })
        };
        Ok(Self {
            symbol: require("Symbol")?,
            quantity: require("Quantity")?,
            purchase_price: find("Purchase Price"),
            trade_date: find("Trade Date"),
            commission: find("Commission"),
        })
    }
}

pub fn read_positions<P: AsRef<Path>>(path: P) -> Result<Vec<Position>, StockError> {
    let path = path.as_ref();
    let file = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| StockError::Input {
        file: file.clone(),
        reason: format!("failed to read: {}", e),
    })?;
    parse_positions(&content, &file)
}

pub fn parse_positions(content: &str, file: &str) -> Result<Vec<Position>, StockError> {
    let input_error = |reason: String| StockError::Input {
        file: file.to_string(),
        reason,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers = rdr
        .headers()
        .map_err(|e| input_error(format!("CSV header error: {}", e)))?
        .clone();
    let columns = Columns::locate(&headers, file)?;

    let mut positions = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let line = index + 2;
        let record = result.map_err(|e| input_error(format!("CSV parse error: {}", e)))?;

        let Some(symbol) = record.get(columns.symbol).and_then(normalize_symbol) else {
            continue;
        };

        let Some(quantity) = parse_number(&record, Some(columns.quantity), "Quantity", line)
            .map_err(&input_error)?
        else {
            continue;
        };

        let purchase_price = parse_number(&record, columns.purchase_price, "Purchase Price", line)
            .map_err(&input_error)?
            .unwrap_or(0.0);
        let commission = parse_number(&record, columns.commission, "Commission", line)
            .map_err(&input_error)?
            .unwrap_or(0.0);
        let trade_date = match field(&record, columns.trade_date) {
            None => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y%m%d").map_err(|e| {
                input_error(format!("line {line}: invalid Trade Date '{raw}': {e}"))
            })?),
        };

        positions.push(Position {
            symbol,
            quantity,
            purchase_price,
            trade_date,
            commission,
        });
    }

    Ok(positions)
}

fn field(record: &csv::StringRecord, column: Option<usize>) -> Option<&str> {
    column
        .and_then(|c| record.get(c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_number(
    record: &csv::StringRecord,
    column: Option<usize>,
    name: &str,
    line: usize,
) -> Result<Option<f64>, String> {
    match field(record, column) {
        None => Ok(None),
        Some(raw) => raw
            .replace(',', "")
            .parse::<f64>()
            .map(Some)
            .map_err(|e| format!("line {line}: invalid {name} '{raw}': {e}")),
    }
}
