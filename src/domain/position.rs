//! Portfolio holdings read from the positions file.

use chrono::NaiveDate;

/// One lot held in the portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    pub purchase_price: f64,
    pub trade_date: Option<NaiveDate>,
    pub commission: f64,
}

/// Symbols of `positions` in file order, duplicates kept.
pub fn position_symbols(positions: &[Position]) -> Vec<String> {
    positions.iter().map(|p| p.symbol.clone()).collect()
}
