//! Local record store port.

use crate::domain::error::StockError;
use crate::domain::record::{Category, CategoryRecord, Record};

/// Durable per-(symbol, category) record storage.
///
/// Implementations must replace a record atomically: a failed write leaves
/// the previously stored record intact.
pub trait StorePort {
    /// `Ok(None)` when nothing has been stored for the pair yet.
    fn read(&self, symbol: &str, category: Category) -> Result<Option<Record>, StockError>;

    fn write(&self, symbol: &str, record: &Record) -> Result<(), StockError>;

    /// Symbols with at least one stored record, sorted.
    fn list_symbols(&self) -> Result<Vec<String>, StockError>;
}

/// Typed read; a record stored under the wrong tag is a store error.
pub fn read_typed<R: CategoryRecord>(
    store: &dyn StorePort,
    symbol: &str,
) -> Result<Option<R>, StockError> {
    match store.read(symbol, R::CATEGORY)? {
        None => Ok(None),
        Some(record) => {
            let found = record.category();
            R::from_record(record).map(Some).ok_or_else(|| StockError::Store {
                reason: format!(
                    "expected {} record for {symbol}, found {found}",
                    R::CATEGORY
                ),
            })
        }
    }
}
