//! SQLite record store.
//!
//! One row per (symbol, category) holding the JSON-encoded record. Rows are
//! replaced inside a transaction, so a failed write keeps the old row.

use crate::domain::error::StockError;
use crate::domain::record::{Category, Record};
use crate::ports::store_port::StorePort;
use chrono::Utc;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::path::Path;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StockError> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| StockError::store(e.to_string()))?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, StockError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| StockError::store(e.to_string()))?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn initialize_schema(&self) -> Result<(), StockError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| StockError::store(e.to_string()))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS records (
                symbol TEXT NOT NULL,
                category TEXT NOT NULL,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (symbol, category)
            );",
        )
        .map_err(|e: rusqlite::Error| StockError::store(e.to_string()))?;

        Ok(())
    }
}

impl StorePort for SqliteAdapter {
    fn read(&self, symbol: &str, category: Category) -> Result<Option<Record>, StockError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| StockError::store(e.to_string()))?;

        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM records WHERE symbol = ?1 AND category = ?2",
                params![symbol, category.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e: rusqlite::Error| StockError::store(e.to_string()))?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        let record: Record = serde_json::from_str(&payload).map_err(|e| {
            StockError::store(format!("failed to parse {category} record for {symbol}: {e}"))
        })?;
        if record.category() != category {
            return Err(StockError::store(format!(
                "{category} row for {symbol} holds a {} record",
                record.category()
            )));
        }
        Ok(Some(record))
    }

    fn write(&self, symbol: &str, record: &Record) -> Result<(), StockError> {
        let payload = serde_json::to_string(record)
            .map_err(|e| StockError::store(format!("failed to encode {symbol}: {e}")))?;

        let mut conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| StockError::store(e.to_string()))?;

        let tx = conn
            .transaction()
            .map_err(|e: rusqlite::Error| StockError::store(e.to_string()))?;

        tx.execute(
            "INSERT OR REPLACE INTO records (symbol, category, payload, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                symbol,
                record.category().as_str(),
                payload,
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(|e: rusqlite::Error| StockError::store(e.to_string()))?;

        tx.commit()
            .map_err(|e: rusqlite::Error| StockError::store(e.to_string()))?;

        Ok(())
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| StockError::store(e.to_string()))?;

        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM records ORDER BY symbol")
            .map_err(|e: rusqlite::Error| StockError::store(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e: rusqlite::Error| StockError::store(e.to_string()))?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(|e: rusqlite::Error| StockError::store(e.to_string()))?);
        }

        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::CategoryRecord;
    use crate::domain::stock::{Quote, StockLatest, StockMetadata};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn latest(symbol: &str, price: f64) -> StockLatest {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap();
        StockLatest {
            symbol: symbol.into(),
            quote: Quote {
                price,
                change: 1.0,
                change_percent: 0.5,
                high: price + 1.0,
                low: price - 1.0,
                open: price,
                previous_close: price - 1.0,
                timestamp: ts,
            },
            fetched_at: ts,
        }
    }

    #[test]
    fn in_memory_initialization() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        assert!(adapter.list_symbols().unwrap().is_empty());
    }

    #[test]
    fn sqlite_read_missing_returns_none() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        assert_eq!(adapter.read("VTI", Category::Latest).unwrap(), None);
    }

    #[test]
    fn sqlite_write_then_read() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        let record = latest("VTI", 250.0).into_record();
        adapter.write("VTI", &record).unwrap();

        assert_eq!(adapter.read("VTI", Category::Latest).unwrap(), Some(record));
        assert_eq!(adapter.read("VTI", Category::Metadata).unwrap(), None);
    }

    #[test]
    fn sqlite_write_replaces_row() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter
            .write("VTI", &latest("VTI", 250.0).into_record())
            .unwrap();
        adapter
            .write("VTI", &latest("VTI", 255.0).into_record())
            .unwrap();

        let stored = adapter.read("VTI", Category::Latest).unwrap().unwrap();
        assert_eq!(StockLatest::from_record(stored).unwrap().quote.price, 255.0);
    }

    #[test]
    fn sqlite_list_symbols() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter
            .write("VTI", &latest("VTI", 250.0).into_record())
            .unwrap();
        adapter
            .write(
                "BND",
                &StockMetadata {
                    symbol: "BND".into(),
                    company_name: "Vanguard Total Bond Market ETF".into(),
                    industry: "Investment Trusts/Mutual Funds".into(),
                    issue_type: "et".into(),
                }
                .into_record(),
            )
            .unwrap();
        adapter
            .write("BND", &latest("BND", 72.0).into_record())
            .unwrap();

        assert_eq!(adapter.list_symbols().unwrap(), vec!["BND", "VTI"]);
    }

    #[test]
    fn sqlite_file_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stocks.db");
        {
            let adapter = SqliteAdapter::open(&path).unwrap();
            adapter
                .write("VTI", &latest("VTI", 250.0).into_record())
                .unwrap();
        }
        let adapter = SqliteAdapter::open(&path).unwrap();
        assert!(adapter.read("VTI", Category::Latest).unwrap().is_some());
    }
}
