//! JSON file store: one file per (symbol, category).
//!
//! Records live at `{dir}/{SYMBOL}_{category}.json`. Writes go to a
//! temporary file in the same directory which is then renamed over the
//! target, so a crash mid-write leaves the previous record in place.

use crate::domain::error::StockError;
use crate::domain::record::{Category, Record};
use crate::ports::store_port::StorePort;
use std::collections::BTreeSet;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct JsonStoreAdapter {
    dir: PathBuf,
}

impl JsonStoreAdapter {
    /// Opens the store, creating `dir` if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StockError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            StockError::store(format!("failed to create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    fn record_path(&self, symbol: &str, category: Category) -> Result<PathBuf, StockError> {
        if symbol.is_empty()
            || symbol.starts_with('.')
            || symbol.contains(['/', '\\'])
        {
            return Err(StockError::store(format!(
                "symbol '{symbol}' cannot be used as a file name"
            )));
        }
        Ok(self.dir.join(format!("{}_{}.json", symbol, category.as_str())))
    }
}

impl StorePort for JsonStoreAdapter {
    fn read(&self, symbol: &str, category: Category) -> Result<Option<Record>, StockError> {
        let path = self.record_path(symbol, category)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StockError::store(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let record: Record = serde_json::from_str(&content).map_err(|e| {
            StockError::store(format!("failed to parse {}: {}", path.display(), e))
        })?;

        if record.category() != category {
            return Err(StockError::store(format!(
                "{} holds a {} record",
                path.display(),
                record.category()
            )));
        }
        Ok(Some(record))
    }

    fn write(&self, symbol: &str, record: &Record) -> Result<(), StockError> {
        let path = self.record_path(symbol, record.category())?;

        let tmp = NamedTempFile::new_in(&self.dir).map_err(|e| {
            StockError::store(format!(
                "failed to create temp file in {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut writer = BufWriter::new(tmp);
        serde_json::to_writer(&mut writer, record)
            .map_err(|e| StockError::store(format!("failed to encode {symbol}: {e}")))?;
        writer
            .flush()
            .map_err(|e| StockError::store(format!("failed to write {symbol}: {e}")))?;
        let tmp = writer
            .into_inner()
            .map_err(|e| StockError::store(format!("failed to write {symbol}: {}", e.error())))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| StockError::store(format!("failed to sync {symbol}: {e}")))?;

        tmp.persist(&path).map_err(|e| {
            StockError::store(format!("failed to replace {}: {}", path.display(), e.error))
        })?;
        Ok(())
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            StockError::store(format!("failed to read directory {}: {}", self.dir.display(), e))
        })?;

        let mut symbols = BTreeSet::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| StockError::store(format!("directory entry error: {}", e)))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();

            let Some(stem) = name.strip_suffix(".json") else {
                continue;
            };
            if let Some((symbol, category)) = stem.rsplit_once('_') {
                if Category::parse(category).is_some() {
                    symbols.insert(symbol.to_string());
                }
            }
        }

        Ok(symbols.into_iter().collect())
    }
}
