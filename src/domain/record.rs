//! Data categories and the tagged record the store reads and writes.

use crate::domain::stock::{StockHistorical, StockLatest, StockMetadata};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Metadata,
    Latest,
    Historical,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Metadata, Category::Latest, Category::Historical];

    /// Stable storage name, used in file names and table keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Metadata => "metadata",
            Category::Latest => "latest",
            Category::Historical => "historical",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", content = "data", rename_all = "lowercase")]
pub enum Record {
    Metadata(StockMetadata),
    Latest(StockLatest),
    Historical(StockHistorical),
}

impl Record {
    pub fn category(&self) -> Category {
        match self {
            Record::Metadata(_) => Category::Metadata,
            Record::Latest(_) => Category::Latest,
            Record::Historical(_) => Category::Historical,
        }
    }
}

/// Typed view over one [`Record`] variant.
pub trait CategoryRecord: Sized + Clone {
    const CATEGORY: Category;

    fn from_record(record: Record) -> Option<Self>;

    fn into_record(self) -> Record;
}

impl CategoryRecord for StockMetadata {
    const CATEGORY: Category = Category::Metadata;

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Metadata(r) => Some(r),
            _ => None,
        }
    }

    fn into_record(self) -> Record {
        Record::Metadata(self)
    }
}

impl CategoryRecord for StockLatest {
    const CATEGORY: Category = Category::Latest;

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Latest(r) => Some(r),
            _ => None,
        }
    }

    fn into_record(self) -> Record {
        Record::Latest(self)
    }
}

impl CategoryRecord for StockHistorical {
    const CATEGORY: Category = Category::Historical;

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Historical(r) => Some(r),
            _ => None,
        }
    }

    fn into_record(self) -> Record {
        Record::Historical(self)
    }
}
