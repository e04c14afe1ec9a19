//! YAML readers for symbol lists, category membership and allocations.

use crate::domain::allocation::{AllocationMap, CategoryMap};
use crate::domain::error::StockError;
use crate::domain::universe::normalize_symbol;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

fn read_file(path: &Path) -> Result<String, StockError> {
    fs::read_to_string(path).map_err(|e| StockError::Input {
        file: path.display().to_string(),
        reason: format!("failed to read: {}", e),
    })
}

fn yaml_error(file: &str, e: serde_yaml::Error) -> StockError {
    StockError::Input {
        file: file.to_string(),
        reason: format!("YAML parse error: {}", e),
    }
}

/// Top-level sequence of symbols. Duplicates are dropped, order kept.
pub fn parse_stocks(content: &str, file: &str) -> Result<Vec<String>, StockError> {
    let raw: Option<Vec<String>> =
        serde_yaml::from_str(content).map_err(|e| yaml_error(file, e))?;

    let mut seen = HashSet::new();
    let mut symbols = Vec::new();
    for entry in raw.unwrap_or_default() {
        let symbol = normalize_symbol(&entry).ok_or_else(|| StockError::Input {
            file: file.to_string(),
            reason: "empty symbol".into(),
        })?;
        if seen.insert(symbol.clone()) {
            symbols.push(symbol);
        }
    }
    Ok(symbols)
}

/// Category → symbols, inverted to symbol → category.
pub fn parse_categories(content: &str, file: &str) -> Result<CategoryMap, StockError> {
    let raw: Option<BTreeMap<String, Vec<String>>> =
        serde_yaml::from_str(content).map_err(|e| yaml_error(file, e))?;

    let mut categories = CategoryMap::new();
    for (category, members) in raw.unwrap_or_default() {
        for member in members {
            let Some(symbol) = normalize_symbol(&member) else {
                continue;
            };
            if let Some(existing) = categories.insert(symbol.clone(), category.clone()) {
                if existing != category {
                    return Err(StockError::Input {
                        file: file.to_string(),
                        reason: format!(
                            "{symbol} listed under both '{existing}' and '{category}'"
                        ),
                    });
                }
            }
        }
    }
    Ok(categories)
}

/// Category → percentage.
pub fn parse_allocations(content: &str, file: &str) -> Result<AllocationMap, StockError> {
    let raw: Option<AllocationMap> =
        serde_yaml::from_str(content).map_err(|e| yaml_error(file, e))?;
    let allocations = raw.unwrap_or_default();

    if let Some((category, value)) = allocations.iter().find(|(_, v)| **v < 0.0 || !v.is_finite()) {
        return Err(StockError::Input {
            file: file.to_string(),
            reason: format!("invalid allocation {value} for '{category}'"),
        });
    }
    Ok(allocations)
}

pub fn read_stocks_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>, StockError> {
    let path = path.as_ref();
    parse_stocks(&read_file(path)?, &path.display().to_string())
}

pub fn read_category_file<P: AsRef<Path>>(path: P) -> Result<CategoryMap, StockError> {
    let path = path.as_ref();
    parse_categories(&read_file(path)?, &path.display().to_string())
}

pub fn read_allocation_file<P: AsRef<Path>>(path: P) -> Result<AllocationMap, StockError> {
    let path = path.as_ref();
    parse_allocations(&read_file(path)?, &path.display().to_string())
}
