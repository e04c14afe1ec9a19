//! Category allocation checks.

use crate::domain::error::StockError;
use std::collections::{BTreeMap, BTreeSet};

pub const ALLOCATION_TOTAL: f64 = 100.0;
const ALLOCATION_TOLERANCE: f64 = 1e-6;

/// Symbol → category name.
pub type CategoryMap = BTreeMap<String, String>;
/// Category name → allocation percentage.
pub type AllocationMap = BTreeMap<String, f64>;

/// Allocations must add up to exactly 100.
pub fn check_allocations(allocations: &AllocationMap) -> Result<(), StockError> {
    let total: f64 = allocations.values().sum();
    if (total - ALLOCATION_TOTAL).abs() > ALLOCATION_TOLERANCE {
        tracing::error!(total, "category allocations do not add up to 100");
        return Err(StockError::AllocationTotal { total });
    }
    Ok(())
}

/// Categories referenced by `categories` that have no allocation entry.
pub fn unallocated_categories(categories: &CategoryMap, allocations: &AllocationMap) -> Vec<String> {
    categories
        .values()
        .filter(|c| !allocations.contains_key(c.as_str()))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
