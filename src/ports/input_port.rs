//! Run input port: positions, symbol lists and category configuration.

use crate::domain::allocation::{AllocationMap, CategoryMap};
use crate::domain::error::StockError;
use crate::domain::position::Position;

pub trait InputPort {
    fn read_positions(&self) -> Result<Vec<Position>, StockError>;

    fn read_index_trackers(&self) -> Result<Vec<String>, StockError>;

    fn read_watchlist(&self) -> Result<Vec<String>, StockError>;

    fn read_categories(&self) -> Result<CategoryMap, StockError>;

    fn read_allocations(&self) -> Result<AllocationMap, StockError>;
}
