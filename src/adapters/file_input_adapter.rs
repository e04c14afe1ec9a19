//! [`InputPort`] backed by the positions CSV and the YAML input files.

use crate::adapters::{csv_adapter, yaml_adapter};
use crate::domain::allocation::{AllocationMap, CategoryMap};
use crate::domain::config::ManagerConfig;
use crate::domain::error::StockError;
use crate::domain::position::Position;
use crate::ports::input_port::InputPort;
use std::path::PathBuf;
use tracing::info;

pub struct FileInputAdapter {
    portfolio_file: PathBuf,
    index_trackers_file: PathBuf,
    watchlist_file: PathBuf,
    categories_file: PathBuf,
    allocations_file: PathBuf,
}

impl FileInputAdapter {
    pub fn from_config(config: &ManagerConfig) -> Self {
        Self {
            portfolio_file: config.portfolio_file(),
            index_trackers_file: config.index_trackers_file.clone(),
            watchlist_file: config.watchlist_file.clone(),
            categories_file: config.categories_file.clone(),
            allocations_file: config.allocations_file.clone(),
        }
    }
}

impl InputPort for FileInputAdapter {
    fn read_positions(&self) -> Result<Vec<Position>, StockError> {
        info!(file = %self.portfolio_file.display(), "reading portfolio");
        csv_adapter::read_positions(&self.portfolio_file)
    }

    fn read_index_trackers(&self) -> Result<Vec<String>, StockError> {
        yaml_adapter::read_stocks_file(&self.index_trackers_file)
    }

    fn read_watchlist(&self) -> Result<Vec<String>, StockError> {
        yaml_adapter::read_stocks_file(&self.watchlist_file)
    }

    fn read_categories(&self) -> Result<CategoryMap, StockError> {
        yaml_adapter::read_category_file(&self.categories_file)
    }

    fn read_allocations(&self) -> Result<AllocationMap, StockError> {
        yaml_adapter::read_allocation_file(&self.allocations_file)
    }
}
