//! Run orchestration: inputs → universe → update pass → partitioned output.

use crate::domain::allocation::{check_allocations, unallocated_categories, AllocationMap, CategoryMap};
use crate::domain::error::StockError;
use crate::domain::position::{position_symbols, Position};
use crate::domain::stock::Stock;
use crate::domain::universe::{Partitions, Universe};
use crate::domain::update::{SymbolUpdate, UpdateEngine, UpdateSummary};
use crate::ports::input_port::InputPort;
use tracing::{info, warn};

/// Everything read from the input files, already validated.
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub positions: Vec<Position>,
    pub index_trackers: Vec<String>,
    pub watchlist: Vec<String>,
    pub categories: CategoryMap,
    pub allocations: AllocationMap,
}

impl RunInputs {
    /// Reads every input and checks the allocation precondition. Any failure
    /// here is fatal for the run.
    pub fn load(input: &dyn InputPort) -> Result<Self, StockError> {
        let positions = input.read_positions()?;
        let index_trackers = input.read_index_trackers()?;
        let watchlist = input.read_watchlist()?;
        let categories = input.read_categories()?;
        let allocations = input.read_allocations()?;

        check_allocations(&allocations)?;
        for category in unallocated_categories(&categories, &allocations) {
            warn!(category = %category, "category has no allocation");
        }

        info!(
            positions = positions.len(),
            index_trackers = index_trackers.len(),
            watchlist = watchlist.len(),
            "inputs loaded"
        );

        Ok(Self {
            positions,
            index_trackers,
            watchlist,
            categories,
            allocations,
        })
    }

    pub fn position_symbols(&self) -> Vec<String> {
        position_symbols(&self.positions)
    }

    pub fn universe(&self) -> Universe {
        let positions = self.position_symbols();
        Universe::from_sources(&[
            positions.as_slice(),
            self.index_trackers.as_slice(),
            self.watchlist.as_slice(),
        ])
    }
}

/// Result of one full run. Rebuilt from scratch every run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub universe: Universe,
    pub positions: Vec<Position>,
    pub categories: CategoryMap,
    pub allocations: AllocationMap,
    pub stocks: Vec<Stock>,
    pub partitions: Partitions,
    pub updates: Vec<SymbolUpdate>,
    pub summary: UpdateSummary,
}

impl RunReport {
    pub fn portfolio_stocks(&self) -> &[Stock] {
        &self.partitions.portfolio
    }

    pub fn index_tracker_stocks(&self) -> &[Stock] {
        &self.partitions.index_trackers
    }

    pub fn watchlist_stocks(&self) -> &[Stock] {
        &self.partitions.watchlist
    }
}

pub struct StockDataManager<'a> {
    input: &'a dyn InputPort,
    engine: UpdateEngine<'a>,
}

impl<'a> StockDataManager<'a> {
    pub fn new(input: &'a dyn InputPort, engine: UpdateEngine<'a>) -> Self {
        Self { input, engine }
    }

    /// Full run. Only input/configuration problems are returned as errors;
    /// per-symbol failures are recorded in [`RunReport::updates`].
    pub fn run(&self) -> Result<RunReport, StockError> {
        let inputs = RunInputs::load(self.input)?;
        let universe = inputs.universe();
        info!(symbols = universe.count(), "refreshing stock data");

        let mut updates = Vec::with_capacity(universe.count());
        for symbol in &universe.symbols {
            let update = self.engine.update_symbol(symbol);
            if update.has_failures() {
                warn!(symbol = %symbol, "refreshed with failures, stale data kept");
            } else {
                info!(symbol = %symbol, "successfully refreshed data");
            }
            updates.push(update);
        }

        let summary = UpdateSummary::from_updates(&updates);
        let stocks: Vec<Stock> = updates.iter().map(SymbolUpdate::to_stock).collect();
        let partitions = Partitions::split(
            &stocks,
            &inputs.position_symbols(),
            &inputs.index_trackers,
            &inputs.watchlist,
        );

        info!(
            symbols = universe.count(),
            updated = summary.updated,
            unchanged = summary.unchanged,
            failed = summary.failed,
            "finished processing"
        );

        Ok(RunReport {
            universe,
            positions: inputs.positions,
            categories: inputs.categories,
            allocations: inputs.allocations,
            stocks,
            partitions,
            updates,
            summary,
        })
    }
}
