//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::file_input_adapter::FileInputAdapter;
use crate::adapters::finnhub_adapter::{self, FinnhubAdapter};
use crate::adapters::http_adapter::ReqwestHttpAdapter;
use crate::adapters::iex_adapter::{self, IexAdapter};
use crate::adapters::json_store_adapter::JsonStoreAdapter;
use crate::adapters::provider_support::read_api_key;
use crate::adapters::tiingo_adapter::{self, TiingoAdapter};
use crate::domain::config::{ManagerConfig, StoreBackend, StoreSettings};
use crate::domain::error::StockError;
use crate::domain::manager::{RunInputs, RunReport, StockDataManager};
use crate::domain::stock::{Stock, StockHistorical, StockLatest, StockMetadata};
use crate::domain::update::{CategoryOutcome, UpdateEngine};
use crate::logging::init_logging;
use crate::ports::store_port::{read_typed, StorePort};

#[derive(Parser, Debug)]
#[command(name = "stockcache", about = "Incremental stock data updater")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Refresh stored data for every symbol in the universe
    Update {
        #[arg(short, long)]
        config: PathBuf,
        /// Portfolio name, overriding [portfolio] name
        #[arg(short, long)]
        portfolio: Option<String>,
    },
    /// Check configuration and inputs without network access
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the symbol universe
    Symbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the stored records of one symbol, or list stored symbols
    Show {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Update { config, portfolio } => run_update(&config, portfolio.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Symbols { config } => run_symbols(&config),
        Command::Show { config, symbol } => run_show(&config, symbol.as_deref()),
    }
}

fn fail(err: StockError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

/// Parse and validate the INI file.
pub fn load_config(path: &PathBuf) -> Result<ManagerConfig, ExitCode> {
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| {
        fail(StockError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    })?;
    ManagerConfig::from_port(&adapter).map_err(fail)
}

/// Load the config and install logging. Keep the guard until the command ends.
fn start(path: &PathBuf) -> Result<(ManagerConfig, Option<WorkerGuard>), ExitCode> {
    let config = load_config(path)?;
    let guard = init_logging(&config.logging).map_err(fail)?;
    Ok((config, guard))
}

pub fn open_store(settings: &StoreSettings) -> Result<Box<dyn StorePort>, StockError> {
    match settings.backend {
        StoreBackend::Json => {
            let dir = settings.dir.as_ref().ok_or_else(|| StockError::ConfigMissing {
                section: "store".into(),
                key: "dir".into(),
            })?;
            Ok(Box::new(JsonStoreAdapter::open(dir)?))
        }
        StoreBackend::Sqlite => open_sqlite(settings),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(settings: &StoreSettings) -> Result<Box<dyn StorePort>, StockError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    let path = settings
        .sqlite_path
        .as_ref()
        .ok_or_else(|| StockError::ConfigMissing {
            section: "store".into(),
            key: "sqlite_path".into(),
        })?;
    Ok(Box::new(SqliteAdapter::open(path)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_settings: &StoreSettings) -> Result<Box<dyn StorePort>, StockError> {
    Err(StockError::ConfigInvalid {
        section: "store".into(),
        key: "backend".into(),
        reason: "sqlite feature is required for the sqlite backend".into(),
    })
}

/// Provider API keys, read before any symbol is processed.
pub struct ApiKeys {
    pub iex: String,
    pub finnhub: String,
    pub tiingo: String,
}

pub fn read_api_keys(config: &ManagerConfig) -> Result<ApiKeys, StockError> {
    Ok(ApiKeys {
        iex: read_api_key(iex_adapter::PROVIDER, &config.api_keys.iex)?,
        finnhub: read_api_key(finnhub_adapter::PROVIDER, &config.api_keys.finnhub)?,
        tiingo: read_api_key(tiingo_adapter::PROVIDER, &config.api_keys.tiingo)?,
    })
}

fn run_update(config_path: &PathBuf, portfolio: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let (config, _log_guard) = match start(config_path) {
        Ok(started) => started,
        Err(code) => return code,
    };
    let config = match portfolio {
        Some(name) => config.with_portfolio_name(name),
        None => config,
    };

    let keys = match read_api_keys(&config) {
        Ok(k) => k,
        Err(e) => return fail(e),
    };
    let store = match open_store(&config.store) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let http = match ReqwestHttpAdapter::new(
        Duration::from_secs(config.providers.timeout_secs),
        config.providers.max_retries,
    ) {
        Ok(h) => h,
        Err(e) => return fail(e),
    };

    let providers = &config.providers;
    let iex = IexAdapter::new(http.clone(), &providers.iex_base_url, keys.iex);
    let finnhub = FinnhubAdapter::new(http.clone(), &providers.finnhub_base_url, keys.finnhub);
    let tiingo = TiingoAdapter::new(
        http,
        &providers.tiingo_base_url,
        keys.tiingo,
        providers.history_start,
    );

    let input = FileInputAdapter::from_config(&config);
    let engine = UpdateEngine::new(store.as_ref(), &iex, &finnhub, &tiingo);
    let report = match StockDataManager::new(&input, engine).run() {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    print_report(&report);
    failure_exit_code(&report)
}

fn print_bucket(name: &str, stocks: &[Stock]) {
    let quoted = stocks.iter().filter(|s| s.latest_quote.is_some()).count();
    let bars: usize = stocks.iter().map(|s| s.day_quotes.len()).sum();
    println!(
        "{}: {} stocks, {} quoted, {} daily bars",
        name,
        stocks.len(),
        quoted,
        bars
    );
}

pub fn print_report(report: &RunReport) {
    print_bucket("portfolio", report.portfolio_stocks());
    print_bucket("index_trackers", report.index_tracker_stocks());
    print_bucket("watchlist", report.watchlist_stocks());

    for update in report.updates.iter().filter(|u| u.has_failures()) {
        for (category, outcome) in [
            ("metadata", &update.metadata_outcome),
            ("latest", &update.latest_outcome),
            ("historical", &update.historical_outcome),
        ] {
            match outcome {
                CategoryOutcome::FetchFailed(reason) | CategoryOutcome::WriteFailed(reason) => {
                    eprintln!("warning: {} {}: {}", update.symbol, category, reason);
                }
                _ => {}
            }
        }
    }
    eprintln!(
        "{} symbols: {} updated, {} unchanged, {} failed",
        report.universe.count(),
        report.summary.updated,
        report.summary.unchanged,
        report.summary.failed
    );
}

/// 0 when every pair refreshed cleanly; otherwise the code of the first
/// failure class seen, store failures taking precedence.
pub fn failure_exit_code(report: &RunReport) -> ExitCode {
    let outcomes = report.updates.iter().flat_map(|u| {
        [
            &u.metadata_outcome,
            &u.latest_outcome,
            &u.historical_outcome,
        ]
    });
    let mut code = ExitCode::SUCCESS;
    for outcome in outcomes {
        match outcome {
            CategoryOutcome::WriteFailed(_) => return ExitCode::from(3),
            CategoryOutcome::FetchFailed(_) => code = ExitCode::from(4),
            _ => {}
        }
    }
    code
}

fn load_inputs(config: &ManagerConfig) -> Result<RunInputs, ExitCode> {
    RunInputs::load(&FileInputAdapter::from_config(config)).map_err(fail)
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let (config, _log_guard) = match start(config_path) {
        Ok(started) => started,
        Err(code) => return code,
    };
    if let Err(e) = read_api_keys(&config) {
        return fail(e);
    }
    let inputs = match load_inputs(&config) {
        Ok(i) => i,
        Err(code) => return code,
    };

    let universe = inputs.universe();
    eprintln!("\nPortfolio:      {}", config.portfolio_file().display());
    eprintln!("  Positions:    {}", inputs.positions.len());
    eprintln!("  Trackers:     {}", inputs.index_trackers.len());
    eprintln!("  Watchlist:    {}", inputs.watchlist.len());
    eprintln!("  Categories:   {}", inputs.allocations.len());
    eprintln!("  Universe:     {} symbols", universe.count());
    for symbol in &universe.symbols {
        println!("{}", symbol);
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_symbols(config_path: &PathBuf) -> ExitCode {
    let (config, _log_guard) = match start(config_path) {
        Ok(started) => started,
        Err(code) => return code,
    };
    let inputs = match load_inputs(&config) {
        Ok(i) => i,
        Err(code) => return code,
    };

    let universe = inputs.universe();
    for symbol in &universe.symbols {
        println!("{}", symbol);
    }
    eprintln!("{} symbols", universe.count());
    ExitCode::SUCCESS
}

fn run_show(config_path: &PathBuf, symbol: Option<&str>) -> ExitCode {
    let (config, _log_guard) = match start(config_path) {
        Ok(started) => started,
        Err(code) => return code,
    };
    let store = match open_store(&config.store) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let Some(symbol) = symbol else {
        return match store.list_symbols() {
            Ok(symbols) => {
                for symbol in &symbols {
                    println!("{}", symbol);
                }
                eprintln!("{} stored symbols", symbols.len());
                ExitCode::SUCCESS
            }
            Err(e) => fail(e),
        };
    };

    let symbol = symbol.trim().to_uppercase();
    let stock = match load_stock(store.as_ref(), &symbol) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let Some(stock) = stock else {
        eprintln!("{}: no stored records", symbol);
        return ExitCode::SUCCESS;
    };

    match serde_json::to_string_pretty(&stock) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => fail(StockError::store(format!("failed to encode {symbol}: {e}"))),
    }
}

/// Assemble a symbol's stored records; `None` when nothing is stored.
pub fn load_stock(store: &dyn StorePort, symbol: &str) -> Result<Option<Stock>, StockError> {
    let metadata = read_typed::<StockMetadata>(store, symbol)?;
    let latest = read_typed::<StockLatest>(store, symbol)?;
    let historical = read_typed::<StockHistorical>(store, symbol)?;
    if metadata.is_none() && latest.is_none() && historical.is_none() {
        return Ok(None);
    }
    Ok(Some(Stock::assemble(symbol, metadata, latest, historical)))
}
