//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::prelude::*;

use crate::adapters::csv_adapter::CsvBarAdapter;
use crate::adapters::csv_journal_adapter::CsvJournalWriter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::simulated_broker::SimulatedBroker;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    read_backtest_config, read_timezone, validate_backtest_config, validate_config,
};
use crate::domain::error::CrossoverError;
use crate::domain::ohlcv::FeedZone;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::journal_port::JournalPort;

pub const DEFAULT_OUTPUT_FILE: &str = "trading.csv";

#[derive(Parser, Debug)]
#[command(name = "smacross", about = "Moving average crossover backtester")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest(BacktestArgs),
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line overrides; any value given here wins over the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct BacktestArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Input bar CSV
    #[arg(short, long)]
    pub data: Option<PathBuf>,
    /// Trade journal CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub fast: Option<usize>,
    #[arg(long)]
    pub slow: Option<usize>,
    #[arg(long)]
    pub size: Option<i64>,
    #[arg(long)]
    pub cash: Option<f64>,
    #[arg(long)]
    pub commission: Option<f64>,
    /// Validate config and input data without simulating
    #[arg(long)]
    pub dry_run: bool,
}

/// Everything a run needs, resolved from config plus overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub strategy_name: String,
    pub data_file: PathBuf,
    pub output_file: PathBuf,
    pub timezone: FeedZone,
    pub backtest: BacktestConfig,
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);

    match cli.command {
        Command::Backtest(args) => run_backtest(&args),
        Command::Validate { config } => run_validate(&config),
    }
}

/// stderr fmt layer, INFO by default and DEBUG with `--verbose`.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(tracing_subscriber::filter::Targets::new().with_default(level));
    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, CrossoverError> {
    match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn apply_overrides(config: &mut BacktestConfig, args: &BacktestArgs) {
    if let Some(fast) = args.fast {
        config.fast_period = fast;
    }
    if let Some(slow) = args.slow {
        config.slow_period = slow;
    }
    if let Some(size) = args.size {
        config.trade_size = size;
    }
    if let Some(cash) = args.cash {
        config.initial_cash = cash;
    }
    if let Some(commission) = args.commission {
        config.commission = commission;
    }
}

pub fn build_run_settings(
    config: &dyn ConfigPort,
    args: &BacktestArgs,
) -> Result<RunSettings, CrossoverError> {
    let mut backtest = read_backtest_config(config)?;
    apply_overrides(&mut backtest, args);
    validate_backtest_config(&backtest)?;

    let data_file = match &args.data {
        Some(path) => path.clone(),
        None => config
            .get_string("backtest", "data_file")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| CrossoverError::ConfigMissing {
                section: "backtest".into(),
                key: "data_file".into(),
            })?,
    };

    let output_file = args.output.clone().unwrap_or_else(|| {
        config
            .get_string("backtest", "output_file")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE))
    });

    Ok(RunSettings {
        strategy_name: config
            .get_string("strategy", "name")
            .unwrap_or_else(|| "SMA Crossover".to_string()),
        data_file,
        output_file,
        timezone: read_timezone(config)?,
        backtest,
    })
}

/// Load bars, then simulate with a fresh broker. The journal goes to `sink`.
pub fn run_pipeline(
    settings: &RunSettings,
    data_port: &dyn DataPort,
    sink: &mut dyn JournalPort,
) -> Result<BacktestResult, CrossoverError> {
    eprintln!("Loading bars from {}", data_port.describe());
    let bars = data_port.fetch_ohlcv()?;

    eprintln!(
        "Running {}: SMA({}) / SMA({}), {} bars",
        settings.strategy_name,
        settings.backtest.fast_period,
        settings.backtest.slow_period,
        bars.len()
    );
    if bars.len() < settings.backtest.slow_period {
        info!(
            bars = bars.len(),
            slow_period = settings.backtest.slow_period,
            "feed is shorter than the slow period; no signals will be produced"
        );
    }

    let mut broker =
        SimulatedBroker::new(settings.backtest.initial_cash, settings.backtest.commission);
    backtest_engine::run_backtest(&bars, &settings.backtest, &mut broker, sink)
}

pub fn format_summary(result: &BacktestResult) -> String {
    let open = usize::from(result.journal.open_record().is_some());
    let mut lines = vec![
        format!("Starting Portfolio Value: {:.2}", result.starting_value),
        format!("Ending Portfolio Value: {:.2}", result.ending_value),
        format!(
            "Trades: {} closed, {} open",
            result.journal.closed_count(),
            open
        ),
        format!("Commission: {:.2}", result.total_commission()),
    ];
    let realized: f64 = result.journal.export().iter().filter_map(|r| r.pnl()).sum();
    if result.journal.closed_count() > 0 {
        lines.push(format!("Realized PnL (before commission): {:.2}", realized));
    }
    lines.join("\n")
}

fn run_backtest(args: &BacktestArgs) -> ExitCode {
    // Stage 1: Load and resolve config
    let adapter = match load_config(args.config.as_ref()) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let settings = match build_run_settings(&adapter, args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = CsvBarAdapter::new(settings.data_file.clone(), settings.timezone);

    if args.dry_run {
        return run_dry_run(&settings, &data_port);
    }

    // Stage 2: Simulate, writing the journal as it changes
    let mut sink = CsvJournalWriter::new(settings.output_file.clone());
    let result = match run_pipeline(&settings, &data_port, &mut sink) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Summary
    println!("{}", format_summary(&result));
    eprintln!("\nJournal written to: {}", sink.path().display());
    ExitCode::SUCCESS
}

pub fn run_dry_run(settings: &RunSettings, data_port: &dyn DataPort) -> ExitCode {
    let bars = match data_port.fetch_ohlcv() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let cfg = &settings.backtest;
    eprintln!("Config validated successfully");
    eprintln!("\nStrategy: {}", settings.strategy_name);
    eprintln!("  fast:        SMA({})", cfg.fast_period);
    eprintln!("  slow:        SMA({})", cfg.slow_period);
    eprintln!("  exit cross:  {}", cfg.exit_cross);
    eprintln!("  trade size:  {}", cfg.trade_size);
    eprintln!("\nBroker:");
    eprintln!("  cash:        {:.2}", cfg.initial_cash);
    eprintln!("  commission:  {}", cfg.commission);
    eprintln!("\nData: {} ({} bars)", data_port.describe(), bars.len());
    eprintln!("  timezone: {}", settings.timezone);
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        eprintln!("  range: {} to {}", first.timestamp, last.timestamp);
    }
    eprintln!(
        "Journal: {} ({})",
        settings.output_file.display(),
        cfg.journal_write
    );

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(Some(config_path)) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match validate_config(&adapter) {
        Ok(cfg) => {
            eprintln!(
                "  SMA({}) / SMA({}), size {}, exit {}",
                cfg.fast_period, cfg.slow_period, cfg.trade_size, cfg.exit_cross
            );
            eprintln!("\nConfiguration is valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
