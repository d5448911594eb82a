//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{Backtest, BacktestConfig};
use crate::domain::config_validation::{
    build_backtest_config, build_registry, build_signal_rule, data_path, tail_rows,
};
use crate::domain::error::GalgozError;
use crate::domain::price_series::PriceSeries;
use crate::domain::registry::IndicatorRegistry;
use crate::domain::result_table::ResultTable;
use crate::domain::signal::{NoExit, SignalRule, StandardStrategy};
use crate::ports::data_port::PriceDataProvider;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "galgoz", about = "Recursive indicator backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Price CSV; overrides [backtest] data
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Write the result table as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overrides [backtest] init_rows
        #[arg(long)]
        init_rows: Option<usize>,
    },
    /// Validate a configuration without loading data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List result columns, warm-up lengths and plot settings
    Describe {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            data,
            output,
            init_rows,
        } => run_backtest(config.as_deref(), data, output.as_deref(), init_rows),
        Command::Validate { config } => run_validate(&config),
        Command::Describe { config } => run_describe(config.as_deref()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}

/// Everything a run needs apart from the price data.
pub struct RunSettings {
    pub backtest: BacktestConfig,
    pub registry: IndicatorRegistry,
    pub rule: StandardStrategy,
    pub data: Option<PathBuf>,
    pub tail: Option<usize>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            backtest: BacktestConfig::default(),
            registry: IndicatorRegistry::standard(),
            rule: StandardStrategy::default(),
            data: None,
            tail: None,
        }
    }
}

/// Settings from an INI file, or the standard defaults without one.
pub fn load_settings(config_path: Option<&Path>) -> Result<RunSettings, GalgozError> {
    let Some(path) = config_path else {
        return Ok(RunSettings::default());
    };
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;

    let backtest = build_backtest_config(&adapter)?;
    let registry = build_registry(&adapter)?;
    let rule = build_signal_rule(&adapter, &backtest.strategy)?;
    Ok(RunSettings {
        data: data_path(&adapter),
        tail: tail_rows(&adapter)?,
        backtest,
        registry,
        rule,
    })
}

fn run_backtest(
    config_path: Option<&Path>,
    data: Option<PathBuf>,
    output: Option<&Path>,
    init_rows: Option<usize>,
) -> Result<(), GalgozError> {
    let mut settings = load_settings(config_path)?;
    if let Some(rows) = init_rows {
        settings.backtest.init_rows = rows;
    }

    let data = data
        .or(settings.data)
        .ok_or_else(|| GalgozError::ConfigMissing {
            section: "backtest".to_string(),
            key: "data".to_string(),
        })?;
    eprintln!("Loading data from {}", data.display());
    let series = CsvAdapter::new().with_tail(settings.tail).load(&data)?;

    eprintln!(
        "Running {} over {} rows (init_rows = {})",
        settings.rule.name(),
        series.len(),
        settings.backtest.init_rows
    );
    let backtest = Backtest::with_rules(
        settings.backtest,
        series,
        settings.registry,
        Box::new(settings.rule),
        Box::new(NoExit),
    )?;
    let result = backtest.run()?;

    eprintln!("\n=== Backtest Results ===");
    eprintln!("{}", result.summary);

    if let Some(path) = output {
        CsvReportAdapter::new().write(&result, path)?;
        eprintln!("\nResults written to: {}", path.display());
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), GalgozError> {
    let settings = load_settings(Some(config_path))?;
    let init_rows = settings.backtest.init_rows;
    let columns = settings.registry.columns();

    // setup checks only; no rows are evaluated
    Backtest::with_rules(
        settings.backtest,
        PriceSeries::empty(),
        settings.registry,
        Box::new(settings.rule),
        Box::new(NoExit),
    )?;

    eprintln!("Config validated successfully");
    eprintln!("  init_rows: {}", init_rows);
    eprintln!("  columns:   {}", columns.join(", "));
    Ok(())
}

fn run_describe(config_path: Option<&Path>) -> Result<(), GalgozError> {
    let settings = load_settings(config_path)?;
    let registry = &settings.registry;
    let table = ResultTable::new(PriceSeries::empty(), registry.columns());

    eprintln!("Strategy:  {}", settings.backtest.strategy);
    eprintln!("init_rows: {}", settings.backtest.init_rows);
    eprintln!(
        "Signal:    BUY when {} rises and {} crosses below {}; SELL when {} falls and {} crosses above {}",
        settings.rule.trend,
        settings.rule.oscillator,
        settings.rule.lower,
        settings.rule.trend,
        settings.rule.oscillator,
        settings.rule.upper
    );

    eprintln!("\nIndicators:");
    for indicator in registry.indicators() {
        eprintln!(
            "  {:<12} {:<28} min_window = {}",
            indicator.name(),
            indicator.indicator_type().to_string(),
            indicator.min_window()
        );
    }

    eprintln!("\nColumns:");
    for bundle in registry.plot_bundles(&table) {
        eprintln!("  {:<16} {}", bundle.column, bundle.plot);
    }
    Ok(())
}
