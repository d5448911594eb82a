//! Recursive backtest engine.
//!
//! For every row i from `init_rows` to the end of the series the engine
//! re-evaluates every indicator on rows [0, i], records the last value of
//! each output at row i, then asks the signal rule and the exit rule for
//! row i. Indicators therefore never see future rows, and each derived cell
//! is written exactly once in increasing row order.

use crate::domain::error::GalgozError;
use crate::domain::price_series::PriceSeries;
use crate::domain::registry::IndicatorRegistry;
use crate::domain::result_table::ResultTable;
use crate::domain::signal::{
    ExitRule, NoExit, Signal, SignalRule, StandardStrategy, DEFAULT_STRATEGY_NAME,
};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const DEFAULT_INIT_ROWS: usize = 500;
const PROGRESS_EVERY: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub strategy: String,
    pub init_rows: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            strategy: DEFAULT_STRATEGY_NAME.to_string(),
            init_rows: DEFAULT_INIT_ROWS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Empty input series; the table is empty.
    NoData,
    /// Every signal cell is still unset (series no longer than `init_rows`).
    NoSignals,
    Completed,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::NoData => write!(f, "no data provided"),
            RunOutcome::NoSignals => write!(f, "no signals"),
            RunOutcome::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub strategy: String,
    pub outcome: RunOutcome,
    pub buys: usize,
    pub sells: usize,
    pub exits: usize,
    pub steps: usize,
    pub elapsed: Duration,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Strategy:  {}", self.strategy)?;
        writeln!(f, "Outcome:   {}", self.outcome)?;
        writeln!(f, "Steps:     {}", self.steps)?;
        writeln!(f, "BUY:       {}", self.buys)?;
        writeln!(f, "SELL:      {}", self.sells)?;
        writeln!(f, "Exits:     {}", self.exits)?;
        write!(f, "Elapsed:   {:.3}s", self.elapsed.as_secs_f64())
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub table: ResultTable,
    pub summary: RunSummary,
}

/// A configured run. `run` consumes it, so a run executes at most once.
pub struct Backtest {
    config: BacktestConfig,
    series: PriceSeries,
    registry: IndicatorRegistry,
    signal_rule: Box<dyn SignalRule>,
    exit_rule: Box<dyn ExitRule>,
}

impl Backtest {
    /// Standard signal rule over `HMA`/`MFI`, no exit rule.
    pub fn new(
        config: BacktestConfig,
        series: PriceSeries,
        registry: IndicatorRegistry,
    ) -> Result<Self, GalgozError> {
        let rule = StandardStrategy::default().named(config.strategy.clone());
        Self::with_rules(config, series, registry, Box::new(rule), Box::new(NoExit))
    }

    pub fn with_rules(
        config: BacktestConfig,
        series: PriceSeries,
        registry: IndicatorRegistry,
        signal_rule: Box<dyn SignalRule>,
        exit_rule: Box<dyn ExitRule>,
    ) -> Result<Self, GalgozError> {
        registry.validate_warmup(config.init_rows)?;

        let columns = registry.columns();
        for required in signal_rule.required_columns() {
            if !columns.contains(&required) {
                return Err(GalgozError::configuration(
                    signal_rule.name(),
                    format!("signal rule needs column {required}, which no indicator provides"),
                ));
            }
        }

        Ok(Self {
            config,
            series,
            registry,
            signal_rule,
            exit_rule,
        })
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    pub fn registry(&self) -> &IndicatorRegistry {
        &self.registry
    }

    pub fn run(self) -> Result<BacktestResult, GalgozError> {
        let started = Instant::now();
        let init_rows = self.config.init_rows;
        let columns = self.registry.columns();
        let mut table = ResultTable::new(self.series, columns.clone());
        let strategy = self.signal_rule.name().to_string();

        if table.is_empty() {
            info!(strategy = %strategy, "no data provided");
            let summary = RunSummary {
                strategy,
                outcome: RunOutcome::NoData,
                buys: 0,
                sells: 0,
                exits: 0,
                steps: 0,
                elapsed: started.elapsed(),
            };
            return Ok(BacktestResult { table, summary });
        }

        let rows = table.len();
        let steps = rows.saturating_sub(init_rows);
        info!(
            strategy = %strategy,
            rows,
            init_rows,
            steps,
            indicators = %self.registry,
            exit_rule = self.exit_rule.name(),
            "starting recursive backtest"
        );

        for row in init_rows..rows {
            let latest = self.registry.evaluate_latest(table.series().window(row)?)?;
            for (column, value) in columns.iter().zip(latest) {
                table.write_value(row, column, value)?;
            }

            let signal = self.signal_rule.evaluate(&table, row);
            table.write_signal(row, signal)?;
            let exit = self.exit_rule.should_exit(&table, row);
            table.write_exit(row, exit)?;

            let step = row + 1 - init_rows;
            if step % PROGRESS_EVERY == 0 {
                debug!(step, steps, row, "backtest progress");
            }
        }

        let outcome = if table.defined_signals() == 0 {
            warn!(rows, init_rows, "backtest produced no signals");
            RunOutcome::NoSignals
        } else {
            RunOutcome::Completed
        };

        let summary = RunSummary {
            strategy,
            outcome,
            buys: table.count(Signal::Buy),
            sells: table.count(Signal::Sell),
            exits: table.exit_count(),
            steps,
            elapsed: started.elapsed(),
        };
        info!(
            buys = summary.buys,
            sells = summary.sells,
            exits = summary.exits,
            steps,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "backtest finished"
        );
        Ok(BacktestResult { table, summary })
    }
}
