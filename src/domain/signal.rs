//! Trading signals and the rules that produce them.
//!
//! A signal rule reads the result table up to the current row and decides
//! BUY, SELL or NONE. An exit rule decides whether an open position should be
//! closed. Both run after the row's indicator values have been written.

use crate::domain::result_table::ResultTable;
use std::fmt;

pub const DEFAULT_STRATEGY_NAME: &str = "Galgoz Standard";
pub const DEFAULT_LOWER_BAND: f64 = 25.0;
pub const DEFAULT_UPPER_BAND: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

impl Signal {
    /// Numeric encoding used in the signals column.
    pub fn value(self) -> i8 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::Neutral => 0,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Neutral => write!(f, "NONE"),
        }
    }
}

pub trait SignalRule {
    fn name(&self) -> &str;

    /// Result columns the rule reads; checked before a run starts.
    fn required_columns(&self) -> Vec<String>;

    fn evaluate(&self, table: &ResultTable, row: usize) -> Signal;
}

pub trait ExitRule {
    fn name(&self) -> &str;

    fn should_exit(&self, table: &ResultTable, row: usize) -> bool;
}

/// Never exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExit;

impl ExitRule for NoExit {
    fn name(&self) -> &str {
        "none"
    }

    fn should_exit(&self, _table: &ResultTable, _row: usize) -> bool {
        false
    }
}

/// Trend-filtered oscillator pullback.
///
/// BUY when the trend column rose on this row and the oscillator just
/// crossed down through `lower`; SELL when the trend fell and the oscillator
/// just crossed up through `upper`. Anything else, including a flat trend
/// and undefined inputs, is NONE.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardStrategy {
    pub name: String,
    pub trend: String,
    pub oscillator: String,
    pub lower: f64,
    pub upper: f64,
}

impl StandardStrategy {
    pub fn new(
        trend: impl Into<String>,
        oscillator: impl Into<String>,
        lower: f64,
        upper: f64,
    ) -> Self {
        Self {
            name: DEFAULT_STRATEGY_NAME.to_string(),
            trend: trend.into(),
            oscillator: oscillator.into(),
            lower,
            upper,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for StandardStrategy {
    fn default() -> Self {
        Self::new("HMA", "MFI", DEFAULT_LOWER_BAND, DEFAULT_UPPER_BAND)
    }
}

impl SignalRule for StandardStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_columns(&self) -> Vec<String> {
        vec![self.trend.clone(), self.oscillator.clone()]
    }

    fn evaluate(&self, table: &ResultTable, row: usize) -> Signal {
        if row == 0 {
            return Signal::Neutral;
        }
        let inputs = (
            table.value(&self.trend, row - 1),
            table.value(&self.trend, row),
            table.value(&self.oscillator, row - 1),
            table.value(&self.oscillator, row),
        );
        let (Some(prev_trend), Some(trend), Some(prev_osc), Some(osc)) = inputs else {
            return Signal::Neutral;
        };
        if [prev_trend, trend, prev_osc, osc].iter().any(|v| v.is_nan()) {
            return Signal::Neutral;
        }

        let delta = trend - prev_trend;
        if delta > 0.0 && osc < self.lower && prev_osc > self.lower {
            Signal::Buy
        } else if delta < 0.0 && osc > self.upper && prev_osc < self.upper {
            Signal::Sell
        } else {
            Signal::Neutral
        }
    }
}
