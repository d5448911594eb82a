//! Result table: the price series plus every derived column.
//!
//! Derived cells start undefined (NaN for indicator columns, `None` for
//! signals and exits). Each cell may be written once; the table keeps a
//! per-cell write counter so the write-once property can be checked.

use crate::domain::error::GalgozError;
use crate::domain::price_series::PriceSeries;
use crate::domain::signal::Signal;
use std::collections::HashMap;

pub const SIGNALS_COLUMN: &str = "signals";
pub const EXITS_COLUMN: &str = "exits";

/// Column names taken by the price data and the signal/exit columns.
pub const RESERVED_COLUMNS: &[&str] = &[
    "time",
    "volume",
    "mid_o",
    "mid_h",
    "mid_l",
    "mid_c",
    "bid_o",
    "bid_h",
    "bid_l",
    "bid_c",
    "ask_o",
    "ask_h",
    "ask_l",
    "ask_c",
    SIGNALS_COLUMN,
    EXITS_COLUMN,
];

pub fn is_reserved(column: &str) -> bool {
    RESERVED_COLUMNS.contains(&column)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct ResultTable {
    series: PriceSeries,
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    signals: Vec<Option<Signal>>,
    exits: Vec<Option<bool>>,
    // one row per indicator column, then signals, then exits
    writes: Vec<Vec<u32>>,
}

impl ResultTable {
    pub fn new(series: PriceSeries, column_names: Vec<String>) -> Self {
        let rows = series.len();
        let index = column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        let columns: Vec<Column> = column_names
            .into_iter()
            .map(|name| Column {
                name,
                values: vec![f64::NAN; rows],
            })
            .collect();
        let writes = vec![vec![0; rows]; columns.len() + 2];
        Self {
            series,
            columns,
            index,
            signals: vec![None; rows],
            exits: vec![None; rows],
            writes,
        }
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.index
            .get(name)
            .map(|&i| self.columns[i].values.as_slice())
    }

    /// `None` for an unknown column or row; NaN when the cell is undefined.
    pub fn value(&self, name: &str, row: usize) -> Option<f64> {
        self.column(name).and_then(|values| values.get(row).copied())
    }

    pub fn signals(&self) -> &[Option<Signal>] {
        &self.signals
    }

    pub fn signal(&self, row: usize) -> Option<Signal> {
        self.signals.get(row).copied().flatten()
    }

    pub fn exits(&self) -> &[Option<bool>] {
        &self.exits
    }

    pub fn exit(&self, row: usize) -> Option<bool> {
        self.exits.get(row).copied().flatten()
    }

    pub fn write_value(&mut self, row: usize, column: &str, value: f64) -> Result<(), GalgozError> {
        let Some(&col) = self.index.get(column) else {
            return Err(GalgozError::Data {
                reason: format!("unknown result column {column}"),
            });
        };
        self.mark_written(row, col, column)?;
        self.columns[col].values[row] = value;
        Ok(())
    }

    pub fn write_signal(&mut self, row: usize, signal: Signal) -> Result<(), GalgozError> {
        self.mark_written(row, self.columns.len(), SIGNALS_COLUMN)?;
        self.signals[row] = Some(signal);
        Ok(())
    }

    pub fn write_exit(&mut self, row: usize, exit: bool) -> Result<(), GalgozError> {
        self.mark_written(row, self.columns.len() + 1, EXITS_COLUMN)?;
        self.exits[row] = Some(exit);
        Ok(())
    }

    fn mark_written(&mut self, row: usize, slot: usize, column: &str) -> Result<(), GalgozError> {
        let rows = self.series.len();
        let Some(count) = self.writes.get_mut(slot).and_then(|w| w.get_mut(row)) else {
            return Err(GalgozError::Data {
                reason: format!("row {row} of column {column} is outside a table of {rows} rows"),
            });
        };
        if *count > 0 {
            return Err(GalgozError::CellRewritten {
                row,
                column: column.to_string(),
            });
        }
        *count += 1;
        Ok(())
    }

    /// How many times a cell was written: 0 or 1 for a well-behaved run.
    pub fn write_count(&self, row: usize, column: &str) -> u32 {
        let slot = match column {
            SIGNALS_COLUMN => Some(self.columns.len()),
            EXITS_COLUMN => Some(self.columns.len() + 1),
            name => self.index.get(name).copied(),
        };
        slot.and_then(|s| self.writes[s].get(row).copied())
            .unwrap_or(0)
    }

    pub fn count(&self, signal: Signal) -> usize {
        self.signals.iter().filter(|s| **s == Some(signal)).count()
    }

    pub fn defined_signals(&self) -> usize {
        self.signals.iter().filter(|s| s.is_some()).count()
    }

    pub fn exit_count(&self) -> usize {
        self.exits.iter().filter(|e| **e == Some(true)).count()
    }
}
