//! Result output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::GalgozError;
use std::path::Path;

/// Port for writing a finished result table.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), GalgozError>;
}
