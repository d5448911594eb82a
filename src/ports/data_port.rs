//! Price data access port trait.

use crate::domain::error::GalgozError;
use crate::domain::price_series::PriceSeries;
use std::path::Path;

/// Supplies the price series for a run. The engine never loads data itself.
pub trait PriceDataProvider {
    fn load(&self, source: &Path) -> Result<PriceSeries, GalgozError>;
}
