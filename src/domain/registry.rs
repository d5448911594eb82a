//! Indicator registry: the ordered set of indicators a run evaluates.

use crate::domain::candle::Candle;
use crate::domain::error::GalgozError;
use crate::domain::indicator::plot::PlotStyle;
use crate::domain::indicator::Indicator;
use crate::domain::result_table::{is_reserved, ResultTable};
use std::fmt;

pub const STANDARD_HMA_WINDOW: usize = 55;
pub const STANDARD_MFI_WINDOW: usize = 11;

#[derive(Debug, Clone, Default)]
pub struct IndicatorRegistry {
    indicators: Vec<Indicator>,
}

/// One result column with the display metadata of the indicator behind it.
#[derive(Debug, Clone, Copy)]
pub struct PlotBundle<'a> {
    pub column: &'a str,
    pub indicator: &'a str,
    pub values: &'a [f64],
    pub plot: &'a PlotStyle,
}

impl IndicatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// HMA(55) as the trend column and MFI(11) as the oscillator column.
    pub fn standard() -> Self {
        Self {
            indicators: vec![
                Indicator::hma(STANDARD_HMA_WINDOW),
                Indicator::mfi(STANDARD_MFI_WINDOW),
            ],
        }
    }

    pub fn register(&mut self, indicator: Indicator) -> Result<(), GalgozError> {
        indicator.validate()?;

        if self.get(indicator.name()).is_some() {
            return Err(GalgozError::DuplicateIndicator(indicator.name().to_string()));
        }
        let taken = self.columns();
        for column in indicator.columns() {
            if is_reserved(&column) {
                return Err(GalgozError::configuration(
                    indicator.name(),
                    format!("column name {column} is reserved"),
                ));
            }
            if taken.contains(&column) {
                return Err(GalgozError::DuplicateIndicator(column));
            }
        }

        self.indicators.push(indicator);
        Ok(())
    }

    pub fn with(mut self, indicator: Indicator) -> Result<Self, GalgozError> {
        self.register(indicator)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    pub fn get(&self, name: &str) -> Option<&Indicator> {
        self.indicators.iter().find(|i| i.name() == name)
    }

    /// Result columns in registration order.
    pub fn columns(&self) -> Vec<String> {
        self.indicators.iter().flat_map(|i| i.columns()).collect()
    }

    /// Largest `min_window()` over all indicators, 0 when empty.
    pub fn min_window(&self) -> usize {
        self.indicators
            .iter()
            .map(|i| i.min_window())
            .max()
            .unwrap_or(0)
    }

    pub fn validate_warmup(&self, init_rows: usize) -> Result<(), GalgozError> {
        for indicator in &self.indicators {
            let needed = indicator.min_window();
            if needed > init_rows {
                return Err(GalgozError::configuration(
                    indicator.name(),
                    format!("needs {needed} rows of history but init_rows is {init_rows}"),
                ));
            }
        }
        Ok(())
    }

    /// Evaluate every indicator over `window` and return the last value of
    /// each output, aligned with `columns()`.
    pub fn evaluate_latest(&self, window: &[Candle]) -> Result<Vec<f64>, GalgozError> {
        let row = window.len().saturating_sub(1);
        let mut latest = Vec::new();
        for indicator in &self.indicators {
            let series = indicator
                .evaluate(window)
                .map_err(|source| GalgozError::Evaluation {
                    indicator: indicator.name().to_string(),
                    row,
                    source: Box::new(source),
                })?;
            latest.extend(series.last());
        }
        Ok(latest)
    }

    pub fn plot_bundles<'a>(&'a self, table: &'a ResultTable) -> Vec<PlotBundle<'a>> {
        let mut bundles = Vec::new();
        for indicator in &self.indicators {
            for column in indicator.columns() {
                let Some((name, values)) = table
                    .columns()
                    .iter()
                    .find(|c| c.name == column)
                    .map(|c| (c.name.as_str(), c.values.as_slice()))
                else {
                    continue;
                };
                bundles.push(PlotBundle {
                    column: name,
                    indicator: indicator.name(),
                    values,
                    plot: indicator.plot(),
                });
            }
        }
        bundles
    }
}

impl fmt::Display for IndicatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.indicators.iter().map(|i| i.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::Ohlc;
    use crate::domain::price_series::PriceSeries;
    use chrono::{Duration, NaiveDate};

    fn make_candles(n: usize) -> Vec<Candle> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| {
                let p = 100.0 + (i as f64 * 0.2).sin() * 3.0;
                Candle::new(
                    start + Duration::hours(i as i64),
                    Ohlc::new(p, p + 0.5, p - 0.5, p),
                    100.0 + i as f64,
                )
            })
            .collect()
    }

    #[test]
    fn standard_registry() {
        let registry = IndicatorRegistry::standard();
        assert_eq!(registry.columns(), vec!["HMA", "MFI"]);
        assert_eq!(registry.min_window(), 61);
        assert!(registry.validate_warmup(500).is_ok());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut registry = IndicatorRegistry::new();
        registry.register(Indicator::rsi(14)).unwrap();
        let err = registry.register(Indicator::rsi(7)).unwrap_err();
        assert!(matches!(err, GalgozError::DuplicateIndicator(name) if name == "RSI"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn column_collision_rejected() {
        let mut registry = IndicatorRegistry::new();
        registry.register(Indicator::qqe(14, 5, 1.618)).unwrap();
        let err = registry
            .register(Indicator::rsi(14).named("QQE_fast"))
            .unwrap_err();
        assert!(matches!(err, GalgozError::DuplicateIndicator(name) if name == "QQE_fast"));
    }

    #[test]
    fn reserved_column_rejected() {
        let err = IndicatorRegistry::new()
            .with(Indicator::sma(3).named("signals"))
            .unwrap_err();
        assert!(matches!(err, GalgozError::Configuration { .. }));
    }

    #[test]
    fn invalid_parameters_rejected() {
        let err = IndicatorRegistry::new()
            .with(Indicator::savitzky_golay(2, 2))
            .unwrap_err();
        assert!(matches!(err, GalgozError::Configuration { indicator, .. } if indicator == "SG"));
    }

    #[test]
    fn warmup_longer_than_init_rows() {
        let registry = IndicatorRegistry::new()
            .with(Indicator::savitzky_golay(250, 2))
            .unwrap();
        let err = registry.validate_warmup(100).unwrap_err();
        assert!(err.to_string().contains("250"));
        assert!(registry.validate_warmup(250).is_ok());
    }

    #[test]
    fn evaluate_latest_aligned_with_columns() {
        let registry = IndicatorRegistry::new()
            .with(Indicator::sma(3))
            .unwrap()
            .with(Indicator::supertrend(5, 2.0).named("ST"))
            .unwrap()
            .with(Indicator::hline(50.0))
            .unwrap();
        let candles = make_candles(30);
        let latest = registry.evaluate_latest(&candles).unwrap();
        assert_eq!(latest.len(), registry.columns().len());
        assert_eq!(latest.len(), 6);
        assert_eq!(latest[5], 50.0);

        let sma = Indicator::sma(3).evaluate(&candles).unwrap();
        assert_eq!(latest[0], *sma.primary().last().unwrap());
    }

    #[test]
    fn evaluate_latest_wraps_failures() {
        let registry = IndicatorRegistry::new()
            .with(Indicator::savitzky_golay(50, 2))
            .unwrap();
        let err = registry.evaluate_latest(&make_candles(10)).unwrap_err();
        match err {
            GalgozError::Evaluation { indicator, row, source } => {
                assert_eq!(indicator, "SG");
                assert_eq!(row, 9);
                assert!(matches!(*source, GalgozError::InsufficientData { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn plot_bundles_follow_columns() {
        let registry = IndicatorRegistry::new()
            .with(Indicator::hma(9))
            .unwrap()
            .with(Indicator::qqe(5, 2, 1.618))
            .unwrap();
        let series = PriceSeries::new(make_candles(5)).unwrap();
        let table = ResultTable::new(series, registry.columns());

        let bundles = registry.plot_bundles(&table);
        let columns: Vec<&str> = bundles.iter().map(|b| b.column).collect();
        assert_eq!(columns, vec!["HMA", "QQE_fast", "QQE_slow"]);
        assert_eq!(bundles[0].plot.row, 1);
        assert_eq!(bundles[1].plot.row, 2);
        assert_eq!(bundles[2].indicator, "QQE");
        assert_eq!(bundles[2].values.len(), 5);
    }

    #[test]
    fn display_lists_indicators() {
        assert_eq!(
            IndicatorRegistry::standard().to_string(),
            "[HMA = HMA(55), MFI = MFI(11)]"
        );
    }
}
