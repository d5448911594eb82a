//! Technical indicators.
//!
//! This module provides the types shared by every indicator:
//! - `IndicatorType`: closed set of indicator kinds with their parameters
//! - `Indicator`: a named, validated `IndicatorType` plus plot metadata
//! - `IndicatorSeries`: the output of one evaluation, one or more named series
//!
//! Every calculation is a pure function of the window it is given. Rows
//! without enough history hold `f64::NAN`. Output length always equals the
//! window length.

pub mod hline;
pub mod hma;
pub mod mfi;
pub mod moving_average;
pub mod plot;
pub mod qqe;
pub mod rsi;
pub mod savgol;
pub mod supertrend;
pub mod whittaker;
pub mod williams_r;

use crate::domain::candle::Candle;
use crate::domain::error::GalgozError;
use plot::PlotStyle;
use std::fmt;

pub const DEFAULT_OSCILLATOR_WINDOW: usize = 14;
pub const DEFAULT_SAVGOL_WINDOW: usize = 250;
pub const DEFAULT_SAVGOL_DEGREE: usize = 2;
pub const DEFAULT_HMA_WINDOW: usize = 55;
pub const DEFAULT_WHITTAKER_LAMBDA: f64 = 1e4;
pub const DEFAULT_WHITTAKER_ORDER: usize = 2;
pub const DEFAULT_QQE_SMOOTHING: usize = 5;
pub const DEFAULT_QQE_FACTOR: f64 = 1.618;
pub const DEFAULT_SUPERTREND_PERIOD: usize = 14;
pub const DEFAULT_SUPERTREND_MULTIPLIER: f64 = 6.5;

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorType {
    Sma {
        window: usize,
    },
    SavitzkyGolay {
        window: usize,
        degree: usize,
    },
    Hma {
        window: usize,
    },
    Whittaker {
        lambda: f64,
        order: usize,
        optimal: bool,
    },
    Rsi {
        window: usize,
    },
    WilliamsR {
        window: usize,
    },
    Mfi {
        window: usize,
    },
    Qqe {
        rsi_window: usize,
        smoothing: usize,
        factor: f64,
    },
    SuperTrend {
        period: usize,
        multiplier: f64,
    },
    HorizontalLine {
        y: f64,
    },
}

impl IndicatorType {
    /// Name used when the caller does not pick one.
    pub fn default_name(&self) -> &'static str {
        match self {
            IndicatorType::Sma { .. } => "SMA",
            IndicatorType::SavitzkyGolay { .. } => "SG",
            IndicatorType::Hma { .. } => "HMA",
            IndicatorType::Whittaker { .. } => "WS",
            IndicatorType::Rsi { .. } => "RSI",
            IndicatorType::WilliamsR { .. } => "WPR",
            IndicatorType::Mfi { .. } => "MFI",
            IndicatorType::Qqe { .. } => "QQE",
            IndicatorType::SuperTrend { .. } => "SuperTrend",
            IndicatorType::HorizontalLine { .. } => "hline",
        }
    }

    /// Keys of the series produced by one evaluation, in output order.
    pub fn output_keys(&self) -> &'static [&'static str] {
        match self {
            IndicatorType::Qqe { .. } => &["fast", "slow"],
            IndicatorType::SuperTrend { .. } => &["trend", "dir", "long", "short"],
            _ => &["value"],
        }
    }

    /// Rows needed before the last row of the output is defined.
    pub fn min_window(&self) -> usize {
        match *self {
            IndicatorType::Sma { window } => window,
            IndicatorType::SavitzkyGolay { window, .. } => window,
            IndicatorType::Hma { window } => hma::min_window(window),
            IndicatorType::Whittaker { order, .. } => order + 1,
            IndicatorType::Rsi { window }
            | IndicatorType::WilliamsR { window }
            | IndicatorType::Mfi { window } => window + 1,
            IndicatorType::Qqe {
                rsi_window,
                smoothing,
                ..
            } => qqe::min_window(rsi_window, smoothing),
            IndicatorType::SuperTrend { period, .. } => period,
            IndicatorType::HorizontalLine { .. } => 1,
        }
    }

    /// Structural parameter checks, run once at registration.
    pub fn validate(&self, name: &str) -> Result<(), GalgozError> {
        let positive = |value: usize, key: &str| {
            if value == 0 {
                Err(GalgozError::configuration(
                    name,
                    format!("{key} must be positive"),
                ))
            } else {
                Ok(())
            }
        };

        match *self {
            IndicatorType::Sma { window }
            | IndicatorType::Rsi { window }
            | IndicatorType::WilliamsR { window }
            | IndicatorType::Mfi { window } => positive(window, "window"),
            IndicatorType::SavitzkyGolay { window, degree } => {
                positive(window, "window")?;
                if degree >= window {
                    return Err(GalgozError::configuration(
                        name,
                        format!("polynomial degree {degree} must be less than window length {window}"),
                    ));
                }
                Ok(())
            }
            IndicatorType::Hma { window } => {
                if window < 2 {
                    return Err(GalgozError::configuration(
                        name,
                        "window must be at least 2",
                    ));
                }
                Ok(())
            }
            IndicatorType::Whittaker { lambda, order, .. } => {
                positive(order, "order")?;
                if !(lambda.is_finite() && lambda > 0.0) {
                    return Err(GalgozError::configuration(
                        name,
                        "lambda must be a positive number",
                    ));
                }
                Ok(())
            }
            IndicatorType::Qqe {
                rsi_window,
                smoothing,
                factor,
            } => {
                positive(rsi_window, "rsi_window")?;
                positive(smoothing, "smoothing")?;
                if !(factor.is_finite() && factor > 0.0) {
                    return Err(GalgozError::configuration(
                        name,
                        "factor must be a positive number",
                    ));
                }
                Ok(())
            }
            IndicatorType::SuperTrend { period, multiplier } => {
                positive(period, "period")?;
                if !(multiplier.is_finite() && multiplier > 0.0) {
                    return Err(GalgozError::configuration(
                        name,
                        "multiplier must be a positive number",
                    ));
                }
                Ok(())
            }
            IndicatorType::HorizontalLine { y } => {
                if !y.is_finite() {
                    return Err(GalgozError::configuration(name, "y must be finite"));
                }
                Ok(())
            }
        }
    }

    pub fn default_plot(&self) -> PlotStyle {
        match self {
            IndicatorType::Rsi { .. }
            | IndicatorType::WilliamsR { .. }
            | IndicatorType::Mfi { .. }
            | IndicatorType::Qqe { .. } => PlotStyle::lower_panel(),
            IndicatorType::HorizontalLine { .. } => PlotStyle::reference_line(),
            _ => PlotStyle::default(),
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma { window } => write!(f, "SMA({})", window),
            IndicatorType::SavitzkyGolay { window, degree } => {
                write!(f, "SG({},{})", window, degree)
            }
            IndicatorType::Hma { window } => write!(f, "HMA({})", window),
            IndicatorType::Whittaker {
                lambda,
                order,
                optimal,
            } => {
                if *optimal {
                    write!(f, "WHITTAKER(optimal,{})", order)
                } else {
                    write!(f, "WHITTAKER({},{})", lambda, order)
                }
            }
            IndicatorType::Rsi { window } => write!(f, "RSI({})", window),
            IndicatorType::WilliamsR { window } => write!(f, "WPR({})", window),
            IndicatorType::Mfi { window } => write!(f, "MFI({})", window),
            IndicatorType::Qqe {
                rsi_window,
                smoothing,
                factor,
            } => write!(f, "QQE({},{},{})", rsi_window, smoothing, factor),
            IndicatorType::SuperTrend { period, multiplier } => {
                write!(f, "SUPERTREND({},{})", period, multiplier)
            }
            IndicatorType::HorizontalLine { y } => write!(f, "HLINE({})", y),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSeries {
    pub key: &'static str,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub outputs: Vec<OutputSeries>,
}

impl IndicatorSeries {
    pub fn single(indicator_type: IndicatorType, values: Vec<f64>) -> Self {
        Self {
            indicator_type,
            outputs: vec![OutputSeries {
                key: "value",
                values,
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.outputs.first().map_or(0, |o| o.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn output(&self, key: &str) -> Option<&[f64]> {
        self.outputs
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.values.as_slice())
    }

    /// First output series.
    pub fn primary(&self) -> &[f64] {
        self.outputs.first().map_or(&[], |o| o.values.as_slice())
    }

    /// Last value of every output, NaN for an empty window.
    pub fn last(&self) -> Vec<f64> {
        self.outputs
            .iter()
            .map(|o| o.values.last().copied().unwrap_or(f64::NAN))
            .collect()
    }
}

/// A named indicator ready to be registered.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    name: String,
    indicator_type: IndicatorType,
    plot: PlotStyle,
}

impl Indicator {
    pub fn new(indicator_type: IndicatorType) -> Self {
        Self {
            name: indicator_type.default_name().to_string(),
            plot: indicator_type.default_plot(),
            indicator_type,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_plot(mut self, plot: PlotStyle) -> Self {
        self.plot = plot;
        self
    }

    pub fn sma(window: usize) -> Self {
        Self::new(IndicatorType::Sma { window })
    }

    pub fn savitzky_golay(window: usize, degree: usize) -> Self {
        Self::new(IndicatorType::SavitzkyGolay { window, degree })
    }

    pub fn hma(window: usize) -> Self {
        Self::new(IndicatorType::Hma { window })
    }

    pub fn whittaker(lambda: f64, order: usize) -> Self {
        Self::new(IndicatorType::Whittaker {
            lambda,
            order,
            optimal: false,
        })
    }

    pub fn whittaker_optimal(order: usize) -> Self {
        Self::new(IndicatorType::Whittaker {
            lambda: DEFAULT_WHITTAKER_LAMBDA,
            order,
            optimal: true,
        })
    }

    pub fn rsi(window: usize) -> Self {
        Self::new(IndicatorType::Rsi { window })
    }

    pub fn williams_r(window: usize) -> Self {
        Self::new(IndicatorType::WilliamsR { window })
    }

    pub fn mfi(window: usize) -> Self {
        Self::new(IndicatorType::Mfi { window })
    }

    pub fn qqe(rsi_window: usize, smoothing: usize, factor: f64) -> Self {
        Self::new(IndicatorType::Qqe {
            rsi_window,
            smoothing,
            factor,
        })
    }

    pub fn supertrend(period: usize, multiplier: f64) -> Self {
        Self::new(IndicatorType::SuperTrend { period, multiplier })
    }

    pub fn hline(y: f64) -> Self {
        Self::new(IndicatorType::HorizontalLine { y })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn indicator_type(&self) -> &IndicatorType {
        &self.indicator_type
    }

    pub fn plot(&self) -> &PlotStyle {
        &self.plot
    }

    pub fn min_window(&self) -> usize {
        self.indicator_type.min_window()
    }

    pub fn validate(&self) -> Result<(), GalgozError> {
        if self.name.trim().is_empty() {
            return Err(GalgozError::configuration(
                &self.name,
                "indicator name must not be empty",
            ));
        }
        self.indicator_type.validate(&self.name)
    }

    /// Result-table columns: `<name>` for single-output indicators,
    /// `<name>_<key>` otherwise.
    pub fn columns(&self) -> Vec<String> {
        let keys = self.indicator_type.output_keys();
        if keys.len() == 1 {
            vec![self.name.clone()]
        } else {
            keys.iter().map(|k| format!("{}_{}", self.name, k)).collect()
        }
    }

    /// Evaluate over the whole window, recomputing from scratch.
    pub fn evaluate(&self, window: &[Candle]) -> Result<IndicatorSeries, GalgozError> {
        let t = self.indicator_type.clone();
        let series = match t {
            IndicatorType::Sma { window: period } => {
                let closes: Vec<f64> = window.iter().map(|c| c.close()).collect();
                IndicatorSeries::single(t, moving_average::sma(&closes, period))
            }
            IndicatorType::SavitzkyGolay {
                window: length,
                degree,
            } => {
                if window.len() < length {
                    return Err(self.insufficient(window.len(), length));
                }
                let closes: Vec<f64> = window.iter().map(|c| c.close()).collect();
                let values = savgol::calculate_savgol(&closes, length, degree)
                    .ok_or_else(|| {
                        GalgozError::configuration(&self.name, "singular Savitzky-Golay fit")
                    })?;
                IndicatorSeries::single(t, values)
            }
            IndicatorType::Hma { window: period } => {
                IndicatorSeries::single(t, hma::calculate_hma(window, period))
            }
            IndicatorType::Whittaker {
                lambda,
                order,
                optimal,
            } => {
                if window.len() <= order {
                    return Err(self.insufficient(window.len(), order + 1));
                }
                let closes: Vec<f64> = window.iter().map(|c| c.close()).collect();
                let values = if optimal {
                    whittaker::smooth_optimal(&closes, order).map(|(z, _)| z)
                } else {
                    whittaker::smooth(&closes, lambda, order)
                };
                let values = values.ok_or_else(|| {
                    GalgozError::configuration(&self.name, "Whittaker system is not positive definite")
                })?;
                IndicatorSeries::single(t, values)
            }
            IndicatorType::Rsi { window: period } => {
                IndicatorSeries::single(t, rsi::calculate_rsi(window, period))
            }
            IndicatorType::WilliamsR { window: period } => {
                IndicatorSeries::single(t, williams_r::calculate_williams_r(window, period))
            }
            IndicatorType::Mfi { window: period } => {
                IndicatorSeries::single(t, mfi::calculate_mfi(window, period))
            }
            IndicatorType::Qqe {
                rsi_window,
                smoothing,
                factor,
            } => {
                let lines = qqe::calculate_qqe(window, rsi_window, smoothing, factor);
                IndicatorSeries {
                    indicator_type: t,
                    outputs: vec![
                        OutputSeries {
                            key: "fast",
                            values: lines.fast,
                        },
                        OutputSeries {
                            key: "slow",
                            values: lines.slow,
                        },
                    ],
                }
            }
            IndicatorType::SuperTrend { period, multiplier } => {
                let st = supertrend::calculate_supertrend(window, period, multiplier);
                IndicatorSeries {
                    indicator_type: t,
                    outputs: vec![
                        OutputSeries {
                            key: "trend",
                            values: st.trend,
                        },
                        OutputSeries {
                            key: "dir",
                            values: st.direction,
                        },
                        OutputSeries {
                            key: "long",
                            values: st.long,
                        },
                        OutputSeries {
                            key: "short",
                            values: st.short,
                        },
                    ],
                }
            }
            IndicatorType::HorizontalLine { y } => {
                IndicatorSeries::single(t, hline::calculate_hline(window.len(), y))
            }
        };
        Ok(series)
    }

    fn insufficient(&self, bars: usize, minimum: usize) -> GalgozError {
        GalgozError::InsufficientData {
            indicator: self.name.clone(),
            bars,
            minimum,
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.indicator_type)
    }
}
