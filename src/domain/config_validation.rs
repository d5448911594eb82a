//! Builds run settings from a config source.
//!
//! Every value is read as a string and parsed here, so a malformed value is
//! reported as `ConfigInvalid` instead of silently falling back to a default.
//! Missing optional keys take the documented defaults.

use crate::domain::backtest::{BacktestConfig, DEFAULT_INIT_ROWS};
use crate::domain::error::GalgozError;
use crate::domain::indicator::plot::{DrawMode, PlotStyle};
use crate::domain::indicator::{
    Indicator, DEFAULT_HMA_WINDOW, DEFAULT_OSCILLATOR_WINDOW, DEFAULT_QQE_FACTOR,
    DEFAULT_QQE_SMOOTHING, DEFAULT_SAVGOL_DEGREE, DEFAULT_SAVGOL_WINDOW,
    DEFAULT_SUPERTREND_MULTIPLIER, DEFAULT_SUPERTREND_PERIOD, DEFAULT_WHITTAKER_LAMBDA,
    DEFAULT_WHITTAKER_ORDER,
};
use crate::domain::registry::IndicatorRegistry;
use crate::domain::signal::{StandardStrategy, DEFAULT_LOWER_BAND, DEFAULT_UPPER_BAND, DEFAULT_STRATEGY_NAME};
use crate::ports::config_port::ConfigPort;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

const BACKTEST: &str = "backtest";
const SIGNAL: &str = "signal";

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, GalgozError> {
    let strategy = config
        .get_string(BACKTEST, "strategy")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_STRATEGY_NAME.to_string());
    let init_rows = parse_or(config, BACKTEST, "init_rows", DEFAULT_INIT_ROWS)?;
    Ok(BacktestConfig {
        strategy,
        init_rows,
    })
}

/// `[backtest] data`, the CSV to load when none is given on the command line.
pub fn data_path(config: &dyn ConfigPort) -> Option<PathBuf> {
    config
        .get_string(BACKTEST, "data")
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

/// `[backtest] tail`: keep only the last N rows of the input.
pub fn tail_rows(config: &dyn ConfigPort) -> Result<Option<usize>, GalgozError> {
    parse_opt(config, BACKTEST, "tail")
}

/// Indicators listed in `[backtest] indicators`, each read from its own
/// section. Without the key the standard HMA/MFI registry is used.
pub fn build_registry(config: &dyn ConfigPort) -> Result<IndicatorRegistry, GalgozError> {
    let Some(list) = config.get_string(BACKTEST, "indicators") else {
        return Ok(IndicatorRegistry::standard());
    };
    let names: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if names.is_empty() {
        return Err(invalid(BACKTEST, "indicators", "no indicators listed"));
    }

    let mut registry = IndicatorRegistry::new();
    for name in names {
        registry.register(build_indicator(config, name)?)?;
    }
    Ok(registry)
}

pub fn build_indicator(config: &dyn ConfigPort, section: &str) -> Result<Indicator, GalgozError> {
    let kind = config
        .get_string(section, "type")
        .ok_or_else(|| GalgozError::ConfigMissing {
            section: section.to_string(),
            key: "type".to_string(),
        })?;

    let indicator = match kind.trim().to_lowercase().as_str() {
        "sma" => Indicator::sma(parse_required(config, section, "window")?),
        "sg" | "savgol" | "savitzky_golay" => Indicator::savitzky_golay(
            parse_or(config, section, "window", DEFAULT_SAVGOL_WINDOW)?,
            parse_or(config, section, "degree", DEFAULT_SAVGOL_DEGREE)?,
        ),
        "hma" => Indicator::hma(parse_or(config, section, "window", DEFAULT_HMA_WINDOW)?),
        "ws" | "whittaker" => {
            let order = parse_or(config, section, "order", DEFAULT_WHITTAKER_ORDER)?;
            if parse_bool(config, section, "optimal")?.unwrap_or(false) {
                Indicator::whittaker_optimal(order)
            } else {
                Indicator::whittaker(
                    parse_or(config, section, "lambda", DEFAULT_WHITTAKER_LAMBDA)?,
                    order,
                )
            }
        }
        "rsi" => Indicator::rsi(parse_or(config, section, "window", DEFAULT_OSCILLATOR_WINDOW)?),
        "wpr" | "williams_r" => {
            Indicator::williams_r(parse_or(config, section, "window", DEFAULT_OSCILLATOR_WINDOW)?)
        }
        "mfi" => Indicator::mfi(parse_or(config, section, "window", DEFAULT_OSCILLATOR_WINDOW)?),
        "qqe" => Indicator::qqe(
            parse_or(config, section, "rsi_window", DEFAULT_OSCILLATOR_WINDOW)?,
            parse_or(config, section, "smoothing", DEFAULT_QQE_SMOOTHING)?,
            parse_or(config, section, "factor", DEFAULT_QQE_FACTOR)?,
        ),
        "supertrend" => Indicator::supertrend(
            parse_or(config, section, "period", DEFAULT_SUPERTREND_PERIOD)?,
            parse_or(config, section, "multiplier", DEFAULT_SUPERTREND_MULTIPLIER)?,
        ),
        "hline" => Indicator::hline(parse_or(config, section, "y", 0.0)?),
        other => {
            return Err(invalid(
                section,
                "type",
                format!("unknown indicator type '{other}'"),
            ));
        }
    };

    let plot = build_plot(config, section, indicator.plot().clone())?;
    Ok(indicator.named(section).with_plot(plot))
}

fn build_plot(
    config: &dyn ConfigPort,
    section: &str,
    mut plot: PlotStyle,
) -> Result<PlotStyle, GalgozError> {
    if let Some(mode) = config.get_string(section, "mode") {
        plot.mode = DrawMode::parse(&mode)
            .ok_or_else(|| invalid(section, "mode", format!("unknown draw mode '{mode}'")))?;
    }
    if let Some(row) = parse_opt::<u32>(config, section, "row")? {
        if row == 0 {
            return Err(invalid(section, "row", "panel rows start at 1"));
        }
        plot.row = row;
    }
    if let Some(color) = config.get_string(section, "color") {
        plot.line.color = color;
    }
    if let Some(width) = parse_opt::<f64>(config, section, "width")? {
        plot.line.width = width;
    }
    if let Some(size) = parse_opt::<f64>(config, section, "marker_size")? {
        plot.marker.size = size;
    }
    if let Some(color) = config.get_string(section, "marker_color") {
        plot.marker.color = color;
    }
    if let Some(symbol) = config.get_string(section, "marker_symbol") {
        plot.marker.symbol = symbol;
    }
    Ok(plot)
}

pub fn build_signal_rule(
    config: &dyn ConfigPort,
    strategy: &str,
) -> Result<StandardStrategy, GalgozError> {
    let trend = config
        .get_string(SIGNAL, "trend")
        .unwrap_or_else(|| "HMA".to_string());
    let oscillator = config
        .get_string(SIGNAL, "oscillator")
        .unwrap_or_else(|| "MFI".to_string());
    let lower = parse_or(config, SIGNAL, "lower", DEFAULT_LOWER_BAND)?;
    let upper = parse_or(config, SIGNAL, "upper", DEFAULT_UPPER_BAND)?;

    if !(lower.is_finite() && upper.is_finite()) || lower >= upper {
        return Err(invalid(
            SIGNAL,
            "lower",
            format!("lower band {lower} must be below upper band {upper}"),
        ));
    }
    Ok(StandardStrategy::new(trend, oscillator, lower, upper).named(strategy))
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> GalgozError {
    GalgozError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_opt<T>(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<T>, GalgozError>
where
    T: FromStr,
    T::Err: Display,
{
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| invalid(section, key, format!("'{}': {e}", raw.trim()))),
    }
}

fn parse_or<T>(config: &dyn ConfigPort, section: &str, key: &str, default: T) -> Result<T, GalgozError>
where
    T: FromStr,
    T::Err: Display,
{
    Ok(parse_opt(config, section, key)?.unwrap_or(default))
}

fn parse_required<T>(config: &dyn ConfigPort, section: &str, key: &str) -> Result<T, GalgozError>
where
    T: FromStr,
    T::Err: Display,
{
    parse_opt(config, section, key)?.ok_or_else(|| GalgozError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    })
}

fn parse_bool(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<bool>, GalgozError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Some(true)),
            "false" | "no" | "0" => Ok(Some(false)),
            other => Err(invalid(section, key, format!("'{other}' is not a boolean"))),
        },
    }
}
