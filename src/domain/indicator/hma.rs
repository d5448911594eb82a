//! Hull Moving Average.
//!
//! raw[i] = 2*SMA(n/2)[i] - SMA(n)[i]      (n/2 is integer division)
//! HMA[i] = SMA(round(sqrt(n)))(raw)[i]
//!
//! Warmup: first (n - 1) + (round(sqrt(n)) - 1) rows are NaN.

use crate::domain::candle::Candle;
use crate::domain::indicator::moving_average::sma;

fn smoothing_length(window: usize) -> usize {
    ((window as f64).sqrt().round() as usize).max(1)
}

pub fn min_window(window: usize) -> usize {
    window + smoothing_length(window) - 1
}

pub fn calculate_hma(candles: &[Candle], window: usize) -> Vec<f64> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close()).collect();
    hull(&closes, window)
}

pub fn hull(values: &[f64], window: usize) -> Vec<f64> {
    if window < 2 {
        return vec![f64::NAN; values.len()];
    }

    let full = sma(values, window);
    let half = sma(values, window / 2);
    let raw: Vec<f64> = half
        .iter()
        .zip(&full)
        .map(|(h, f)| 2.0 * h - f)
        .collect();

    sma(&raw, smoothing_length(window))
}
