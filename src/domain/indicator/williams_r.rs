//! Williams %R.
//!
//! %R[i] = -100 * (HH(n) - C[i]) / (HH(n) - LL(n)) over rows i-n+1..=i,
//! 0 when the range is flat. Scale is -100..=0.
//!
//! Warmup: first n rows are NaN, matching the other oscillators.

use crate::domain::candle::Candle;

pub fn calculate_williams_r(candles: &[Candle], period: usize) -> Vec<f64> {
    let mut values = vec![f64::NAN; candles.len()];
    if period == 0 {
        return values;
    }

    for i in period..candles.len() {
        let window = &candles[i + 1 - period..=i];
        let highest = window.iter().map(|c| c.high()).fold(f64::MIN, f64::max);
        let lowest = window.iter().map(|c| c.low()).fold(f64::MAX, f64::min);
        let range = highest - lowest;
        values[i] = if range == 0.0 {
            0.0
        } else {
            -100.0 * (highest - candles[i].close()) / range
        };
    }

    values
}
