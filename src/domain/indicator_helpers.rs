//! Shared helper functions for indicator calculations.

use crate::domain::candle::Candle;

/// True range per row; row 0 uses high - low.
pub fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            if i == 0 {
                candle.high() - candle.low()
            } else {
                candle.true_range(candles[i - 1].close())
            }
        })
        .collect()
}

/// Wilder ATR: seeded with the mean of the first `period` true ranges at
/// row `period - 1`, then ATR[i] = (ATR[i-1] * (n-1) + TR[i]) / n.
pub fn calc_atr(candles: &[Candle], period: usize) -> Vec<f64> {
    let mut results = vec![f64::NAN; candles.len()];
    if period == 0 || candles.len() < period {
        return results;
    }

    let tr_values = true_ranges(candles);
    let mut atr = tr_values[..period].iter().sum::<f64>() / period as f64;
    results[period - 1] = atr;
    for i in period..candles.len() {
        atr = (atr * (period - 1) as f64 + tr_values[i]) / period as f64;
        results[i] = atr;
    }
    results
}
