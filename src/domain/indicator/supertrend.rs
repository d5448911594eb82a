//! SuperTrend.
//!
//! basic_upper = hl2 + m * ATR(n), basic_lower = hl2 - m * ATR(n)
//!
//! The final bands ratchet: the upper band only moves down (and the lower
//! band only up) unless the previous close broke through it. The trend flips
//! up when close crosses above the previous final upper band and down when
//! it crosses below the previous final lower band; otherwise it persists.
//!
//! Each row depends on the previous row's final bands, trend and close, so
//! the recurrence runs strictly in row order. The first defined row
//! (row n-1, where ATR is seeded) starts in an uptrend.

use crate::domain::candle::Candle;
use crate::domain::indicator_helpers::calc_atr;

#[derive(Debug, Clone, PartialEq)]
pub struct SuperTrendLines {
    /// Active band: lower band in an uptrend, upper band in a downtrend.
    pub trend: Vec<f64>,
    /// +1 uptrend, -1 downtrend.
    pub direction: Vec<f64>,
    pub long: Vec<f64>,
    pub short: Vec<f64>,
}

pub fn calculate_supertrend(candles: &[Candle], period: usize, multiplier: f64) -> SuperTrendLines {
    let n = candles.len();
    let mut lines = SuperTrendLines {
        trend: vec![f64::NAN; n],
        direction: vec![f64::NAN; n],
        long: vec![f64::NAN; n],
        short: vec![f64::NAN; n],
    };
    if period == 0 || n < period {
        return lines;
    }

    let atr = calc_atr(candles, period);
    let start = period - 1;

    let mut final_upper = f64::NAN;
    let mut final_lower = f64::NAN;
    let mut up = true;

    for i in start..n {
        let hl2 = candles[i].median_price();
        let basic_upper = hl2 + multiplier * atr[i];
        let basic_lower = hl2 - multiplier * atr[i];

        if i == start {
            final_upper = basic_upper;
            final_lower = basic_lower;
        } else {
            let prev_close = candles[i - 1].close();
            let prev_upper = final_upper;
            let prev_lower = final_lower;

            final_upper = if basic_upper < prev_upper || prev_close > prev_upper {
                basic_upper
            } else {
                prev_upper
            };
            final_lower = if basic_lower > prev_lower || prev_close < prev_lower {
                basic_lower
            } else {
                prev_lower
            };

            let close = candles[i].close();
            if close > prev_upper {
                up = true;
            } else if close < prev_lower {
                up = false;
            }
        }

        if up {
            lines.trend[i] = final_lower;
            lines.direction[i] = 1.0;
            lines.long[i] = final_lower;
        } else {
            lines.trend[i] = final_upper;
            lines.direction[i] = -1.0;
            lines.short[i] = final_upper;
        }
    }

    lines
}
