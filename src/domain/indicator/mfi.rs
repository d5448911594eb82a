//! MFI (Money Flow Index).
//!
//! TP = (H + L + C) / 3, raw flow = TP * volume.
//! A row's flow is positive when TP rose against the previous row, negative
//! when it fell, and ignored when unchanged.
//! MFI = 100 * positive / (positive + negative) summed over the last n rows;
//! 0 when the window carries no flow.
//!
//! Warmup: first n rows are NaN.

use crate::domain::candle::Candle;

pub fn calculate_mfi(candles: &[Candle], period: usize) -> Vec<f64> {
    let mut values = vec![f64::NAN; candles.len()];
    if period == 0 || candles.len() <= period {
        return values;
    }

    let mut positive = vec![0.0; candles.len()];
    let mut negative = vec![0.0; candles.len()];
    for i in 1..candles.len() {
        let tp = candles[i].typical_price();
        let prev_tp = candles[i - 1].typical_price();
        let flow = tp * candles[i].volume;
        if tp > prev_tp {
            positive[i] = flow;
        } else if tp < prev_tp {
            negative[i] = flow;
        }
    }

    for i in period..candles.len() {
        let start = i + 1 - period;
        let pos: f64 = positive[start..=i].iter().sum();
        let neg: f64 = negative[start..=i].iter().sum();
        let total = pos + neg;
        values[i] = if total <= 0.0 {
            0.0
        } else {
            (100.0 * (pos / total)).clamp(0.0, 100.0)
        };
    }

    values
}
