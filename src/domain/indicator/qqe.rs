//! QQE (Quantitative Qualitative Estimation).
//!
//! fast = EMA(RSI(r), s)
//! dar  = EMA(EMA(|fast[i] - fast[i-1]|, w), w) * factor,  w = 2r - 1
//!
//! The slow line trails the fast line by `dar`:
//! - fast below the previous slow: candidate = fast + dar, but if the fast
//!   line was already below and the candidate would rise above the previous
//!   slow value, keep the previous slow value
//! - fast above the previous slow: candidate = fast - dar, but if the fast
//!   line was already above and the candidate would fall below the previous
//!   slow value, keep the previous slow value
//! - fast equal to the previous slow: keep the previous slow value
//!
//! The slow line starts at the fast value on the first row where `dar` is
//! defined and is then strictly sequential.

use crate::domain::candle::Candle;
use crate::domain::indicator::moving_average::ema;
use crate::domain::indicator::rsi::rsi;

#[derive(Debug, Clone, PartialEq)]
pub struct QqeLines {
    pub fast: Vec<f64>,
    pub slow: Vec<f64>,
}

fn envelope_period(rsi_window: usize) -> usize {
    (rsi_window * 2).saturating_sub(1).max(1)
}

pub fn min_window(rsi_window: usize, smoothing: usize) -> usize {
    rsi_window + smoothing + 2 * envelope_period(rsi_window) - 1
}

pub fn calculate_qqe(candles: &[Candle], rsi_window: usize, smoothing: usize, factor: f64) -> QqeLines {
    let closes: Vec<f64> = candles.iter().map(|c| c.close()).collect();
    let fast = ema(&rsi(&closes, rsi_window), smoothing);

    let mut abs_change = vec![f64::NAN; fast.len()];
    for i in 1..fast.len() {
        abs_change[i] = (fast[i] - fast[i - 1]).abs();
    }
    let w = envelope_period(rsi_window);
    let dar: Vec<f64> = ema(&ema(&abs_change, w), w)
        .into_iter()
        .map(|v| v * factor)
        .collect();

    let slow = trailing_level(&fast, &dar);
    QqeLines { fast, slow }
}

fn trailing_level(fast: &[f64], dar: &[f64]) -> Vec<f64> {
    let mut slow = vec![f64::NAN; fast.len()];
    let Some(start) = dar.iter().position(|v| !v.is_nan()) else {
        return slow;
    };

    slow[start] = fast[start];
    for i in (start + 1)..fast.len() {
        let prev = slow[i - 1];
        let prev_fast = fast[i - 1];
        let current = fast[i];

        slow[i] = if current < prev {
            let candidate = current + dar[i];
            if prev_fast < prev && candidate > prev {
                prev
            } else {
                candidate
            }
        } else if current > prev {
            let candidate = current - dar[i];
            if prev_fast > prev && candidate < prev {
                prev
            } else {
                candidate
            }
        } else {
            prev
        };
    }
    slow
}
