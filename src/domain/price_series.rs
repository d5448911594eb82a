//! Price series: the ordered candle table every indicator reads.
//!
//! Timestamps are strictly increasing. Gaps are allowed; everything
//! downstream works on row position, not calendar time.

use crate::domain::candle::{Candle, PriceTier};
use crate::domain::error::GalgozError;
use chrono::NaiveDateTime;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    candles: Vec<Candle>,
    time_index: HashMap<NaiveDateTime, usize>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate timestamps,
    /// non-finite prices in any tier and negative or non-finite volume.
    pub fn new(candles: Vec<Candle>) -> Result<Self, GalgozError> {
        for (row, candle) in candles.iter().enumerate() {
            if !candle.volume.is_finite() || candle.volume < 0.0 {
                return Err(GalgozError::InvalidSeries {
                    row,
                    reason: format!("volume must be finite and non-negative, got {}", candle.volume),
                });
            }
            for tier in [PriceTier::Mid, PriceTier::Bid, PriceTier::Ask] {
                let Some(ohlc) = candle.tier(tier) else {
                    continue;
                };
                let prices = [ohlc.open, ohlc.high, ohlc.low, ohlc.close];
                if let Some(bad) = prices.iter().find(|p| !p.is_finite()) {
                    return Err(GalgozError::InvalidSeries {
                        row,
                        reason: format!("{} price must be finite, got {bad}", tier.prefix()),
                    });
                }
            }
            if row > 0 && candle.time <= candles[row - 1].time {
                return Err(GalgozError::InvalidSeries {
                    row,
                    reason: format!(
                        "timestamp {} does not follow {}",
                        candle.time,
                        candles[row - 1].time
                    ),
                });
            }
        }

        let time_index = candles
            .iter()
            .enumerate()
            .map(|(i, c)| (c.time, i))
            .collect();
        Ok(Self {
            candles,
            time_index,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Rows `[0, row]` inclusive: what is visible at step `row`.
    pub fn window(&self, row: usize) -> Result<&[Candle], GalgozError> {
        if row >= self.candles.len() {
            return Err(GalgozError::Data {
                reason: format!("row {row} is outside a series of {} rows", self.candles.len()),
            });
        }
        Ok(&self.candles[..=row])
    }

    pub fn get(&self, row: usize) -> Option<&Candle> {
        self.candles.get(row)
    }

    pub fn row_of(&self, time: NaiveDateTime) -> Option<usize> {
        self.time_index.get(&time).copied()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close()).collect()
    }

    /// A tier counts as present only when every candle carries it.
    pub fn has_tier(&self, tier: PriceTier) -> bool {
        !self.candles.is_empty() && self.candles.iter().all(|c| c.tier(tier).is_some())
    }

    /// Keep only the last `count` rows (used to bound sample datasets).
    pub fn tail(&self, count: usize) -> Self {
        let start = self.candles.len().saturating_sub(count);
        let candles = self.candles[start..].to_vec();
        let time_index = candles
            .iter()
            .enumerate()
            .map(|(i, c)| (c.time, i))
            .collect();
        Self {
            candles,
            time_index,
        }
    }
}
