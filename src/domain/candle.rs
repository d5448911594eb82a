//! Candle (OHLCV) representation.
//!
//! Every candle carries the mid price tier; bid and ask tiers are optional.
//! Indicators read the mid tier.

use chrono::NaiveDateTime;

/// Open/high/low/close for one price tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ohlc {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Ohlc {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
        }
    }

    /// Same value for all four prices.
    pub fn flat(price: f64) -> Self {
        Self::new(price, price, price, price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTier {
    Mid,
    Bid,
    Ask,
}

impl PriceTier {
    /// Column prefix used by the tabular input, e.g. `mid` in `mid_c`.
    pub fn prefix(&self) -> &'static str {
        match self {
            PriceTier::Mid => "mid",
            PriceTier::Bid => "bid",
            PriceTier::Ask => "ask",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub time: NaiveDateTime,
    pub mid: Ohlc,
    pub bid: Option<Ohlc>,
    pub ask: Option<Ohlc>,
    pub volume: f64,
}

impl Candle {
    pub fn new(time: NaiveDateTime, mid: Ohlc, volume: f64) -> Self {
        Self {
            time,
            mid,
            bid: None,
            ask: None,
            volume,
        }
    }

    pub fn tier(&self, tier: PriceTier) -> Option<&Ohlc> {
        match tier {
            PriceTier::Mid => Some(&self.mid),
            PriceTier::Bid => self.bid.as_ref(),
            PriceTier::Ask => self.ask.as_ref(),
        }
    }

    pub fn open(&self) -> f64 {
        self.mid.open
    }

    pub fn high(&self) -> f64 {
        self.mid.high
    }

    pub fn low(&self) -> f64 {
        self.mid.low
    }

    pub fn close(&self) -> f64 {
        self.mid.close
    }

    /// (high + low) / 2
    pub fn median_price(&self) -> f64 {
        (self.mid.high + self.mid.low) / 2.0
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.mid.high + self.mid.low + self.mid.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.mid.high - self.mid.low;
        let hc = (self.mid.high - prev_close).abs();
        let lc = (self.mid.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_candle() -> Candle {
        Candle::new(
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            Ohlc::new(100.0, 110.0, 90.0, 105.0),
            50_000.0,
        )
    }

    #[test]
    fn typical_price() {
        let candle = sample_candle();
        // (110 + 90 + 105) / 3 = 101.666...
        let expected = (110.0 + 90.0 + 105.0) / 3.0;
        assert!((candle.typical_price() - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn median_price() {
        assert!((sample_candle().median_price() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_hl_dominates() {
        let candle = sample_candle();
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((candle.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let candle = sample_candle();
        // high-low=20, |110-70|=40, |90-70|=20 → 40
        assert!((candle.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let candle = sample_candle();
        // high-low=20, |110-130|=20, |90-130|=40 → 40
        assert!((candle.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn optional_tiers() {
        let mut candle = sample_candle();
        assert!(candle.tier(PriceTier::Bid).is_none());
        candle.bid = Some(Ohlc::flat(99.5));
        assert_eq!(candle.tier(PriceTier::Bid).unwrap().close, 99.5);
        assert_eq!(candle.tier(PriceTier::Mid).unwrap().close, 105.0);
        assert_eq!(PriceTier::Ask.prefix(), "ask");
    }
}
