#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use galgoz::domain::candle::{Candle, Ohlc};
use galgoz::domain::error::GalgozError;
use galgoz::domain::price_series::PriceSeries;
use galgoz::ports::data_port::PriceDataProvider;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct MockDataProvider {
    pub data: HashMap<PathBuf, Vec<Candle>>,
}

impl MockDataProvider {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, source: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(PathBuf::from(source), candles);
        self
    }
}

impl PriceDataProvider for MockDataProvider {
    fn load(&self, source: &Path) -> Result<PriceSeries, GalgozError> {
        match self.data.get(source) {
            Some(candles) => PriceSeries::new(candles.clone()),
            None => Err(GalgozError::Data {
                reason: format!("no data for {}", source.display()),
            }),
        }
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Hourly candles with a slow trend, two overlapping cycles and a volume
/// pattern, so oscillators swing through their bands.
pub fn generate_candles(count: usize, start_price: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let x = i as f64;
            let close = start_price
                + x * 0.01
                + (x * 0.09).sin() * 1.8
                + (x * 0.023).cos() * 3.1
                + (x * 1.7).sin() * 0.25;
            let open = close - (x * 0.8).cos() * 0.15;
            let high = close.max(open) + 0.2 + (x * 0.31).sin().abs() * 0.1;
            let low = close.min(open) - 0.2 - (x * 0.47).cos().abs() * 0.1;
            let volume = 800.0 + ((i * 37) % 400) as f64;
            Candle::new(
                start_time() + Duration::hours(i as i64),
                Ohlc::new(open, high, low, close),
                volume,
            )
        })
        .collect()
}

pub fn generate_series(count: usize) -> PriceSeries {
    PriceSeries::new(generate_candles(count, 150.0)).unwrap()
}

/// The same candles in the CSV input layout.
pub fn candles_to_csv(candles: &[Candle]) -> String {
    let mut out = String::from("time,volume,mid_o,mid_h,mid_l,mid_c\n");
    for c in candles {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            c.time.format("%Y-%m-%dT%H:%M:%SZ"),
            c.volume,
            c.mid.open,
            c.mid.high,
            c.mid.low,
            c.mid.close
        ));
    }
    out
}
