//! CSV price data adapter.
//!
//! Expected header (any order, extra columns ignored):
//! `time, volume, mid_o, mid_h, mid_l, mid_c` plus optional `bid_*` and
//! `ask_*` tiers. A tier is read only when all four of its columns exist.

use crate::domain::candle::{Candle, Ohlc, PriceTier};
use crate::domain::error::GalgozError;
use crate::domain::price_series::PriceSeries;
use crate::ports::data_port::PriceDataProvider;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const OHLC_SUFFIXES: [&str; 4] = ["o", "h", "l", "c"];

#[derive(Debug, Clone, Default)]
pub struct CsvAdapter {
    tail: Option<usize>,
}

impl CsvAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the last `rows` rows after loading.
    pub fn with_tail(mut self, rows: Option<usize>) -> Self {
        self.tail = rows;
        self
    }
}

impl PriceDataProvider for CsvAdapter {
    fn load(&self, source: &Path) -> Result<PriceSeries, GalgozError> {
        let content = fs::read_to_string(source)?;
        let mut candles = read_candles(content.as_bytes())?;
        candles.sort_by_key(|c| c.time);

        let series = PriceSeries::new(candles)?;
        let series = match self.tail {
            Some(rows) => series.tail(rows),
            None => series,
        };
        info!(
            path = %source.display(),
            rows = series.len(),
            bid = series.has_tier(PriceTier::Bid),
            ask = series.has_tier(PriceTier::Ask),
            "loaded price data"
        );
        Ok(series)
    }
}

struct Layout {
    time: usize,
    volume: usize,
    mid: [usize; 4],
    bid: Option<[usize; 4]>,
    ask: Option<[usize; 4]>,
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, GalgozError> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let require = |name: &str| {
            find(name).ok_or_else(|| GalgozError::Data {
                reason: format!("missing column {name}"),
            })
        };
        let tier = |prefix: &str| -> Option<[usize; 4]> {
            let [o, h, l, c] = OHLC_SUFFIXES.map(|s| find(&format!("{prefix}_{s}")));
            Some([o?, h?, l?, c?])
        };

        let mid = [
            require("mid_o")?,
            require("mid_h")?,
            require("mid_l")?,
            require("mid_c")?,
        ];
        let layout = Self {
            time: require("time")?,
            volume: require("volume")?,
            mid,
            bid: tier(PriceTier::Bid.prefix()),
            ask: tier(PriceTier::Ask.prefix()),
        };
        debug!(
            bid = layout.bid.is_some(),
            ask = layout.ask.is_some(),
            "resolved CSV columns"
        );
        Ok(layout)
    }
}

/// Parse candles in file order.
pub fn read_candles<R: Read>(reader: R) -> Result<Vec<Candle>, GalgozError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| GalgozError::Data {
            reason: format!("CSV header error: {e}"),
        })?
        .clone();
    let layout = Layout::from_headers(&headers)?;

    let mut candles = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        // header is line 1
        let line = i + 2;
        let record = result.map_err(|e| GalgozError::Data {
            reason: format!("CSV parse error: {e}"),
        })?;

        let time_str = record.get(layout.time).unwrap_or_default();
        let time = parse_time(time_str).ok_or_else(|| GalgozError::Data {
            reason: format!("line {line}: invalid time '{time_str}'"),
        })?;
        let volume = number(&record, layout.volume, "volume", line)?;
        let mid = ohlc(&record, layout.mid, "mid", line)?;

        let mut candle = Candle::new(time, mid, volume);
        if let Some(cols) = layout.bid {
            candle.bid = Some(ohlc(&record, cols, "bid", line)?);
        }
        if let Some(cols) = layout.ask {
            candle.ask = Some(ohlc(&record, cols, "ask", line)?);
        }
        candles.push(candle);
    }
    Ok(candles)
}

fn ohlc(
    record: &csv::StringRecord,
    cols: [usize; 4],
    prefix: &str,
    line: usize,
) -> Result<Ohlc, GalgozError> {
    let [o, h, l, c] = cols;
    Ok(Ohlc::new(
        number(record, o, &format!("{prefix}_o"), line)?,
        number(record, h, &format!("{prefix}_h"), line)?,
        number(record, l, &format!("{prefix}_l"), line)?,
        number(record, c, &format!("{prefix}_c"), line)?,
    ))
}

fn number(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: usize,
) -> Result<f64, GalgozError> {
    let raw = record.get(index).unwrap_or_default();
    raw.parse::<f64>().map_err(|e| GalgozError::Data {
        reason: format!("line {line}: invalid {name} value '{raw}': {e}"),
    })
}

/// Accepts RFC 3339 (converted to UTC), `%Y-%m-%d %H:%M:%S` and `%Y-%m-%d`.
pub fn parse_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
