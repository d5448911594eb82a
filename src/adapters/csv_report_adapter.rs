//! Writes a result table as CSV.
//!
//! Columns: time, volume, the mid tier (and bid/ask when every row has
//! them), one column per indicator output, signals, exits. Undefined cells
//! are written as empty fields.

use crate::domain::backtest::BacktestResult;
use crate::domain::candle::{Candle, Ohlc, PriceTier};
use crate::domain::error::GalgozError;
use crate::domain::result_table::{ResultTable, EXITS_COLUMN, SIGNALS_COLUMN};
use crate::ports::report_port::ReportPort;
use std::io::Write;
use std::path::Path;
use tracing::info;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), GalgozError> {
        let file = std::fs::File::create(output_path)?;
        write_table(&result.table, file)?;
        info!(path = %output_path.display(), rows = result.table.len(), "wrote result table");
        Ok(())
    }
}

pub fn write_table<W: Write>(table: &ResultTable, writer: W) -> Result<(), GalgozError> {
    let series = table.series();
    let tiers: Vec<PriceTier> = [PriceTier::Mid, PriceTier::Bid, PriceTier::Ask]
        .into_iter()
        .filter(|t| *t == PriceTier::Mid || series.has_tier(*t))
        .collect();

    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["time".to_string(), "volume".to_string()];
    for tier in &tiers {
        for suffix in ["o", "h", "l", "c"] {
            header.push(format!("{}_{}", tier.prefix(), suffix));
        }
    }
    header.extend(table.columns().iter().map(|c| c.name.clone()));
    header.push(SIGNALS_COLUMN.to_string());
    header.push(EXITS_COLUMN.to_string());
    wtr.write_record(&header).map_err(std::io::Error::from)?;

    for (row, candle) in series.candles().iter().enumerate() {
        let mut record = vec![
            candle.time.format(TIME_FORMAT).to_string(),
            number(candle.volume),
        ];
        for tier in &tiers {
            push_ohlc(&mut record, candle, *tier);
        }
        record.extend(table.columns().iter().map(|c| number(c.values[row])));
        record.push(
            table
                .signal(row)
                .map(|s| s.value().to_string())
                .unwrap_or_default(),
        );
        record.push(
            table
                .exit(row)
                .map(|e| u8::from(e).to_string())
                .unwrap_or_default(),
        );
        wtr.write_record(&record).map_err(std::io::Error::from)?;
    }

    wtr.flush()?;
    Ok(())
}

fn push_ohlc(record: &mut Vec<String>, candle: &Candle, tier: PriceTier) {
    let ohlc = candle.tier(tier).copied().unwrap_or(Ohlc::flat(f64::NAN));
    for v in [ohlc.open, ohlc.high, ohlc.low, ohlc.close] {
        record.push(number(v));
    }
}

fn number(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}
