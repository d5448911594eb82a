//! Integration tests for the recursive backtest.
//!
//! Tests cover:
//! - Full run over generated data with the standard registry
//! - Warm-up rows, write-once cells and determinism
//! - Engine values against direct evaluation of each prefix
//! - Empty input and insufficient-data failures
//! - Pluggable signal and exit rules
//! - Loading through a mock data provider

mod common;

use common::*;
use galgoz::domain::backtest::{Backtest, BacktestConfig, RunOutcome};
use galgoz::domain::error::GalgozError;
use galgoz::domain::indicator::Indicator;
use galgoz::domain::price_series::PriceSeries;
use galgoz::domain::registry::IndicatorRegistry;
use galgoz::domain::result_table::ResultTable;
use galgoz::domain::signal::{ExitRule, NoExit, Signal, SignalRule, StandardStrategy};
use galgoz::ports::data_port::PriceDataProvider;
use std::path::Path;

fn config(init_rows: usize) -> BacktestConfig {
    BacktestConfig {
        init_rows,
        ..BacktestConfig::default()
    }
}

fn same_bits(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| (x.is_nan() && y.is_nan()) || x.to_bits() == y.to_bits())
}

mod standard_run {
    use super::*;

    #[test]
    fn thousand_rows_from_row_500() {
        let result = Backtest::new(config(500), generate_series(1000), IndicatorRegistry::standard())
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(result.summary.steps, 500);
        assert_eq!(result.table.defined_signals(), 500);
        assert!(result.table.signals()[..500].iter().all(|s| s.is_none()));
        assert!(result.table.signals()[500..].iter().all(|s| s.is_some()));
        assert_eq!(
            result.summary.buys + result.summary.sells + result.table.count(Signal::Neutral),
            500
        );
        assert_eq!(result.summary.strategy, "Galgoz Standard");
        assert_ne!(result.summary.outcome, RunOutcome::NoSignals);
    }

    #[test]
    fn warmup_rows_stay_undefined() {
        let result = Backtest::new(config(300), generate_series(400), IndicatorRegistry::standard())
            .unwrap()
            .run()
            .unwrap();
        for column in ["HMA", "MFI"] {
            let values = result.table.column(column).unwrap();
            assert!(values[..300].iter().all(|v| v.is_nan()), "{column}");
        }
        assert!(result.table.exits()[..300].iter().all(|e| e.is_none()));
    }

    #[test]
    fn every_cell_written_once() {
        let result = Backtest::new(config(200), generate_series(260), IndicatorRegistry::standard())
            .unwrap()
            .run()
            .unwrap();
        for row in 0..260 {
            let expected = u32::from(row >= 200);
            for column in ["HMA", "MFI", "signals", "exits"] {
                assert_eq!(
                    result.table.write_count(row, column),
                    expected,
                    "row {row} column {column}"
                );
            }
        }
    }

    #[test]
    fn runs_are_bit_identical() {
        let run = || {
            let registry = IndicatorRegistry::standard()
                .with(Indicator::qqe(14, 5, 1.618))
                .unwrap()
                .with(Indicator::supertrend(14, 6.5))
                .unwrap();
            Backtest::new(config(150), generate_series(300), registry)
                .unwrap()
                .run()
                .unwrap()
        };
        let first = run();
        let second = run();
        for (a, b) in first.table.columns().iter().zip(second.table.columns()) {
            assert_eq!(a.name, b.name);
            assert!(same_bits(&a.values, &b.values), "{}", a.name);
        }
        assert_eq!(first.table.signals(), second.table.signals());
    }
}

mod recorded_values {
    use super::*;

    #[test]
    fn each_row_is_the_end_point_of_its_prefix() {
        let series = generate_series(320);
        let indicators = [
            Indicator::savitzky_golay(101, 2).named("SG"),
            Indicator::qqe(14, 5, 1.618),
            Indicator::supertrend(14, 6.5).named("ST"),
            Indicator::williams_r(14),
            Indicator::whittaker(1e4, 2),
        ];
        let mut registry = IndicatorRegistry::standard();
        for indicator in indicators.iter().cloned() {
            registry.register(indicator).unwrap();
        }

        let result = Backtest::new(config(260), series.clone(), registry)
            .unwrap()
            .run()
            .unwrap();

        for row in [260, 287, 319] {
            for indicator in &indicators {
                let direct = indicator.evaluate(series.window(row).unwrap()).unwrap();
                for (column, value) in indicator.columns().iter().zip(direct.last()) {
                    let recorded = result.table.value(column, row).unwrap();
                    assert!(
                        same_bits(&[recorded], &[value]),
                        "{column} at row {row}: {recorded} vs {value}"
                    );
                }
            }
        }
    }

    #[test]
    fn restartable_indicators_match_full_evaluation() {
        let series = generate_series(300);
        let registry = IndicatorRegistry::standard()
            .with(Indicator::savitzky_golay(51, 3).named("SG"))
            .unwrap()
            .with(Indicator::rsi(14))
            .unwrap();
        let result = Backtest::new(config(120), series.clone(), registry)
            .unwrap()
            .run()
            .unwrap();

        let full = Indicator::savitzky_golay(51, 3).evaluate(series.candles()).unwrap();
        assert!(same_bits(
            &result.table.column("SG").unwrap()[120..],
            &full.primary()[120..]
        ));
        let rsi = Indicator::rsi(14).evaluate(series.candles()).unwrap();
        assert!(same_bits(
            &result.table.column("RSI").unwrap()[120..],
            &rsi.primary()[120..]
        ));
    }
}

mod edge_cases {
    use super::*;

    #[test]
    fn empty_series_reports_no_data() {
        let result = Backtest::new(config(500), PriceSeries::empty(), IndicatorRegistry::standard())
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(result.summary.outcome, RunOutcome::NoData);
        assert_eq!(result.summary.outcome.to_string(), "no data provided");
        assert!(result.table.is_empty());
        assert_eq!(result.table.defined_signals(), 0);
    }

    #[test]
    fn series_not_longer_than_init_rows_has_no_signals() {
        let result = Backtest::new(config(500), generate_series(500), IndicatorRegistry::standard())
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(result.summary.outcome, RunOutcome::NoSignals);
        assert_eq!(result.summary.steps, 0);
    }

    #[test]
    fn savgol_window_longer_than_data_names_indicator() {
        let series = generate_series(100);
        let err = Indicator::savitzky_golay(250, 2)
            .evaluate(series.candles())
            .unwrap_err();
        assert!(matches!(
            err,
            GalgozError::InsufficientData { ref indicator, bars: 100, minimum: 250 } if indicator == "SG"
        ));

        let registry = IndicatorRegistry::new()
            .with(Indicator::savitzky_golay(250, 2))
            .unwrap();
        let err = registry.evaluate_latest(series.candles()).unwrap_err();
        assert!(matches!(err, GalgozError::Evaluation { row: 99, .. }));
        assert!(err.to_string().contains("SG"));
    }

    #[test]
    fn failing_indicator_aborts_the_run_with_its_row() {
        // lambda * 4 overflows the penalty band, so the factorisation fails
        let registry = IndicatorRegistry::standard()
            .with(Indicator::whittaker(f64::MAX, 2).named("WS"))
            .unwrap();
        let err = Backtest::new(config(100), generate_series(150), registry)
            .unwrap()
            .run()
            .unwrap_err();

        match err {
            GalgozError::Evaluation {
                ref indicator,
                row,
                ref source,
            } => {
                assert_eq!(indicator, "WS");
                assert_eq!(row, 100);
                assert!(matches!(**source, GalgozError::Configuration { .. }));
            }
            ref other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("WS"));
        assert!(err.to_string().contains("row 100"));
    }

    #[test]
    fn init_rows_below_warmup_rejected_before_running() {
        let registry = IndicatorRegistry::standard()
            .with(Indicator::qqe(14, 5, 1.618))
            .unwrap();
        let err = Backtest::new(config(70), generate_series(200), registry)
            .err()
            .unwrap();
        assert!(matches!(err, GalgozError::Configuration { ref indicator, .. } if indicator == "QQE"));
    }
}

mod pluggable_rules {
    use super::*;

    /// BUY when the fast QQE line crosses above the slow line, SELL on the
    /// opposite cross.
    struct QqeCross;

    impl SignalRule for QqeCross {
        fn name(&self) -> &str {
            "QQE cross"
        }

        fn required_columns(&self) -> Vec<String> {
            vec!["QQE_fast".into(), "QQE_slow".into()]
        }

        fn evaluate(&self, table: &ResultTable, row: usize) -> Signal {
            if row == 0 {
                return Signal::Neutral;
            }
            let get = |c: &str, r: usize| table.value(c, r).unwrap_or(f64::NAN);
            let (f0, f1) = (get("QQE_fast", row - 1), get("QQE_fast", row));
            let (s0, s1) = (get("QQE_slow", row - 1), get("QQE_slow", row));
            if f0 <= s0 && f1 > s1 {
                Signal::Buy
            } else if f0 >= s0 && f1 < s1 {
                Signal::Sell
            } else {
                Signal::Neutral
            }
        }
    }

    struct ExitBelowSuperTrend;

    impl ExitRule for ExitBelowSuperTrend {
        fn name(&self) -> &str {
            "close below SuperTrend"
        }

        fn should_exit(&self, table: &ResultTable, row: usize) -> bool {
            let close = table.series().candles()[row].close();
            table
                .value("ST_trend", row)
                .is_some_and(|band| !band.is_nan() && close < band)
        }
    }

    #[test]
    fn custom_signal_and_exit_rules() {
        let registry = IndicatorRegistry::new()
            .with(Indicator::qqe(14, 5, 1.618))
            .unwrap()
            .with(Indicator::supertrend(10, 2.0).named("ST"))
            .unwrap();
        let result = Backtest::with_rules(
            config(100),
            generate_series(600),
            registry,
            Box::new(QqeCross),
            Box::new(ExitBelowSuperTrend),
        )
        .unwrap()
        .run()
        .unwrap();

        assert_eq!(result.table.defined_signals(), 500);
        assert!(result.summary.buys > 0);
        assert!(result.summary.sells > 0);
        assert_eq!(result.summary.exits, result.table.exit_count());
    }

    #[test]
    fn rule_columns_must_be_registered() {
        let err = Backtest::with_rules(
            config(100),
            generate_series(200),
            IndicatorRegistry::standard(),
            Box::new(QqeCross),
            Box::new(NoExit),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("QQE_fast"));
    }

    #[test]
    fn standard_rule_on_other_columns() {
        let registry = IndicatorRegistry::new()
            .with(Indicator::savitzky_golay(61, 2).named("trend"))
            .unwrap()
            .with(Indicator::rsi(14).named("osc"))
            .unwrap();
        let rule = StandardStrategy::new("trend", "osc", 40.0, 60.0);
        let result = Backtest::with_rules(
            config(100),
            generate_series(400),
            registry,
            Box::new(rule),
            Box::new(NoExit),
        )
        .unwrap()
        .run()
        .unwrap();
        assert_eq!(result.summary.steps, 300);
        assert_eq!(result.summary.exits, 0);
    }
}

mod data_provider {
    use super::*;

    #[test]
    fn run_over_provided_series() {
        let provider = MockDataProvider::new().with_candles("GBP_JPY_H1", generate_candles(700, 180.0));
        let series = provider.load(Path::new("GBP_JPY_H1")).unwrap();
        assert_eq!(series.len(), 700);

        let result = Backtest::new(config(500), series, IndicatorRegistry::standard())
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(result.summary.steps, 200);
    }

    #[test]
    fn unknown_source_is_data_error() {
        let err = MockDataProvider::new()
            .load(Path::new("EUR_USD_H1"))
            .unwrap_err();
        assert!(matches!(err, GalgozError::Data { .. }));
    }
}
