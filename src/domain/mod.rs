//! Core domain types and logic.

pub mod candle;
pub mod price_series;
pub mod indicator;
pub mod indicator_helpers;
pub mod registry;
pub mod result_table;
pub mod signal;
pub mod backtest;
pub mod config_validation;
pub mod error;
