//! Premia Runner — pipeline orchestration on top of `premia-core`.
//!
//! This crate builds on `premia-core` to provide:
//! - Input discovery by logical stem and CSV cell loading
//! - Per-source sheet schemas (valuation, bond, ratio, generic)
//! - TOML analysis configuration with a content-addressed run id
//! - The five operations: convert, ERP, rolling bands, interval bands,
//!   market thermometer
//! - CSV artifact export with trimmed numeric rendering

pub mod config;
pub mod export;
pub mod input;
pub mod pipeline;
pub mod runner;

pub use config::{AnalysisConfig, BackfillEntry, ConfigError, MetricWindows, RunId};
pub use input::{find_input_file, read_cell_rows, InputError};
pub use pipeline::{
    erp_percentile_rows, erp_series, load_bond, load_pe, load_ratio, merge_series,
    percentile_rows, ErpPercentileRow, PercentileRow, PipelineError,
};
pub use runner::{
    run_convert, run_erp, run_interval, run_rolling, run_thermometer, ConvertSummary, ErpSummary,
    IntervalSummary, RollingSummary, RunContext, RunError, ThermometerSummary,
};
