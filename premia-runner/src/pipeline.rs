//! Source-specific schemas and pipeline stages.
//!
//! Each input file gets a schema describing its layout, then flows through
//! the core cleaner into typed observations. The valuation (PE) and bond
//! sheets are strict: one bad cell fails the file. Ratio sheets are
//! lenient: bad rows are dropped, because those extracts routinely carry
//! footnote rows and stray annotations.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use premia_core::align::{align_as_of, normalize_yield};
use premia_core::clean::{
    clean_sheet, parse_date, ColumnRule, DateSystem, HeaderRule, Retain, RowPolicy, SheetSchema,
    ValueKind, Width,
};
use premia_core::domain::{
    BondObservation, Cell, ErpObservation, MergedObservation, PeObservation, RatioObservation,
};
use premia_core::erp::compute_erp;
use premia_core::window::{moving_average, rolling_percentiles};
use premia_core::ErrorKind;

use crate::config::{BackfillEntry, MetricWindows};
use crate::input::InputError;

/// Valuation sheet: eight columns, date in A, PE in D, close in H.
pub const PE_STEM: &str = "data_PE";
/// Bond sheet: five columns, date in A, ten-year yield in E.
pub const BOND_STEM: &str = "data_bond";
pub const GDP_STEM: &str = "data_Ratio GDP";
pub const VOLUME_STEM: &str = "data_Ratio Volume";
pub const SECURITIES_LEND_STEM: &str = "data_Ratio Securities Lend";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Core(#[from] premia_core::Error),
    #[error("PE must be positive, got {pe} on {date}")]
    NonPositivePe { date: NaiveDate, pe: f64 },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Input(inner) => inner.kind(),
            PipelineError::Core(inner) => inner.kind(),
            PipelineError::NonPositivePe { .. } => ErrorKind::Validation,
        }
    }
}

fn number_column(header: HeaderRule) -> ColumnRule {
    ColumnRule {
        header,
        kind: ValueKind::Number,
    }
}

pub fn pe_schema() -> SheetSchema {
    SheetSchema::new(Width::Fixed(8), Retain::Only(vec![1, 4, 8]), RowPolicy::AbortFile)
        .with_rule(4, number_column(HeaderRule::equals("PE-TTM")))
        .with_rule(8, number_column(HeaderRule::equals("Close")))
}

pub fn bond_schema() -> SheetSchema {
    SheetSchema::new(Width::Fixed(5), Retain::Only(vec![1, 5]), RowPolicy::AbortFile)
        .with_rule(5, number_column(HeaderRule::equals("10Y Yield")))
}

pub fn ratio_schema() -> SheetSchema {
    SheetSchema::new(Width::Fixed(4), Retain::Only(vec![1, 4]), RowPolicy::SkipRow)
        .with_rule(1, ColumnRule {
            header: HeaderRule::contains_marker("date"),
            kind: ValueKind::TextOrNumber,
        })
        .with_rule(4, number_column(HeaderRule::AnyText))
}

/// Generic conversion: keep everything except the three metadata columns
/// B, C, and D.
pub fn full_export_schema() -> SheetSchema {
    SheetSchema::new(
        Width::FromHeader,
        Retain::AllExceptDropped(vec![2, 3, 4]),
        RowPolicy::AbortFile,
    )
}

/// Patch known-missing closes into the raw grid before cleaning. Only a
/// blank close cell on a listed date is touched.
fn apply_close_backfill(
    rows: &mut [Vec<Cell>],
    backfill: &[BackfillEntry],
    system: DateSystem,
) {
    if backfill.is_empty() {
        return;
    }
    let closes: BTreeMap<NaiveDate, f64> = backfill
        .iter()
        .map(|entry| (entry.date, entry.close))
        .collect();
    for row in rows.iter_mut().skip(1) {
        let Some(date) = row.first().and_then(|cell| parse_date(cell, system).ok()) else {
            continue;
        };
        let Some(&close) = closes.get(&date) else {
            continue;
        };
        if row.len() < 8 {
            row.resize(8, Cell::Blank);
        }
        if row[7].is_blank() {
            row[7] = Cell::Number(close);
        }
    }
}

/// Clean the valuation sheet into PE observations. PE must be strictly
/// positive; zero or negative earnings make the ERP formula meaningless.
pub fn load_pe(
    rows: &[Vec<Cell>],
    backfill: &[BackfillEntry],
    system: DateSystem,
) -> Result<Vec<PeObservation>, PipelineError> {
    let mut rows = rows.to_vec();
    apply_close_backfill(&mut rows, backfill, system);
    let sheet = clean_sheet(&rows, &pe_schema(), system)?;
    let mut observations = Vec::with_capacity(sheet.rows.len());
    for row in &sheet.rows {
        let pe = expect_number(&row.values, 0, row.date)?;
        let close = expect_number(&row.values, 1, row.date)?;
        if pe <= 0.0 {
            return Err(PipelineError::NonPositivePe { date: row.date, pe });
        }
        observations.push(PeObservation {
            date: row.date,
            pe,
            close,
        });
    }
    Ok(observations)
}

/// Clean the bond sheet into yield observations, rescaling the published
/// figure to a decimal fraction.
pub fn load_bond(
    rows: &[Vec<Cell>],
    system: DateSystem,
) -> Result<Vec<BondObservation>, PipelineError> {
    let sheet = clean_sheet(rows, &bond_schema(), system)?;
    let mut observations = Vec::with_capacity(sheet.rows.len());
    for row in &sheet.rows {
        let yield_raw = expect_number(&row.values, 0, row.date)?;
        observations.push(BondObservation {
            date: row.date,
            yield_raw,
            yield_decimal: normalize_yield(yield_raw),
        });
    }
    Ok(observations)
}

/// Clean a two-column ratio sheet. Returns the validated metric header
/// alongside the observations.
pub fn load_ratio(
    rows: &[Vec<Cell>],
    system: DateSystem,
) -> Result<(String, Vec<RatioObservation>), PipelineError> {
    let sheet = clean_sheet(rows, &ratio_schema(), system)?;
    let metric_header = sheet.header[1].clone();
    let mut observations = Vec::with_capacity(sheet.rows.len());
    for row in &sheet.rows {
        let value = expect_number(&row.values, 0, row.date)?;
        observations.push(RatioObservation {
            date: row.date,
            value,
        });
    }
    Ok((metric_header, observations))
}

fn expect_number(
    values: &[premia_core::domain::Scalar],
    index: usize,
    date: NaiveDate,
) -> Result<f64, PipelineError> {
    values
        .get(index)
        .and_then(|scalar| scalar.as_number())
        .ok_or_else(|| {
            premia_core::Error::InternalInconsistency(format!(
                "cleaned row for {date} is missing numeric column {index}"
            ))
            .into()
        })
}

/// Join the bond calendar against the valuation series.
pub fn merge_series(
    pe: &[PeObservation],
    bond: &[BondObservation],
) -> Result<Vec<MergedObservation>, PipelineError> {
    let merged = align_as_of(bond, pe, |bond, pe| MergedObservation {
        date: bond.date,
        yield_raw: bond.yield_raw,
        pe: pe.pe,
        close: pe.close,
    })?;
    Ok(merged)
}

/// Derive the ERP series from a merged calendar plus the bond series the
/// decimal yields came from.
pub fn erp_series(
    merged: &[MergedObservation],
    bond: &[BondObservation],
) -> Result<Vec<ErpObservation>, PipelineError> {
    let yield_decimals: BTreeMap<NaiveDate, f64> = bond
        .iter()
        .map(|row| (row.date, row.yield_decimal))
        .collect();
    Ok(compute_erp(merged, &yield_decimals)?)
}

/// One thermometer output row: the raw metric, its smoothed value, and the
/// percentile rank of the smoothed value within its trailing window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileRow {
    pub date: NaiveDate,
    pub value: f64,
    pub moving_average: f64,
    pub percentile: f64,
}

/// Thermometer row for the ERP series, carrying its source columns along.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErpPercentileRow {
    pub date: NaiveDate,
    pub erp: f64,
    pub moving_average: f64,
    pub percentile: f64,
    pub yield_raw: f64,
    pub pe: f64,
    pub close: f64,
}

/// Smooth a ratio series and rank the smoothed values. Rows inside either
/// warm-up (moving average or rolling window) are dropped.
pub fn percentile_rows(
    series: &[RatioObservation],
    windows: MetricWindows,
) -> Result<Vec<PercentileRow>, PipelineError> {
    let values: Vec<f64> = series.iter().map(|row| row.value).collect();
    let smoothed = moving_average(&values, windows.moving_average)?;
    let ranks = rolling_percentiles(&smoothed, windows.rolling_period)?;
    let mut output = Vec::new();
    for (index, row) in series.iter().enumerate() {
        let (Some(average), Some(percentile)) = (smoothed[index], ranks[index]) else {
            continue;
        };
        output.push(PercentileRow {
            date: row.date,
            value: row.value,
            moving_average: average,
            percentile,
        });
    }
    Ok(output)
}

/// Same ranking for the ERP series, keeping yield, PE, and close attached.
pub fn erp_percentile_rows(
    series: &[ErpObservation],
    windows: MetricWindows,
) -> Result<Vec<ErpPercentileRow>, PipelineError> {
    let values: Vec<f64> = series.iter().map(|row| row.erp).collect();
    let smoothed = moving_average(&values, windows.moving_average)?;
    let ranks = rolling_percentiles(&smoothed, windows.rolling_period)?;
    let mut output = Vec::new();
    for (index, row) in series.iter().enumerate() {
        let (Some(average), Some(percentile)) = (smoothed[index], ranks[index]) else {
            continue;
        };
        output.push(ErpPercentileRow {
            date: row.date,
            erp: row.erp,
            moving_average: average,
            percentile,
            yield_raw: row.yield_raw,
            pe: row.pe,
            close: row.close,
        });
    }
    Ok(output)
}
