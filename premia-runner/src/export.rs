//! CSV artifact writers.
//!
//! Every writer creates the parent directory, renders dates as ISO-8601,
//! and renders numbers through the shared trimming formatter so `3.0`
//! exports as `3`. Percentile columns are condensed to four decimal
//! places; everything else gets six.

use std::path::Path;

use anyhow::{Context, Result};

use premia_core::domain::{
    BandRow, BondObservation, ErpObservation, MergedObservation, PeObservation, Scalar,
};
use premia_core::clean::CleanedSheet;
use premia_core::render::{
    format_date, format_number, CONDENSED_DECIMAL_PLACES, FULL_DECIMAL_PLACES,
};

use crate::pipeline::{ErpPercentileRow, PercentileRow};

const BAND_HEADERS: [&str; 5] = ["+2σ", "+1σ", "Median", "-1σ", "-2σ"];

fn writer_for(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create output directory {}", parent.display()))?;
    }
    csv::Writer::from_path(path)
        .with_context(|| format!("cannot open {} for writing", path.display()))
}

fn full(value: f64) -> String {
    format_number(value, FULL_DECIMAL_PLACES)
}

fn condensed(value: f64) -> String {
    format_number(value, CONDENSED_DECIMAL_PLACES)
}

fn render_scalar(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Number(value) => full(*value),
        Scalar::Text(text) => text.clone(),
    }
}

/// Write a generically cleaned sheet, date column first.
pub fn write_cleaned_sheet(path: &Path, sheet: &CleanedSheet) -> Result<()> {
    let mut writer = writer_for(path)?;
    writer.write_record(&sheet.header)?;
    for row in &sheet.rows {
        let mut record = vec![format_date(row.date)];
        record.extend(row.values.iter().map(render_scalar));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_pe_observations(path: &Path, rows: &[PeObservation]) -> Result<()> {
    let mut writer = writer_for(path)?;
    writer.write_record(["Date", "PE-TTM", "Close"])?;
    for row in rows {
        writer.write_record([format_date(row.date), full(row.pe), full(row.close)])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_bond_observations(path: &Path, rows: &[BondObservation]) -> Result<()> {
    let mut writer = writer_for(path)?;
    writer.write_record(["Date", "10Y Yield"])?;
    for row in rows {
        writer.write_record([format_date(row.date), full(row.yield_raw)])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_merged_observations(path: &Path, rows: &[MergedObservation]) -> Result<()> {
    let mut writer = writer_for(path)?;
    writer.write_record(["Date", "10Y Yield", "PE-TTM", "Close"])?;
    for row in rows {
        writer.write_record([
            format_date(row.date),
            full(row.yield_raw),
            full(row.pe),
            full(row.close),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_erp_observations(path: &Path, rows: &[ErpObservation]) -> Result<()> {
    let mut writer = writer_for(path)?;
    writer.write_record(["Date", "10Y Yield", "PE-TTM", "Close", "ERP"])?;
    for row in rows {
        writer.write_record([
            format_date(row.date),
            full(row.yield_raw),
            full(row.pe),
            full(row.close),
            full(row.erp),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_band_rows(path: &Path, rows: &[BandRow]) -> Result<()> {
    let mut writer = writer_for(path)?;
    let mut header = vec!["Date", "10Y Yield", "PE-TTM", "Close", "ERP"];
    header.extend(BAND_HEADERS);
    writer.write_record(&header)?;
    for row in rows {
        writer.write_record([
            format_date(row.observation.date),
            full(row.observation.yield_raw),
            full(row.observation.pe),
            full(row.observation.close),
            full(row.observation.erp),
            full(row.bands.upper_2),
            full(row.bands.upper_1),
            full(row.bands.median),
            full(row.bands.lower_1),
            full(row.bands.lower_2),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_ratio_observations(
    path: &Path,
    metric_header: &str,
    rows: &[premia_core::domain::RatioObservation],
) -> Result<()> {
    let mut writer = writer_for(path)?;
    writer.write_record(["Date", metric_header])?;
    for row in rows {
        writer.write_record([format_date(row.date), full(row.value)])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_percentile_rows(
    path: &Path,
    metric_header: &str,
    rows: &[PercentileRow],
) -> Result<()> {
    let mut writer = writer_for(path)?;
    writer.write_record(["Date", metric_header, "Moving Average", "Percentile"])?;
    for row in rows {
        writer.write_record([
            format_date(row.date),
            full(row.value),
            full(row.moving_average),
            condensed(row.percentile),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_erp_percentile_rows(path: &Path, rows: &[ErpPercentileRow]) -> Result<()> {
    let mut writer = writer_for(path)?;
    writer.write_record([
        "Date",
        "ERP",
        "Moving Average",
        "Percentile",
        "10Y Yield",
        "PE-TTM",
        "Close",
    ])?;
    for row in rows {
        writer.write_record([
            format_date(row.date),
            full(row.erp),
            full(row.moving_average),
            condensed(row.percentile),
            full(row.yield_raw),
            full(row.pe),
            full(row.close),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
