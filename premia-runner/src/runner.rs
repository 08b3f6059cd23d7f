//! Top-level operations: convert, ERP, rolling bands, interval bands, and
//! the market thermometer.
//!
//! Each operation reads from the input directory, runs the core pipeline,
//! writes CSV artifacts into the output directory, and returns a
//! serializable summary of what happened.

use std::path::PathBuf;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use premia_core::clean::{clean_sheet, DateSystem};
use premia_core::domain::{BandRow, ErpObservation, RatioObservation};
use premia_core::interval::interval_bands;
use premia_core::window::rolling_bands;
use premia_core::ErrorKind;

use crate::config::{AnalysisConfig, ConfigError, MetricWindows, RunId, WINDOW_MAX};
use crate::export;
use crate::input::{find_input_file, read_cell_rows, InputError};
use crate::pipeline::{
    self, erp_percentile_rows, erp_series, full_export_schema, load_bond, load_pe, load_ratio,
    merge_series, percentile_rows, PipelineError,
};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("window size must be between 1 and {WINDOW_MAX}, got {0}")]
    WindowOutOfRange(usize),
    #[error(transparent)]
    Export(#[from] anyhow::Error),
}

impl From<InputError> for RunError {
    fn from(error: InputError) -> Self {
        RunError::Pipeline(PipelineError::Input(error))
    }
}

impl From<premia_core::Error> for RunError {
    fn from(error: premia_core::Error) -> Self {
        RunError::Pipeline(PipelineError::Core(error))
    }
}

impl RunError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RunError::Pipeline(inner) => inner.kind(),
            RunError::Config(_) | RunError::WindowOutOfRange(_) => ErrorKind::Validation,
            RunError::Export(_) => ErrorKind::Internal,
        }
    }
}

/// Where to read, where to write, and how.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub config: AnalysisConfig,
}

impl RunContext {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf, config: AnalysisConfig) -> Self {
        Self {
            input_dir,
            output_dir,
            config,
        }
    }

    fn date_system(&self) -> DateSystem {
        self.config.date_system.unwrap_or(DateSystem::Excel1900)
    }

    fn output(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertSummary {
    pub input: String,
    pub output_csv: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErpSummary {
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RollingSummary {
    pub window: usize,
    pub rows: usize,
    pub first_band_date: NaiveDate,
    pub output_csv: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntervalSummary {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
    pub requested_start: NaiveDate,
    pub requested_end: NaiveDate,
    pub used_start: NaiveDate,
    pub used_end: NaiveDate,
    pub start_adjusted: bool,
    pub end_adjusted: bool,
    pub rows: usize,
    pub median: f64,
    pub stddev: f64,
    pub output_csv: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThermometerSummary {
    pub run_id: RunId,
    pub outputs: Vec<String>,
}

/// Clean one named extract generically and write it back out as CSV.
pub fn run_convert(ctx: &RunContext, stem: &str) -> Result<ConvertSummary, RunError> {
    let path = find_input_file(&ctx.input_dir, stem)?;
    log::info!("converting {}", path.display());
    let rows = read_cell_rows(&path)?;
    let sheet = clean_sheet(&rows, &full_export_schema(), ctx.date_system())?;

    let output_name = format!("{stem}.csv");
    export::write_cleaned_sheet(&ctx.output(&output_name), &sheet)?;
    log::info!("wrote {} ({} rows)", output_name, sheet.rows.len());
    Ok(ConvertSummary {
        input: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        output_csv: output_name,
        rows: sheet.rows.len(),
    })
}

fn load_erp_inputs(ctx: &RunContext) -> Result<ErpInputs, RunError> {
    let system = ctx.date_system();
    let pe_path = find_input_file(&ctx.input_dir, pipeline::PE_STEM)?;
    let bond_path = find_input_file(&ctx.input_dir, pipeline::BOND_STEM)?;
    log::info!(
        "loading {} and {}",
        pe_path.display(),
        bond_path.display()
    );
    let pe = load_pe(
        &read_cell_rows(&pe_path)?,
        &ctx.config.close_backfill,
        system,
    )?;
    let bond = load_bond(&read_cell_rows(&bond_path)?, system)?;
    let merged = merge_series(&pe, &bond)?;
    let erp = erp_series(&merged, &bond)?;
    Ok(ErpInputs {
        pe,
        bond,
        merged,
        erp,
    })
}

struct ErpInputs {
    pe: Vec<premia_core::domain::PeObservation>,
    bond: Vec<premia_core::domain::BondObservation>,
    merged: Vec<premia_core::domain::MergedObservation>,
    erp: Vec<ErpObservation>,
}

/// Build and export the ERP series plus its intermediate artifacts.
pub fn run_erp(ctx: &RunContext) -> Result<ErpSummary, RunError> {
    let inputs = load_erp_inputs(ctx)?;

    export::write_pe_observations(&ctx.output("pe_clean.csv"), &inputs.pe)?;
    export::write_bond_observations(&ctx.output("bond_clean.csv"), &inputs.bond)?;
    export::write_merged_observations(&ctx.output("merged.csv"), &inputs.merged)?;
    export::write_erp_observations(&ctx.output("erp.csv"), &inputs.erp)?;
    log::info!("wrote pe_clean.csv, bond_clean.csv, merged.csv, erp.csv");

    let first = &inputs.erp[0];
    let last = &inputs.erp[inputs.erp.len() - 1];
    Ok(ErpSummary {
        rows: inputs.erp.len(),
        first_date: first.date,
        last_date: last.date,
        outputs: ["pe_clean.csv", "bond_clean.csv", "merged.csv", "erp.csv"]
            .iter()
            .map(|name| name.to_string())
            .collect(),
    })
}

/// Roll sigma bands over the ERP series with the given trailing window.
pub fn run_rolling(ctx: &RunContext, window: usize) -> Result<RollingSummary, RunError> {
    if window == 0 || window > WINDOW_MAX {
        return Err(RunError::WindowOutOfRange(window));
    }
    let inputs = load_erp_inputs(ctx)?;
    let values: Vec<f64> = inputs.erp.iter().map(|row| row.erp).collect();
    log::info!(
        "rolling bands over {} observations, window {window}",
        values.len()
    );
    let bands = rolling_bands(&values, window)?;

    // Band i closes at input index window - 1 + i.
    let rows: Vec<BandRow> = bands
        .into_iter()
        .enumerate()
        .map(|(offset, bands)| BandRow {
            observation: inputs.erp[window - 1 + offset].clone(),
            bands,
        })
        .collect();

    let output_name = "erp_rolling_bands.csv".to_string();
    export::write_band_rows(&ctx.output(&output_name), &rows)?;
    log::info!("wrote {output_name} ({} rows)", rows.len());
    Ok(RollingSummary {
        window,
        rows: rows.len(),
        first_band_date: rows[0].observation.date,
        output_csv: output_name,
    })
}

/// Flat sigma bands over a requested calendar interval of the ERP series.
pub fn run_interval(
    ctx: &RunContext,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<IntervalSummary, RunError> {
    let inputs = load_erp_inputs(ctx)?;
    let dates: Vec<NaiveDate> = inputs.erp.iter().map(|row| row.date).collect();
    let values: Vec<f64> = inputs.erp.iter().map(|row| row.erp).collect();
    let stats = interval_bands(&dates, &values, start, end)?;

    let rows: Vec<BandRow> = inputs.erp[stats.start_index..=stats.end_index]
        .iter()
        .map(|observation| BandRow {
            observation: observation.clone(),
            bands: stats.bands,
        })
        .collect();

    let output_name = "erp_interval_bands.csv".to_string();
    export::write_band_rows(&ctx.output(&output_name), &rows)?;
    log::info!(
        "wrote {output_name} ({} rows, {} to {})",
        rows.len(),
        stats.used_start,
        stats.used_end
    );
    Ok(IntervalSummary {
        earliest: stats.earliest,
        latest: stats.latest,
        requested_start: start,
        requested_end: end,
        used_start: stats.used_start,
        used_end: stats.used_end,
        start_adjusted: stats.used_start != start,
        end_adjusted: stats.used_end != end,
        rows: rows.len(),
        median: stats.median,
        stddev: stats.stddev,
        output_csv: output_name,
    })
}

/// One thermometer metric: which file it comes from, what its output files
/// are called, and which windows apply.
struct MetricSpec {
    stem: &'static str,
    clean_output: &'static str,
    percentile_output: &'static str,
    windows: MetricWindows,
}

/// Clean the three ratio extracts, rank each smoothed series, do the same
/// for the ERP series, and export everything.
pub fn run_thermometer(ctx: &RunContext) -> Result<ThermometerSummary, RunError> {
    let system = ctx.date_system();
    let metrics = [
        MetricSpec {
            stem: pipeline::GDP_STEM,
            clean_output: "ratio_gdp.csv",
            percentile_output: "ratio_gdp_percentile.csv",
            windows: ctx.config.thermometer.gdp,
        },
        MetricSpec {
            stem: pipeline::VOLUME_STEM,
            clean_output: "ratio_volume.csv",
            percentile_output: "ratio_volume_percentile.csv",
            windows: ctx.config.thermometer.volume,
        },
        MetricSpec {
            stem: pipeline::SECURITIES_LEND_STEM,
            clean_output: "ratio_securities_lend.csv",
            percentile_output: "ratio_securities_lend_percentile.csv",
            windows: ctx.config.thermometer.securities_lend,
        },
    ];

    // The ratio files are independent; clean them in parallel.
    let cleaned: Vec<(String, Vec<RatioObservation>)> = metrics
        .par_iter()
        .map(|metric| -> Result<_, RunError> {
            let path = find_input_file(&ctx.input_dir, metric.stem)?;
            let rows = read_cell_rows(&path)?;
            Ok(load_ratio(&rows, system)?)
        })
        .collect::<Result<_, _>>()?;

    let mut outputs = Vec::new();
    for (metric, (header, series)) in metrics.iter().zip(&cleaned) {
        export::write_ratio_observations(&ctx.output(metric.clean_output), header, series)?;
        outputs.push(metric.clean_output.to_string());

        let ranked = percentile_rows(series, metric.windows)?;
        export::write_percentile_rows(&ctx.output(metric.percentile_output), header, &ranked)?;
        outputs.push(metric.percentile_output.to_string());
        log::info!(
            "{}: {} observations, {} ranked",
            metric.stem,
            series.len(),
            ranked.len()
        );
    }

    let inputs = load_erp_inputs(ctx)?;
    let ranked = erp_percentile_rows(&inputs.erp, ctx.config.thermometer.erp)?;
    let erp_output = "erp_percentile.csv";
    export::write_erp_percentile_rows(&ctx.output(erp_output), &ranked)?;
    outputs.push(erp_output.to_string());
    log::info!("erp: {} observations, {} ranked", inputs.erp.len(), ranked.len());

    Ok(ThermometerSummary {
        run_id: ctx.config.run_id(),
        outputs,
    })
}

/// Resolve the interval end used when the caller leaves it out.
pub fn default_interval_end() -> NaiveDate {
    chrono::Local::now().date_naive()
}
