//! End-to-end operation tests over a synthetic input directory.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use premia_runner::config::MetricWindows;
use premia_runner::{
    run_convert, run_erp, run_interval, run_rolling, run_thermometer, AnalysisConfig,
    BackfillEntry, RunContext, RunError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_pe(dir: &Path) {
    let mut text = String::from("Date,,,PE-TTM,,,,Close\n");
    for (day, pe, close) in [
        (2, 14.0, 3050.0),
        (3, 15.0, 3085.0),
        (6, 16.0, 3120.0),
        (7, 15.5, 3104.0),
        (8, 14.5, 3066.0),
    ] {
        text.push_str(&format!("2020-01-0{day},,,{pe},,,,{close}\n"));
    }
    fs::write(dir.join("data_PE.csv"), text).unwrap();
}

fn write_bond(dir: &Path) {
    let mut text = String::from("Date,,,,10Y Yield\n");
    for (day, yield_raw) in [(2, 3.1), (3, 3.2), (6, 3.0), (7, 2.9), (8, 3.05)] {
        text.push_str(&format!("2020-01-0{day},,,,{yield_raw}\n"));
    }
    fs::write(dir.join("data_bond.csv"), text).unwrap();
}

fn write_ratio(dir: &Path, name: &str, header: &str) {
    let mut text = format!("Date,,,{header}\n");
    for (day, value) in [(2, 0.70), (3, 0.72), (6, 0.71), (7, 0.74), (8, 0.73)] {
        text.push_str(&format!("2020-01-0{day},,,{value}\n"));
    }
    fs::write(dir.join(name), text).unwrap();
}

fn context(input: &Path, output: &Path) -> RunContext {
    RunContext::new(input.to_path_buf(), output.to_path_buf(), AnalysisConfig::default())
}

fn seeded_dirs() -> (tempfile::TempDir, tempfile::TempDir) {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_pe(input.path());
    write_bond(input.path());
    (input, output)
}

#[test]
fn erp_operation_writes_all_four_artifacts() {
    let (input, output) = seeded_dirs();
    let summary = run_erp(&context(input.path(), output.path())).unwrap();
    assert_eq!(summary.rows, 5);
    assert_eq!(summary.first_date, date(2020, 1, 2));
    assert_eq!(summary.last_date, date(2020, 1, 8));
    for name in ["pe_clean.csv", "bond_clean.csv", "merged.csv", "erp.csv"] {
        assert!(output.path().join(name).is_file(), "{name} missing");
    }

    let erp_csv = fs::read_to_string(output.path().join("erp.csv")).unwrap();
    let mut lines = erp_csv.lines();
    assert_eq!(lines.next().unwrap(), "Date,10Y Yield,PE-TTM,Close,ERP");
    let first = lines.next().unwrap();
    assert!(first.starts_with("2020-01-02,3.1,14,3050,"));
}

#[test]
fn rolling_operation_aligns_bands_to_window_tails() {
    let (input, output) = seeded_dirs();
    let summary = run_rolling(&context(input.path(), output.path()), 3).unwrap();
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.first_band_date, date(2020, 1, 6));

    let text = fs::read_to_string(output.path().join("erp_rolling_bands.csv")).unwrap();
    // Header plus one band row per full window.
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn rolling_rejects_out_of_range_windows() {
    let (input, output) = seeded_dirs();
    let ctx = context(input.path(), output.path());
    assert!(matches!(
        run_rolling(&ctx, 0),
        Err(RunError::WindowOutOfRange(0))
    ));
    assert!(matches!(
        run_rolling(&ctx, 4001),
        Err(RunError::WindowOutOfRange(4001))
    ));
}

#[test]
fn interval_operation_snaps_and_reports_adjustment() {
    let (input, output) = seeded_dirs();
    let summary = run_interval(
        &context(input.path(), output.path()),
        date(2020, 1, 4),
        date(2020, 12, 31),
    )
    .unwrap();
    assert_eq!(summary.used_start, date(2020, 1, 6));
    assert_eq!(summary.used_end, date(2020, 1, 8));
    assert!(summary.start_adjusted);
    assert!(summary.end_adjusted);
    assert_eq!(summary.rows, 3);
    assert!(output.path().join("erp_interval_bands.csv").is_file());
}

#[test]
fn missing_input_reports_not_found() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let err = run_erp(&context(input.path(), output.path())).unwrap_err();
    assert_eq!(err.kind(), premia_core::ErrorKind::NotFound);
}

#[test]
fn thermometer_ranks_all_four_metrics() {
    let (input, output) = seeded_dirs();
    write_ratio(input.path(), "data_Ratio GDP.csv", "Market Cap / GDP");
    write_ratio(input.path(), "data_Ratio Volume.csv", "Volume / Market Cap");
    write_ratio(
        input.path(),
        "data_Ratio Securities Lend.csv",
        "Margin / Market Cap",
    );

    let mut config = AnalysisConfig::default();
    let small = MetricWindows {
        moving_average: 1,
        rolling_period: 2,
    };
    config.thermometer.gdp = small;
    config.thermometer.volume = small;
    config.thermometer.securities_lend = small;
    config.thermometer.erp = small;

    let ctx = RunContext::new(
        input.path().to_path_buf(),
        output.path().to_path_buf(),
        config,
    );
    let summary = run_thermometer(&ctx).unwrap();
    assert_eq!(summary.outputs.len(), 7);
    for name in [
        "ratio_gdp.csv",
        "ratio_gdp_percentile.csv",
        "ratio_volume.csv",
        "ratio_volume_percentile.csv",
        "ratio_securities_lend.csv",
        "ratio_securities_lend_percentile.csv",
        "erp_percentile.csv",
    ] {
        assert!(output.path().join(name).is_file(), "{name} missing");
    }

    let gdp = fs::read_to_string(output.path().join("ratio_gdp_percentile.csv")).unwrap();
    let mut lines = gdp.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Date,Market Cap / GDP,Moving Average,Percentile"
    );
    // The window-1 moving average keeps every row; the rank window of two
    // swallows the first.
    assert_eq!(lines.count(), 4);
}

#[test]
fn convert_drops_the_metadata_columns() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(
        input.path().join("data_export.csv"),
        "Date,Code,Name,Region,Value\n2020-01-03,sh000001,Index,CN,9.5\n2020-01-02,sh000001,Index,CN,8\n",
    )
    .unwrap();

    let summary = run_convert(&context(input.path(), output.path()), "data_export").unwrap();
    assert_eq!(summary.rows, 2);
    let text = fs::read_to_string(output.path().join("data_export.csv")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Date,Value");
    // Rows come out date-sorted with trimmed numbers.
    assert_eq!(lines[1], "2020-01-02,8");
    assert_eq!(lines[2], "2020-01-03,9.5");
}

#[test]
fn close_backfill_flows_from_config() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let mut text = String::from("Date,,,PE-TTM,,,,Close\n");
    text.push_str("2020-01-02,,,14,,,,\n");
    text.push_str("2020-01-03,,,15,,,,3085\n");
    fs::write(input.path().join("data_PE.csv"), text).unwrap();
    write_bond(input.path());

    let mut config = AnalysisConfig::default();
    config.close_backfill.push(BackfillEntry {
        date: date(2020, 1, 2),
        close: 3050.0,
    });
    // Bond has more dates than PE; trim it to the two PE can cover.
    fs::write(
        input.path().join("data_bond.csv"),
        "Date,,,,10Y Yield\n2020-01-02,,,,3.1\n2020-01-03,,,,3.2\n",
    )
    .unwrap();

    let ctx = RunContext::new(
        input.path().to_path_buf(),
        output.path().to_path_buf(),
        config,
    );
    let summary = run_erp(&ctx).unwrap();
    assert_eq!(summary.rows, 2);
    let pe_clean = fs::read_to_string(output.path().join("pe_clean.csv")).unwrap();
    assert!(pe_clean.contains("2020-01-02,14,3050"));
}
