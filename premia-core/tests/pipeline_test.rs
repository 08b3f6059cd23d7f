//! End-to-end exercise of the core pipeline: clean two sheets, align them
//! as-of, derive the ERP series, and roll sigma bands over it.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use premia_core::align::{align_as_of, normalize_yield};
use premia_core::clean::{
    clean_sheet, ColumnRule, DateSystem, HeaderRule, Retain, RowPolicy, SheetSchema, ValueKind,
    Width,
};
use premia_core::domain::{BondObservation, Cell, MergedObservation, PeObservation};
use premia_core::erp::compute_erp;
use premia_core::interval::interval_bands;
use premia_core::window::rolling_bands;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn number_column(header: &str) -> ColumnRule {
    ColumnRule {
        header: HeaderRule::equals(header),
        kind: ValueKind::Number,
    }
}

fn pe_grid() -> Vec<Vec<Cell>> {
    let mut rows = vec![vec![
        Cell::from("Date"),
        Cell::Blank,
        Cell::Blank,
        Cell::from("PE-TTM"),
        Cell::Blank,
        Cell::Blank,
        Cell::Blank,
        Cell::from("Close"),
    ]];
    for (day, pe, close) in [
        (2, 14.0, 3050.0),
        (3, 15.0, 3085.0),
        (6, 16.0, 3120.0),
        (7, 15.5, 3104.0),
        (8, 14.5, 3066.0),
    ] {
        rows.push(vec![
            Cell::from(format!("2020-01-0{day}").as_str()),
            Cell::Blank,
            Cell::Blank,
            Cell::from(pe),
            Cell::Blank,
            Cell::Blank,
            Cell::Blank,
            Cell::from(close),
        ]);
    }
    rows
}

fn bond_grid() -> Vec<Vec<Cell>> {
    let mut rows = vec![vec![
        Cell::from("Date"),
        Cell::Blank,
        Cell::Blank,
        Cell::Blank,
        Cell::from("10Y Yield"),
    ]];
    for (day, yield_raw) in [(2, 3.1), (3, 3.2), (6, 3.0), (7, 2.9), (8, 3.05)] {
        rows.push(vec![
            Cell::from(format!("2020-01-0{day}").as_str()),
            Cell::Blank,
            Cell::Blank,
            Cell::Blank,
            Cell::from(yield_raw),
        ]);
    }
    rows
}

fn pe_schema() -> SheetSchema {
    SheetSchema::new(Width::Fixed(8), Retain::Only(vec![1, 4, 8]), RowPolicy::AbortFile)
        .with_rule(4, number_column("PE-TTM"))
        .with_rule(8, number_column("Close"))
}

fn bond_schema() -> SheetSchema {
    SheetSchema::new(Width::Fixed(5), Retain::Only(vec![1, 5]), RowPolicy::AbortFile)
        .with_rule(5, number_column("10Y Yield"))
}

#[test]
fn clean_align_derive_and_roll() {
    let pe_sheet = clean_sheet(&pe_grid(), &pe_schema(), DateSystem::Excel1900).unwrap();
    let bond_sheet = clean_sheet(&bond_grid(), &bond_schema(), DateSystem::Excel1900).unwrap();
    assert_eq!(pe_sheet.header, vec!["Date", "PE-TTM", "Close"]);
    assert_eq!(bond_sheet.header, vec!["Date", "10Y Yield"]);

    let pe_rows: Vec<PeObservation> = pe_sheet
        .rows
        .iter()
        .map(|row| PeObservation {
            date: row.date,
            pe: row.values[0].as_number().unwrap(),
            close: row.values[1].as_number().unwrap(),
        })
        .collect();
    let bond_rows: Vec<BondObservation> = bond_sheet
        .rows
        .iter()
        .map(|row| {
            let raw = row.values[0].as_number().unwrap();
            BondObservation {
                date: row.date,
                yield_raw: raw,
                yield_decimal: normalize_yield(raw),
            }
        })
        .collect();

    let merged: Vec<MergedObservation> = align_as_of(&bond_rows, &pe_rows, |bond, pe| {
        MergedObservation {
            date: bond.date,
            yield_raw: bond.yield_raw,
            pe: pe.pe,
            close: pe.close,
        }
    })
    .unwrap();
    assert_eq!(merged.len(), 5);
    assert_eq!(merged[0].date, date(2020, 1, 2));
    assert_eq!(merged[0].pe, 14.0);

    let yield_decimals: BTreeMap<NaiveDate, f64> = bond_rows
        .iter()
        .map(|row| (row.date, row.yield_decimal))
        .collect();
    let erp_rows = compute_erp(&merged, &yield_decimals).unwrap();
    assert_eq!(erp_rows.len(), 5);
    let expected_first = (1.0 + 1.0 / 14.0) / (1.0 + 0.031) - 1.0;
    assert!((erp_rows[0].erp - expected_first).abs() < 1e-12);

    let erp_values: Vec<f64> = erp_rows.iter().map(|row| row.erp).collect();
    let bands = rolling_bands(&erp_values, 3).unwrap();
    assert_eq!(bands.len(), 3);
    // Each band row belongs to the date closing its window.
    assert_eq!(erp_rows[2].date, date(2020, 1, 6));
    let mut window: Vec<f64> = erp_values[..3].to_vec();
    window.sort_by(|a, b| a.total_cmp(b));
    assert_eq!(bands[0].median, window[1]);

    let dates: Vec<NaiveDate> = erp_rows.iter().map(|row| row.date).collect();
    let stats = interval_bands(&dates, &erp_values, date(2020, 1, 4), date(2020, 1, 31)).unwrap();
    assert_eq!(stats.used_start, date(2020, 1, 6));
    assert_eq!(stats.used_end, date(2020, 1, 8));
    assert_eq!(stats.earliest, date(2020, 1, 2));
    assert_eq!(stats.latest, date(2020, 1, 8));
}

#[test]
fn misordered_input_is_sorted_before_alignment() {
    let mut rows = pe_grid();
    rows[1..].reverse();
    let sheet = clean_sheet(&rows, &pe_schema(), DateSystem::Excel1900).unwrap();
    let dates: Vec<NaiveDate> = sheet.rows.iter().map(|row| row.date).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
}

#[test]
fn serial_dates_flow_through_the_same_pipeline() {
    let mut rows = pe_grid();
    // 43832 is 2020-01-02 in the 1900 system.
    rows[1][0] = Cell::from(43832.0);
    let sheet = clean_sheet(&rows, &pe_schema(), DateSystem::Excel1900).unwrap();
    assert_eq!(sheet.rows[0].date, date(2020, 1, 2));
}
