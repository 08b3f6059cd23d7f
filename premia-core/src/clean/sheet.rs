//! Schema-driven sheet cleaning.
//!
//! Takes the raw cell grid of one sheet, validates it against a
//! [`SheetSchema`], and produces a date-sorted [`CleanedSheet`]. All errors
//! carry the spreadsheet coordinate (`D12` style) of the offending cell.

use chrono::NaiveDate;

use crate::clean::cell::{coerce_number, validate_header, validate_text_or_number};
use crate::clean::dates::{parse_date, DateSystem};
use crate::clean::schema::{HeaderRule, RowPolicy, SheetSchema, ValueKind, Width};
use crate::domain::{Cell, Scalar};
use crate::error::{Error, HeaderReason, Result};

/// One surviving data row. `values` holds the retained non-date columns in
/// schema order; the date column is lifted out as `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRow {
    pub date: NaiveDate,
    pub values: Vec<Scalar>,
}

/// A cleaned sheet: validated header labels for the retained columns plus
/// the surviving rows, sorted by date (stable, so same-date rows keep their
/// source order).
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSheet {
    pub header: Vec<String>,
    pub rows: Vec<CleanedRow>,
}

/// Spreadsheet-style coordinate for a 1-based column and row.
pub fn coordinate(column: usize, row: usize) -> String {
    format!("{}{row}", column_letter(column))
}

/// 1-based column index to its letter label (1 = A, 27 = AA).
pub fn column_letter(column: usize) -> String {
    debug_assert!(column >= 1);
    let mut remaining = column;
    let mut letters = Vec::new();
    while remaining > 0 {
        remaining -= 1;
        letters.push(b'A' + (remaining % 26) as u8);
        remaining /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn last_nonblank_column(row: &[Cell]) -> usize {
    row.iter()
        .rposition(|cell| !cell.is_blank())
        .map(|index| index + 1)
        .unwrap_or(0)
}

fn cell_at(row: &[Cell], column: usize) -> &Cell {
    row.get(column - 1).unwrap_or(&Cell::Blank)
}

/// Clean a raw cell grid against a schema. The first row is the header;
/// every later row is data. Rows whose retained cells are all blank are
/// skipped without error.
pub fn clean_sheet(
    rows: &[Vec<Cell>],
    schema: &SheetSchema,
    system: DateSystem,
) -> Result<CleanedSheet> {
    let header_row = rows.first().ok_or_else(|| Error::InvalidHeader {
        coordinate: coordinate(1, 1),
        reason: HeaderReason::MissingRow,
    })?;

    let width = match schema.width {
        Width::Fixed(width) => width,
        Width::FromHeader => {
            let width = last_nonblank_column(header_row);
            if width == 0 {
                return Err(Error::InvalidHeader {
                    coordinate: coordinate(1, 1),
                    reason: HeaderReason::BlankRow,
                });
            }
            width
        }
    };

    let retained = schema.retained_columns(width);

    let mut header = Vec::with_capacity(retained.len());
    for &column in &retained {
        let label = validate_header(cell_at(header_row, column)).map_err(|source| {
            Error::InvalidHeader {
                coordinate: coordinate(column, 1),
                reason: HeaderReason::Cell(source),
            }
        })?;
        match &schema.rule_for(column).header {
            HeaderRule::AnyText => {}
            HeaderRule::Equals(expected) => {
                if label != *expected {
                    return Err(Error::InvalidHeader {
                        coordinate: coordinate(column, 1),
                        reason: HeaderReason::Mismatch {
                            expected: expected.clone(),
                            actual: label,
                        },
                    });
                }
            }
            rule @ HeaderRule::ContainsMarker(marker) => {
                if !rule.matches(&label) {
                    return Err(Error::InvalidHeader {
                        coordinate: coordinate(column, 1),
                        reason: HeaderReason::MissingMarker {
                            marker: marker.clone(),
                            actual: label,
                        },
                    });
                }
            }
        }
        header.push(label);
    }

    let mut cleaned = Vec::new();
    for (index, row) in rows.iter().enumerate().skip(1) {
        let row_number = index + 1;
        if retained.iter().all(|&column| cell_at(row, column).is_blank()) {
            continue;
        }
        match clean_row(row, row_number, &retained, schema, system) {
            Ok(cleaned_row) => cleaned.push(cleaned_row),
            Err(error) => match schema.row_policy {
                RowPolicy::AbortFile => return Err(error),
                RowPolicy::SkipRow => continue,
            },
        }
    }

    if cleaned.is_empty() {
        return Err(Error::EmptyResult);
    }
    cleaned.sort_by_key(|row| row.date);

    Ok(CleanedSheet {
        header,
        rows: cleaned,
    })
}

fn clean_row(
    row: &[Cell],
    row_number: usize,
    retained: &[usize],
    schema: &SheetSchema,
    system: DateSystem,
) -> Result<CleanedRow> {
    let date_column = retained[0];
    let date = parse_date(cell_at(row, date_column), system).map_err(|source| {
        Error::InvalidDate {
            coordinate: coordinate(date_column, row_number),
            source,
        }
    })?;

    let mut values = Vec::with_capacity(retained.len() - 1);
    for &column in &retained[1..] {
        let cell = cell_at(row, column);
        let value = match schema.rule_for(column).kind {
            ValueKind::TextOrNumber => {
                validate_text_or_number(cell).map_err(|source| Error::InvalidCell {
                    coordinate: coordinate(column, row_number),
                    source,
                })?
            }
            ValueKind::Number => Scalar::Number(coerce_number(cell).map_err(|source| {
                Error::InvalidNumber {
                    coordinate: coordinate(column, row_number),
                    source,
                }
            })?),
        };
        values.push(value);
    }

    Ok(CleanedRow { date, values })
}
