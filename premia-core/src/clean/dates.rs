//! Canonical date parsing across the encodings spreadsheet extracts carry.
//!
//! A date may arrive as a real date/datetime cell, as a numeric serial in
//! one of the two historical spreadsheet epochs, or as text in a handful of
//! common layouts. The epoch is always supplied by the caller; it is a
//! property of the source workbook and cannot be inferred from the data.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Cell;

/// Text layouts tried in order; first match wins. The compact `YMD` form is
/// handled separately because `%Y` parses greedily.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// Serials further out than this are garbage, not dates.
const MAX_SERIAL_MAGNITUDE: f64 = 3_000_000.0;

/// The two spreadsheet date-serial conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSystem {
    /// Serial 1 = 1900-01-01. Serials below 60 are shifted up one day to
    /// absorb the phantom 1900-02-29 the convention inherited.
    Excel1900,
    /// Serial 0 = 1904-01-01.
    Excel1904,
}

impl DateSystem {
    /// Convert a numeric serial to a calendar date, dropping any
    /// fractional time-of-day.
    pub fn serial_to_date(self, serial: f64) -> Result<NaiveDate, DateError> {
        if !serial.is_finite() {
            return Err(DateError::NotFinite);
        }
        if serial.abs() > MAX_SERIAL_MAGNITUDE {
            return Err(DateError::SerialOutOfRange(serial));
        }
        let mut days = serial.floor() as i64;
        let base = match self {
            DateSystem::Excel1900 => {
                if days < 60 {
                    days += 1;
                }
                NaiveDate::from_ymd_opt(1899, 12, 30).expect("valid epoch")
            }
            DateSystem::Excel1904 => NaiveDate::from_ymd_opt(1904, 1, 1).expect("valid epoch"),
        };
        base.checked_add_signed(Duration::days(days))
            .ok_or(DateError::SerialOutOfRange(serial))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DateError {
    #[error("date cell is blank")]
    Blank,
    #[error("booleans are not valid dates")]
    Boolean,
    #[error("date serial is NaN or infinite")]
    NotFinite,
    #[error("serial {0} is outside the representable calendar")]
    SerialOutOfRange(f64),
    #[error("cannot parse {0:?} as a date")]
    Unparsable(String),
}

/// Parse any supported date encoding into a canonical calendar date.
pub fn parse_date(cell: &Cell, system: DateSystem) -> Result<NaiveDate, DateError> {
    match cell {
        Cell::Date(date) => Ok(*date),
        Cell::DateTime(datetime) => Ok(datetime.date()),
        Cell::Bool(_) => Err(DateError::Boolean),
        Cell::Number(serial) => system.serial_to_date(*serial),
        Cell::Text(text) => parse_date_text(text),
        Cell::Blank => Err(DateError::Blank),
    }
}

fn parse_date_text(text: &str) -> Result<NaiveDate, DateError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DateError::Blank);
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    if let Some(date) = parse_compact_ymd(trimmed) {
        return Ok(date);
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(datetime.date());
        }
    }
    // Last resort: strict ISO-8601.
    trimmed
        .parse::<NaiveDate>()
        .map_err(|_| DateError::Unparsable(trimmed.to_string()))
}

/// Eight ASCII digits read as YYYYMMDD.
fn parse_compact_ymd(text: &str) -> Option<NaiveDate> {
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = text[..4].parse().ok()?;
    let month: u32 = text[4..6].parse().ok()?;
    let day: u32 = text[6..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serial_conversion_1900_system() {
        let sys = DateSystem::Excel1900;
        assert_eq!(sys.serial_to_date(1.0).unwrap(), date(1900, 1, 1));
        assert_eq!(sys.serial_to_date(44197.0).unwrap(), date(2021, 1, 1));
        // Fractional time-of-day is dropped.
        assert_eq!(sys.serial_to_date(44197.75).unwrap(), date(2021, 1, 1));
    }

    #[test]
    fn serial_conversion_straddles_leap_bug() {
        let sys = DateSystem::Excel1900;
        assert_eq!(sys.serial_to_date(59.0).unwrap(), date(1900, 2, 28));
        assert_eq!(sys.serial_to_date(61.0).unwrap(), date(1900, 3, 1));
    }

    #[test]
    fn serial_conversion_1904_system() {
        let sys = DateSystem::Excel1904;
        assert_eq!(sys.serial_to_date(0.0).unwrap(), date(1904, 1, 1));
        assert_eq!(sys.serial_to_date(36526.0).unwrap(), date(2004, 1, 2));
    }

    #[test]
    fn serial_rejects_non_finite_and_absurd() {
        let sys = DateSystem::Excel1900;
        assert_eq!(sys.serial_to_date(f64::NAN), Err(DateError::NotFinite));
        assert_eq!(
            sys.serial_to_date(1e12),
            Err(DateError::SerialOutOfRange(1e12))
        );
    }

    #[test]
    fn text_formats_in_order() {
        let sys = DateSystem::Excel1900;
        for raw in [
            "2020-01-02",
            "2020/01/02",
            "2020.01.02",
            "20200102",
            "2020-01-02 10:30:00",
            "2020/01/02 10:30:00",
            "  2020-01-02  ",
        ] {
            assert_eq!(
                parse_date(&Cell::Text(raw.into()), sys).unwrap(),
                date(2020, 1, 2),
                "failed for {raw:?}"
            );
        }
    }

    #[test]
    fn datetime_cell_drops_time() {
        let dt = date(2020, 1, 2).and_hms_opt(15, 0, 0).unwrap();
        assert_eq!(
            parse_date(&Cell::DateTime(dt), DateSystem::Excel1900).unwrap(),
            date(2020, 1, 2)
        );
    }

    #[test]
    fn rejects_blank_bool_and_noise() {
        let sys = DateSystem::Excel1900;
        assert_eq!(parse_date(&Cell::Blank, sys), Err(DateError::Blank));
        assert_eq!(
            parse_date(&Cell::Text("   ".into()), sys),
            Err(DateError::Blank)
        );
        assert_eq!(parse_date(&Cell::Bool(true), sys), Err(DateError::Boolean));
        assert_eq!(
            parse_date(&Cell::Text("yesterday".into()), sys),
            Err(DateError::Unparsable("yesterday".into()))
        );
    }
}
