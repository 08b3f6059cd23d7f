//! Raw spreadsheet cells and their validated form.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A raw cell value as handed over by the extraction layer.
///
/// `Bool` exists only so validation can reject it explicitly; spreadsheet
/// exports routinely contain stray TRUE/FALSE cells. `DateTime` carries a
/// time-of-day that the date parser drops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Blank,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Blank means an empty cell or text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Blank => true,
            Cell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Cell::Blank => "blank",
            Cell::Bool(_) => "boolean",
            Cell::Number(_) => "number",
            Cell::Text(_) => "text",
            Cell::Date(_) => "date",
            Cell::DateTime(_) => "datetime",
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// A validated cell: a finite number or trimmed, non-corrupted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(value) => Some(*value),
            Scalar::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(text) => Some(text),
            Scalar::Number(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detection_covers_whitespace_text() {
        assert!(Cell::Blank.is_blank());
        assert!(Cell::Text("   ".into()).is_blank());
        assert!(Cell::Text("\t\n".into()).is_blank());
        assert!(!Cell::Text("x".into()).is_blank());
        assert!(!Cell::Number(0.0).is_blank());
        assert!(!Cell::Bool(false).is_blank());
    }

    #[test]
    fn scalar_accessors() {
        assert_eq!(Scalar::Number(1.5).as_number(), Some(1.5));
        assert_eq!(Scalar::Number(1.5).as_text(), None);
        assert_eq!(Scalar::Text("pe".into()).as_text(), Some("pe"));
    }
}
