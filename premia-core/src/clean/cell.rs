//! Cell-level validation and numeric coercion.
//!
//! These are pure functions over a single [`Cell`]; coordinates are attached
//! by the sheet cleaner, not here.

use thiserror::Error;

use crate::domain::{Cell, Scalar};

/// Why a single cell failed validation, without its sheet coordinate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CellError {
    #[error("cell is blank")]
    Blank,
    #[error("boolean cells are not supported")]
    Boolean,
    #[error("number is NaN or infinite")]
    NotFinite,
    #[error("text contains a replacement or control character")]
    Garbled,
    #[error("unsupported {0} cell")]
    Unsupported(&'static str),
    #[error("cannot parse {0:?} as a number")]
    UnparsableNumber(String),
}

/// True when text carries U+FFFD or a C0 control character other than
/// tab/CR/LF, the telltale signs of a mis-decoded source file.
pub fn is_garbled(text: &str) -> bool {
    text.chars().any(|ch| {
        ch == '\u{FFFD}' || (ch < '\u{20}' && !matches!(ch, '\t' | '\n' | '\r'))
    })
}

/// Validate a data cell into a finite number or trimmed text.
pub fn validate_text_or_number(cell: &Cell) -> Result<Scalar, CellError> {
    match cell {
        Cell::Blank => Err(CellError::Blank),
        Cell::Bool(_) => Err(CellError::Boolean),
        Cell::Number(value) => {
            if value.is_finite() {
                Ok(Scalar::Number(*value))
            } else {
                Err(CellError::NotFinite)
            }
        }
        Cell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(CellError::Blank);
            }
            if is_garbled(trimmed) {
                return Err(CellError::Garbled);
            }
            Ok(Scalar::Text(trimmed.to_string()))
        }
        other @ (Cell::Date(_) | Cell::DateTime(_)) => {
            Err(CellError::Unsupported(other.type_name()))
        }
    }
}

/// Validate a header cell: same rules as text, but the type must be textual.
pub fn validate_header(cell: &Cell) -> Result<String, CellError> {
    match cell {
        Cell::Blank => Err(CellError::Blank),
        Cell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(CellError::Blank);
            }
            if is_garbled(trimmed) {
                return Err(CellError::Garbled);
            }
            Ok(trimmed.to_string())
        }
        other => Err(CellError::Unsupported(other.type_name())),
    }
}

/// Coerce a cell to a finite number. Text may carry thousands separators
/// and a trailing percent sign; both are stripped before parsing. The
/// percent sign is notation only, no rescaling happens here.
pub fn coerce_number(cell: &Cell) -> Result<f64, CellError> {
    match cell {
        Cell::Blank => Err(CellError::Blank),
        Cell::Bool(_) => Err(CellError::Boolean),
        Cell::Number(value) => {
            if value.is_finite() {
                Ok(*value)
            } else {
                Err(CellError::NotFinite)
            }
        }
        Cell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(CellError::Blank);
            }
            if is_garbled(trimmed) {
                return Err(CellError::Garbled);
            }
            let mut cleaned = trimmed.replace(',', "");
            if let Some(stripped) = cleaned.strip_suffix('%') {
                cleaned = stripped.trim().to_string();
            }
            match cleaned.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(CellError::UnparsableNumber(trimmed.to_string())),
            }
        }
        other @ (Cell::Date(_) | Cell::DateTime(_)) => {
            Err(CellError::Unsupported(other.type_name()))
        }
    }
}
