//! Crate-wide error taxonomy.
//!
//! Validation errors are coordinate-tagged (`D12` style) where a sheet cell
//! is at fault. `InternalInconsistency` and `NegativeVariance` are invariant
//! guards: they signal a bug or numerical corruption, never bad input.

use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

use crate::clean::cell::CellError;
use crate::clean::dates::DateError;

/// Coarse classification crossing the process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}

/// Which bound of a requested interval was at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Start,
    End,
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeBound::Start => write!(f, "start date"),
            RangeBound::End => write!(f, "end date"),
        }
    }
}

/// Why a header cell was rejected.
#[derive(Debug, Error)]
pub enum HeaderReason {
    #[error("header row missing")]
    MissingRow,
    #[error("header row is entirely blank")]
    BlankRow,
    #[error(transparent)]
    Cell(#[from] CellError),
    #[error("expected {expected:?}, found {actual:?}")]
    Mismatch { expected: String, actual: String },
    #[error("expected a label containing {marker:?}, found {actual:?}")]
    MissingMarker { marker: String, actual: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{coordinate}: invalid cell: {source}")]
    InvalidCell {
        coordinate: String,
        #[source]
        source: CellError,
    },

    #[error("{coordinate}: invalid header: {reason}")]
    InvalidHeader {
        coordinate: String,
        reason: HeaderReason,
    },

    #[error("{coordinate}: invalid date: {source}")]
    InvalidDate {
        coordinate: String,
        #[source]
        source: DateError,
    },

    #[error("{coordinate}: invalid number: {source}")]
    InvalidNumber {
        coordinate: String,
        #[source]
        source: CellError,
    },

    #[error("no data rows survived cleaning")]
    EmptyResult,

    #[error("secondary series exhausted while aligning primary date {primary_date}")]
    AlignmentExhausted { primary_date: NaiveDate },

    #[error("insufficient data: a window of {required} needs {required} rows, found {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("{bound} {requested} is outside the data range {earliest} to {latest}")]
    OutOfRange {
        bound: RangeBound,
        requested: NaiveDate,
        earliest: NaiveDate,
        latest: NaiveDate,
    },

    #[error("range inverted after snapping: start {used_start} is after end {used_end}")]
    InvertedRange {
        used_start: NaiveDate,
        used_end: NaiveDate,
    },

    #[error("window size must be a positive integer")]
    InvalidWindow,

    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("negative variance {0} indicates numerical corruption")]
    NegativeVariance(f64),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidCell { .. }
            | Error::InvalidHeader { .. }
            | Error::InvalidDate { .. }
            | Error::InvalidNumber { .. }
            | Error::EmptyResult
            | Error::AlignmentExhausted { .. }
            | Error::InsufficientData { .. }
            | Error::OutOfRange { .. }
            | Error::InvertedRange { .. }
            | Error::InvalidWindow => ErrorKind::Validation,
            Error::InternalInconsistency(_) | Error::NegativeVariance(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
