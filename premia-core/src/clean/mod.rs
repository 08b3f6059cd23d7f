//! Input validation and sheet cleaning.

pub mod cell;
pub mod dates;
pub mod schema;
pub mod sheet;

pub use cell::{coerce_number, is_garbled, validate_header, validate_text_or_number, CellError};
pub use dates::{parse_date, DateError, DateSystem};
pub use schema::{ColumnRule, HeaderRule, Retain, RowPolicy, SheetSchema, ValueKind, Width};
pub use sheet::{clean_sheet, column_letter, coordinate, CleanedRow, CleanedSheet};
