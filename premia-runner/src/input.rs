//! Input discovery and CSV cell loading.
//!
//! Source files are CSV extracts dropped into an input directory. Lookup
//! is by logical stem: case-insensitive, with runs of whitespace collapsed,
//! so `data_PE.csv` and `Data_PE .csv` both answer for `data_PE`. Editor
//! lock files (`~$` prefix) are ignored.

use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;

use premia_core::domain::Cell;
use premia_core::ErrorKind;

const INPUT_EXTENSION: &str = "csv";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input directory {0} does not exist")]
    MissingDirectory(PathBuf),
    #[error("no file matching {stem}.{INPUT_EXTENSION} in the input directory")]
    NotFound { stem: String },
    #[error("{count} files match {stem}.{INPUT_EXTENSION}; keep exactly one")]
    Ambiguous { stem: String, count: usize },
    #[error("cannot read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
}

impl InputError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InputError::MissingDirectory(_) | InputError::NotFound { .. } => ErrorKind::NotFound,
            InputError::Ambiguous { .. } => ErrorKind::Validation,
            InputError::Io(_) | InputError::Csv(_) => ErrorKind::Internal,
        }
    }
}

fn normalize_stem(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Locate the single input file whose stem matches `stem`.
pub fn find_input_file(input_dir: &Path, stem: &str) -> Result<PathBuf, InputError> {
    if !input_dir.is_dir() {
        return Err(InputError::MissingDirectory(input_dir.to_path_buf()));
    }
    let wanted = normalize_stem(stem);
    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if name.starts_with("~$") {
            continue;
        }
        let extension_matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(INPUT_EXTENSION));
        if !extension_matches {
            continue;
        }
        let stem_matches = path
            .file_stem()
            .and_then(|candidate| candidate.to_str())
            .is_some_and(|candidate| normalize_stem(candidate) == wanted);
        if stem_matches {
            candidates.push(path);
        }
    }
    match candidates.len() {
        0 => Err(InputError::NotFound {
            stem: stem.to_string(),
        }),
        1 => Ok(candidates.remove(0)),
        count => Err(InputError::Ambiguous {
            stem: stem.to_string(),
            count,
        }),
    }
}

/// Parse one CSV field into a cell. Numbers and booleans are recognized;
/// everything else stays text.
fn parse_field(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::Blank;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Cell::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Cell::Bool(false);
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        return Cell::Number(value);
    }
    Cell::Text(field.to_string())
}

/// Read a CSV file into a raw cell grid. No header handling here; the
/// sheet cleaner owns that.
pub fn read_cell_rows(path: &Path) -> Result<Vec<Vec<Cell>>, InputError> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(parse_field).collect());
    }
    Ok(rows)
}
