//! Per-sheet cleaning schemas.
//!
//! One generic cleaner consumes an explicit schema value instead of a
//! near-duplicate routine per source file. A schema fixes the sheet width,
//! which columns survive, what each retained header must look like, how each
//! retained cell is validated, and whether a bad row aborts the file or is
//! dropped.

use std::collections::BTreeMap;

/// How many columns a row is padded/truncated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// Derive from the last non-blank header cell.
    FromHeader,
    /// Fixed column count, independent of the header.
    Fixed(usize),
}

/// Which 1-based columns survive cleaning. Column 1 (the date) is always
/// retained regardless of what either variant says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retain {
    /// Keep every column within the width except the listed ones.
    AllExceptDropped(Vec<usize>),
    /// Keep exactly the listed columns, in the listed order.
    Only(Vec<usize>),
}

/// What a per-cell failure does to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPolicy {
    /// First bad cell fails the whole file with a coordinate-tagged error.
    AbortFile,
    /// Bad rows are silently dropped; survivors make up the result.
    SkipRow,
}

/// What a retained column's header must look like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderRule {
    /// Any non-blank, non-corrupted text.
    AnyText,
    /// Must equal this text exactly (after trimming).
    Equals(String),
    /// Must contain the marker, or equal it case-insensitively.
    ContainsMarker(String),
}

impl HeaderRule {
    pub fn equals(text: &str) -> Self {
        HeaderRule::Equals(text.to_string())
    }

    pub fn contains_marker(marker: &str) -> Self {
        HeaderRule::ContainsMarker(marker.to_string())
    }

    /// Check an already-validated header text against the rule.
    pub(crate) fn matches(&self, actual: &str) -> bool {
        match self {
            HeaderRule::AnyText => true,
            HeaderRule::Equals(expected) => actual == expected,
            HeaderRule::ContainsMarker(marker) => {
                actual.to_lowercase().contains(&marker.to_lowercase())
                    || actual.eq_ignore_ascii_case(marker)
            }
        }
    }
}

/// How a retained data cell is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Any finite number or clean text.
    TextOrNumber,
    /// Coerced to a finite number (separators and a trailing % stripped).
    Number,
}

#[derive(Debug, Clone)]
pub struct ColumnRule {
    pub header: HeaderRule,
    pub kind: ValueKind,
}

impl Default for ColumnRule {
    fn default() -> Self {
        Self {
            header: HeaderRule::AnyText,
            kind: ValueKind::TextOrNumber,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SheetSchema {
    pub width: Width,
    pub retain: Retain,
    pub row_policy: RowPolicy,
    rules: BTreeMap<usize, ColumnRule>,
}

impl SheetSchema {
    pub fn new(width: Width, retain: Retain, row_policy: RowPolicy) -> Self {
        Self {
            width,
            retain,
            row_policy,
            rules: BTreeMap::new(),
        }
    }

    /// Attach a rule to a 1-based column.
    pub fn with_rule(mut self, column: usize, rule: ColumnRule) -> Self {
        self.rules.insert(column, rule);
        self
    }

    pub(crate) fn rule_for(&self, column: usize) -> ColumnRule {
        self.rules.get(&column).cloned().unwrap_or_default()
    }

    /// Resolve the retained 1-based column set for a sheet of `width`
    /// columns. Column 1 always comes first.
    pub(crate) fn retained_columns(&self, width: usize) -> Vec<usize> {
        let mut columns: Vec<usize> = match &self.retain {
            Retain::AllExceptDropped(dropped) => (1..=width)
                .filter(|column| !dropped.contains(column))
                .collect(),
            Retain::Only(listed) => {
                let mut seen = Vec::with_capacity(listed.len());
                for &column in listed {
                    if column >= 1 && !seen.contains(&column) {
                        seen.push(column);
                    }
                }
                seen
            }
        };
        if let Some(position) = columns.iter().position(|&column| column == 1) {
            columns.remove(position);
        }
        columns.insert(0, 1);
        columns
    }
}
