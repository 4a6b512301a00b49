//! Error types for loading survey data and running analyses.
//!
//! [`DatasetError`] is fatal for an analysis pass: nothing renders when the
//! source cannot be loaded. [`AnalysisError`] only degrades the section that
//! raised it. [`FilterError`] rejects filter arguments before any analysis.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("data file '{}' not found", .0.display())]
    MissingSource(PathBuf),

    #[error("unsupported file format for '{}' (expected .csv, .csv.gz, .xlsx, .xls or .ods)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("source has no sheets or no header row")]
    EmptySource,

    #[error("required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("row {row}: '{value}' is not a valid date")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: '{value}' is not a rating between 0 and 10")]
    InvalidRating { row: usize, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("'{0}' is not a categorical column of this dataset")]
    UnknownDimension(String),

    #[error("'{0}' is not a numeric criterion column of this dataset")]
    UnknownCriterion(String),

    #[error("no numeric criterion columns were found in the data")]
    NoCriteria,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("expected COLUMN=V1,V2 for a multi-select, got '{0}'")]
    MalformedSelect(String),
}
