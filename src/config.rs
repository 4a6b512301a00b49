//! Runtime settings read from the environment.
//!
//! `.env` is loaded by the binary before [`Settings::from_env`] runs; CLI flags
//! override whatever the environment provides.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

pub const DEFAULT_DATA_FILE: &str = "NPS Dados 2025.1.xlsx";
pub const DEFAULT_RATING_COLUMN: &str = "NPS Quantitativo";
pub const DEFAULT_DATE_COLUMN: &str = "Data";
pub const DEFAULT_COMMENT_COLUMN: &str = "Justificativa";
pub const DEFAULT_COMMENT_TAIL: usize = 10;

/// Source column names that are renamed to the canonical reserved fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub rating: String,
    pub timestamp: String,
    pub comment: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            rating: DEFAULT_RATING_COLUMN.to_string(),
            timestamp: DEFAULT_DATE_COLUMN.to_string(),
            comment: DEFAULT_COMMENT_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_file: PathBuf,
    pub columns: ColumnNames,
    pub delimiter: u8,
    pub comment_tail: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            columns: ColumnNames::default(),
            delimiter: b';',
            comment_tail: DEFAULT_COMMENT_TAIL,
        }
    }
}

impl Settings {
    /// Reads `NPS_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup, falling back to defaults
    /// for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Settings::default();

        if let Some(path) = lookup("NPS_DATA_FILE") {
            settings.data_file = PathBuf::from(path);
        }
        if let Some(name) = lookup("NPS_RATING_COLUMN") {
            settings.columns.rating = name;
        }
        if let Some(name) = lookup("NPS_DATE_COLUMN") {
            settings.columns.timestamp = name;
        }
        if let Some(name) = lookup("NPS_COMMENT_COLUMN") {
            settings.columns.comment = name;
        }
        if let Some(raw) = lookup("NPS_CSV_DELIMITER") {
            settings.delimiter = parse_delimiter(&raw)?;
        }
        if let Some(raw) = lookup("NPS_COMMENT_TAIL") {
            settings.comment_tail = raw
                .trim()
                .parse()
                .with_context(|| format!("NPS_COMMENT_TAIL must be a number, got '{raw}'"))?;
        }

        Ok(settings)
    }
}

/// Accepts a single ASCII character, or the words `tab`/`\t`.
pub fn parse_delimiter(raw: &str) -> Result<u8> {
    match raw {
        "tab" | "\\t" | "\t" => return Ok(b'\t'),
        _ => {}
    }
    let bytes = raw.as_bytes();
    if bytes.len() != 1 || !bytes[0].is_ascii() {
        bail!("delimiter must be a single ASCII character, got '{raw}'");
    }
    Ok(bytes[0])
}
