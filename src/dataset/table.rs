//! Conversion of a raw text table into a typed [`Dataset`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::config::ColumnNames;
use crate::dataset::Dataset;
use crate::dataset::response::Response;
use crate::dataset::schema::{
    ColumnKind, RATING_COLUMN, Schema, TIMESTAMP_COLUMN, infer_kind, is_reserved, parse_number,
};
use crate::error::DatasetError;

/// Header plus text cells, as produced by every format reader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    fn cell<'r>(&self, row: &'r [String], column: usize) -> &'r str {
        row.get(column).map(|c| c.trim()).unwrap_or("")
    }

    fn find_column(&self, names: &[&str]) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| names.contains(&h.trim()))
    }

    /// Renames the configured columns to their canonical fields, infers the
    /// schema, and parses every non-blank row.
    pub fn into_dataset(self, columns: &ColumnNames) -> Result<Dataset, DatasetError> {
        let rating_col = self
            .find_column(&[columns.rating.as_str(), RATING_COLUMN])
            .ok_or_else(|| DatasetError::MissingColumn {
                column: columns.rating.clone(),
            })?;
        let date_col = self
            .find_column(&[columns.timestamp.as_str(), TIMESTAMP_COLUMN])
            .ok_or_else(|| DatasetError::MissingColumn {
                column: columns.timestamp.clone(),
            })?;
        let comment_col = self.find_column(&[columns.comment.as_str()]);

        let rows: Vec<&Vec<String>> = self
            .rows
            .iter()
            .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
            .collect();

        let mut criteria = Vec::new();
        let mut dimensions = Vec::new();
        for (index, header) in self.headers.iter().enumerate() {
            let name = header.trim();
            if index == rating_col
                || index == date_col
                || Some(index) == comment_col
                || name.is_empty()
                || is_reserved(name)
            {
                continue;
            }
            match infer_kind(rows.iter().map(|row| self.cell(row, index))) {
                ColumnKind::Criterion => criteria.push((index, name.to_string())),
                ColumnKind::Dimension => dimensions.push((index, name.to_string())),
            }
        }

        debug!(
            criteria = ?criteria.iter().map(|(_, n)| n).collect::<Vec<_>>(),
            dimensions = ?dimensions.iter().map(|(_, n)| n).collect::<Vec<_>>(),
            has_comment = comment_col.is_some(),
            "Schema inferred"
        );

        let mut responses = Vec::with_capacity(rows.len());
        for (offset, row) in rows.iter().enumerate() {
            // header is row 1
            let row_number = offset + 2;

            let raw_date = self.cell(row, date_col);
            let timestamp = parse_date(raw_date).ok_or_else(|| DatasetError::InvalidDate {
                row: row_number,
                value: raw_date.to_string(),
            })?;

            let raw_rating = self.cell(row, rating_col);
            let rating = parse_rating(raw_rating).ok_or_else(|| DatasetError::InvalidRating {
                row: row_number,
                value: raw_rating.to_string(),
            })?;

            let scores = criteria
                .iter()
                .map(|(index, _)| parse_number(self.cell(row, *index)))
                .collect();
            let values = dimensions
                .iter()
                .map(|(index, _)| non_blank(self.cell(row, *index)))
                .collect();
            let comment = comment_col.and_then(|index| non_blank(self.cell(row, index)));

            responses.push(Response::new(timestamp, rating, scores, values, comment));
        }

        let schema = Schema::new(
            criteria.into_iter().map(|(_, n)| n).collect(),
            dimensions.into_iter().map(|(_, n)| n).collect(),
            comment_col.map(|index| self.headers[index].trim().to_string()),
        );

        Ok(Dataset::new(schema, responses))
    }
}

fn non_blank(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parses the calendar date out of a date or date-time string.
///
/// Slash-separated dates are read day first.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    None
}

/// Parses an integral rating in `0..=10`; integral floats such as `9.0` are
/// accepted.
pub fn parse_rating(value: &str) -> Option<u8> {
    let value = value.trim();
    if let Ok(rating) = value.parse::<u8>() {
        return (rating <= 10).then_some(rating);
    }
    let float = parse_number(value)?;
    if float.fract() != 0.0 || !(0.0..=10.0).contains(&float) {
        return None;
    }
    Some(float as u8)
}
