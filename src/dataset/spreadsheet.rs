//! Reader for workbook files. Only the first worksheet is used.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::debug;

use crate::dataset::table::RawTable;
use crate::error::DatasetError;

pub fn read_spreadsheet(path: &Path) -> Result<RawTable, DatasetError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DatasetError::EmptySource)??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(DatasetError::EmptySource)?
        .iter()
        .map(cell_text)
        .collect();

    let rows: Vec<Vec<String>> = rows.map(|row| row.iter().map(cell_text).collect()).collect();
    debug!(columns = headers.len(), rows = rows.len(), "Worksheet read");

    Ok(RawTable::new(headers, rows))
}

/// Renders a cell the way a delimited export would have written it.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
