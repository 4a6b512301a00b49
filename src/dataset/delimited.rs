//! Reader for delimited text exports (`.csv`, `.txt`, `.csv.gz`).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use tracing::debug;

use crate::dataset::table::RawTable;
use crate::error::DatasetError;

/// Reads a delimited file, gunzipping it first when `gzip` is set.
pub fn read_delimited(path: &Path, delimiter: u8, gzip: bool) -> Result<RawTable, DatasetError> {
    let file = File::open(path)?;
    let mut bytes = Vec::new();
    if gzip {
        GzDecoder::new(file).read_to_end(&mut bytes)?;
    } else {
        let mut file = file;
        file.read_to_end(&mut bytes)?;
    }
    debug!(bytes = bytes.len(), gzip, "Delimited source read");

    parse_delimited(&decode_text(&bytes), delimiter)
}

/// Parses delimited text whose first record is the header row.
pub fn parse_delimited(text: &str, delimiter: u8) -> Result<RawTable, DatasetError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(DatasetError::EmptySource);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}

/// Decodes UTF-8 when valid, otherwise Latin-1 where every byte is its own
/// code point.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
