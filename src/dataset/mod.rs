//! Survey data loading.
//!
//! [`DatasetSource`] is the seam between the engine and wherever the data
//! comes from. [`FileSource`] picks a reader by filename suffix and turns
//! the resulting [`RawTable`] into a typed [`Dataset`]. [`DatasetHandle`]
//! keeps a loaded dataset and reloads it when the file changes.

mod delimited;
mod handle;
pub mod response;
pub mod schema;
mod spreadsheet;
pub mod table;

pub use delimited::{decode_text, parse_delimited};
pub use handle::DatasetHandle;
pub use response::{Response, ResponseSet};
pub use schema::{CLASSIFICATION_DIMENSION, DimensionRef, Schema};
pub use table::RawTable;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::config::{ColumnNames, Settings};
use crate::error::DatasetError;

/// All responses of one source, plus the schema inferred for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    schema: Schema,
    responses: Vec<Response>,
}

impl Dataset {
    pub fn new(schema: Schema, responses: Vec<Response>) -> Self {
        Self { schema, responses }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// A response set over every record, in source order.
    pub fn all(&self) -> ResponseSet<'_> {
        ResponseSet::new(&self.schema, self.responses.iter().collect())
    }

    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.all().date_bounds()
    }
}

/// Anything able to produce a [`Dataset`].
pub trait DatasetSource {
    fn load(&self) -> Result<Dataset, DatasetError>;
}

/// On-disk encodings understood by [`FileSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited,
    GzipDelimited,
    Spreadsheet,
}

impl SourceFormat {
    /// Detects the format from the filename suffix, case-insensitively.
    pub fn detect(path: &Path) -> Option<SourceFormat> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".csv.gz") || name.ends_with(".txt.gz") {
            Some(SourceFormat::GzipDelimited)
        } else if name.ends_with(".csv") || name.ends_with(".txt") {
            Some(SourceFormat::Delimited)
        } else if [".xlsx", ".xlsm", ".xlsb", ".xls", ".ods"]
            .iter()
            .any(|ext| name.ends_with(ext))
        {
            Some(SourceFormat::Spreadsheet)
        } else {
            None
        }
    }
}

/// A survey file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
    columns: ColumnNames,
    delimiter: u8,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnNames, delimiter: u8) -> Self {
        Self {
            path: path.into(),
            columns,
            delimiter,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.data_file.clone(),
            settings.columns.clone(),
            settings.delimiter,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSource for FileSource {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Dataset, DatasetError> {
        if !self.path.exists() {
            return Err(DatasetError::MissingSource(self.path.clone()));
        }
        let format = SourceFormat::detect(&self.path)
            .ok_or_else(|| DatasetError::UnsupportedFormat(self.path.clone()))?;

        let table = match format {
            SourceFormat::Delimited => delimited::read_delimited(&self.path, self.delimiter, false)?,
            SourceFormat::GzipDelimited => {
                delimited::read_delimited(&self.path, self.delimiter, true)?
            }
            SourceFormat::Spreadsheet => spreadsheet::read_spreadsheet(&self.path)?,
        };

        let dataset = table.into_dataset(&self.columns)?;
        info!(
            ?format,
            responses = dataset.len(),
            criteria = dataset.schema().criteria().len(),
            dimensions = dataset.schema().dimensions().len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }
}
