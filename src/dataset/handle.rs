use std::path::Path;
use std::time::SystemTime;

use tracing::info;

use crate::dataset::{Dataset, DatasetSource, FileSource};
use crate::error::DatasetError;

/// A loaded dataset bound to the file it came from.
///
/// Reloads when the source path or the file's modification time changes.
#[derive(Debug)]
pub struct DatasetHandle {
    source: FileSource,
    modified: Option<SystemTime>,
    dataset: Dataset,
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl DatasetHandle {
    pub fn open(source: FileSource) -> Result<Self, DatasetError> {
        let modified = modified_time(source.path());
        let dataset = source.load()?;
        Ok(Self {
            source,
            modified,
            dataset,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Reloads if the file was modified since the last load. Returns whether
    /// a reload happened. On error the previous dataset is kept.
    pub fn refresh(&mut self) -> Result<bool, DatasetError> {
        let modified = modified_time(self.source.path());
        if modified.is_some() && modified == self.modified {
            return Ok(false);
        }
        self.dataset = self.source.load()?;
        self.modified = modified;
        info!(path = %self.source.path().display(), "Dataset reloaded after modification");
        Ok(true)
    }

    /// Points the handle at another source, reloading unless nothing changed.
    pub fn retarget(&mut self, source: FileSource) -> Result<bool, DatasetError> {
        if source == self.source {
            return self.refresh();
        }
        let modified = modified_time(source.path());
        self.dataset = source.load()?;
        self.source = source;
        self.modified = modified;
        info!(path = %self.source.path().display(), "Dataset reloaded from new source");
        Ok(true)
    }
}
