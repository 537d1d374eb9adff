use crate::dataset::Dataset;
use crate::error::DatasetError;
use crate::loader::read_records;
use chrono::{DateTime, Local};
use std::fs::File;
use std::path::{Path, PathBuf};

/// An ordered list of places the engineered-features file may live.
#[derive(Debug, Clone)]
pub struct DataSource {
    candidates: Vec<PathBuf>,
}

impl DataSource {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Returns the first candidate that exists as a regular file.
    pub fn locate(&self) -> Result<&Path, DatasetError> {
        self.candidates
            .iter()
            .find(|p| p.is_file())
            .map(PathBuf::as_path)
            .ok_or_else(|| DatasetError::NotFound {
                searched: self.candidates.clone(),
            })
    }

    /// Locates and loads the file.
    pub fn load(&self) -> Result<Dataset, DatasetError> {
        let path = self.locate()?;
        load_dataset(path)
    }
}

/// Loads a dataset from a known path.
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let io_error = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;
    let modified_at = file
        .metadata()
        .and_then(|m| m.modified())
        .map(DateTime::<Local>::from)
        .ok();

    let loaded = read_records(file)?;
    if loaded.records.is_empty() {
        return Err(DatasetError::NoRecords(path.to_path_buf()));
    }

    tracing::info!(
        path = %path.display(),
        records = loaded.records.len(),
        skipped = loaded.skipped_rows,
        regime_source = ?loaded.schema.regime_source,
        "Dataset loaded."
    );

    Ok(Dataset {
        source_path: path.to_path_buf(),
        modified_at,
        schema: loaded.schema,
        records: loaded.records,
        skipped_rows: loaded.skipped_rows,
    })
}
