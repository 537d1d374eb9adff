use chrono::NaiveDateTime;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Data not found. Searched: {searched:?}")]
    NotFound { searched: Vec<PathBuf> },

    #[error("Failed to read data file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column '{0}' is missing from the data file")]
    MissingColumn(String),

    #[error("Cumulative PnL overflows at the record dated {0}")]
    PnlOverflow(NaiveDateTime),

    #[error("Data file '{0}' contains no usable records")]
    NoRecords(PathBuf),

    #[error("Failed to write CSV export: {0}")]
    Export(#[from] std::io::Error),
}
