use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading CSV files into the database.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The input directory does not exist. The run is aborted before the
    /// database is touched.
    #[error("data folder not found: {}", path.display())]
    Configuration { path: PathBuf },

    /// Parsing or writing one file failed. The run continues with the next file.
    #[error("failed to process {file}: {source}")]
    FileProcessing {
        file: String,
        #[source]
        source: Box<EngineError>,
    },

    #[error("CSV file has no header row")]
    EmptyHeader,

    #[error("data row {row} has {found} fields, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid table name {name:?}: {reason}")]
    InvalidTableName { name: String, reason: &'static str },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Database(#[from] duckdb::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
