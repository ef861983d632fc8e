use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{mapping::MappingError, sink::SinkError};

/// Failures that abort a whole ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV file not found at: {path:?}")]
    NotFound { path: PathBuf },
    #[error("failed to open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("CSV file is empty: {path:?}")]
    EmptyInput { path: PathBuf },
    #[error("cannot decode the header row of {path:?} as {encoding}")]
    HeaderDecode {
        path: PathBuf,
        encoding: &'static str,
    },
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("unknown encoding '{0}'")]
    UnknownEncoding(String),
    #[error("database insertion failed for {records} record(s): {source}")]
    Persistence {
        records: usize,
        #[source]
        source: SinkError,
    },
}

impl IngestError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, IngestError::NotFound { .. })
    }
}

/// Failures confined to a single data row; the row is dropped and the run continues.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("malformed record: {0}")]
    Read(#[source] csv::Error),
    #[error("cannot decode field {field} as {encoding}")]
    Decode {
        field: usize,
        encoding: &'static str,
    },
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// A dropped row and the reason it was dropped.
#[derive(Debug, Error)]
#[error("row {row_number}: {error}")]
pub struct RowFailure {
    /// 1-based line position, counting the header row.
    pub row_number: usize,
    #[source]
    pub error: RowError,
}
