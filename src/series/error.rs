use chrono::Duration;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("Bucket width must be positive, got {0}")]
    NonPositiveWidth(Duration),

    #[error("Bucket width must be a whole number of milliseconds, got {0}")]
    SubMillisecondWidth(Duration),

    #[error("Bucket start for index {0} is outside the representable time range")]
    OutOfRange(i64),

    #[error("Shifting by {0} moves timestamps outside the representable time range")]
    OffsetOutOfRange(Duration),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create output directory '{0}'")]
    OutputDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Output path exists but is not a directory: '{0}'")]
    NotADirectory(PathBuf),

    #[error("I/O error writing file '{0}'")]
    WriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing CSV file '{0}'")]
    CsvWritePolars(PathBuf, #[source] PolarsError),

    #[error("Failed building DataFrame: {0}")]
    DataFrame(#[from] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
