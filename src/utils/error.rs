// Error handling utilities
// Author: Gabriel Demetrios Lafis

use thiserror::Error;

use crate::data::DataError;
use crate::processing::ProcessingError;
use crate::report::ReportError;
use crate::storage::StorageError;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read CSV file: {0}")]
    Data(#[from] DataError),
    #[error("Parsing of the report definition failed: {0}")]
    Report(#[from] ReportError),
    #[error("Error processing data: {0}")]
    Processing(#[from] ProcessingError),
    #[error("Failed to write report: {0}")]
    Storage(#[from] StorageError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for AppError
pub type AppResult<T> = Result<T, AppError>;
