// Storage module for persisting finished reports
// Author: Gabriel Demetrios Lafis

mod file;

pub use file::*;

use std::path::PathBuf;

use thiserror::Error;

use crate::data::{DataError, DataSet};

/// Represents a destination for finished reports
pub trait DataStorage {
    /// Store the given columns of a dataset under a report name
    fn store(&self, name: &str, data: &DataSet, columns: &[String]) -> Result<PathBuf, StorageError>;

    /// Check if a report exists
    fn exists(&self, name: &str) -> bool;
}

/// Represents an error in the storage module
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Data error: {0}")]
    DataError(#[from] DataError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}
