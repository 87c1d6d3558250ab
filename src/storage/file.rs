// File storage implementation
// Author: Gabriel Demetrios Lafis

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};

use crate::data::{CsvSink, DataSet, DataSink, JsonLinesSink};
use super::{DataStorage, StorageError};

/// Output file format of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    #[serde(rename = "JSONL", alias = "jsonl", alias = "json-lines", alias = "JSON_LINES")]
    Jsonl,
    #[serde(rename = "CSV", alias = "csv")]
    Csv,
}

impl FileFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Jsonl => "jsonl",
            FileFormat::Csv => "csv",
        }
    }
}

impl FromStr for FileFormat {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" | "json-lines" | "json_lines" => Ok(FileFormat::Jsonl),
            "csv" => Ok(FileFormat::Csv),
            _ => Err(StorageError::InvalidFormat(format!(
                "Unknown file format: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Writes each report to `<base_dir>/<name>.<extension>`
pub struct FileStorage {
    base_dir: PathBuf,
    format: FileFormat,
    delimiter: char,
}

impl FileStorage {
    /// Create a new file storage, creating the directory if needed
    pub fn new<P: AsRef<Path>>(base_dir: P, format: FileFormat) -> Result<Self, StorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        if !base_dir.exists() {
            fs::create_dir_all(&base_dir)?;
        }

        Ok(FileStorage {
            base_dir,
            format,
            delimiter: ',',
        })
    }

    /// Use a different delimiter for CSV output
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Get the path for a report
    pub fn get_path(&self, name: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.{}", name, self.format.extension()))
    }
}

impl DataStorage for FileStorage {
    fn store(&self, name: &str, data: &DataSet, columns: &[String]) -> Result<PathBuf, StorageError> {
        let path = self.get_path(name);

        match self.format {
            FileFormat::Jsonl => JsonLinesSink::new(&path).write(data, columns)?,
            FileFormat::Csv => CsvSink::new(&path, self.delimiter).write(data, columns)?,
        }

        info!("Wrote {} rows to {}", data.len(), path.display());

        Ok(path)
    }

    fn exists(&self, name: &str) -> bool {
        self.get_path(name).exists()
    }
}
