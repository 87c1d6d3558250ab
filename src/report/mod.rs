// Report definition: columns, transformers and output projection
// Author: Gabriel Demetrios Lafis

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::processing::{Transformer, TransformerConfig};
use crate::storage::FileFormat;
use crate::utils::{validate_column_refs, validate_formatted_reads, validate_unique_names};

/// A named reference into the row data model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<ColumnType>,
}

impl Column {
    /// Create an untyped column
    pub fn new(name: &str) -> Self {
        Column {
            name: name.to_string(),
            column_type: None,
        }
    }

    /// Create a column with a type hint
    pub fn typed(name: &str, column_type: ColumnType) -> Self {
        Column {
            name: name.to_string(),
            column_type: Some(column_type),
        }
    }
}

/// Semantic type hint carried by a column declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    String,
    Integer,
    Double,
    Date,
    DateTime,
}

/// A parsed report definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub report_name: String,
    pub output_format: FileFormat,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub transformers: Vec<TransformerConfig>,
    /// Names of the columns written to the output, in order
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl Report {
    /// Create an empty report definition
    pub fn new(report_name: &str, output_format: FileFormat) -> Self {
        Report {
            report_name: report_name.to_string(),
            output_format,
            columns: Vec::new(),
            transformers: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Add a column to the catalog
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Append a transformer step
    pub fn transformer<T: Into<TransformerConfig>>(mut self, transformer: T) -> Self {
        self.transformers.push(transformer.into());
        self
    }

    /// Append an output column
    pub fn output(mut self, name: &str) -> Self {
        self.outputs.push(name.to_string());
        self
    }

    /// Load a report definition from a JSON or YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            other => Err(ReportError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ReportError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Look up a catalog column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check that every column reference resolves against the catalog and that
    /// no step reads a column before the date formatter that creates it
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.report_name.trim().is_empty() {
            return Err(ReportError::MissingName);
        }

        validate_unique_names(&self.columns)?;

        for transformer in &self.transformers {
            validate_column_refs(
                &self.columns,
                transformer.referenced_columns(),
                transformer.kind().as_str(),
            )?;
        }

        validate_formatted_reads(&self.transformers)?;
        validate_column_refs(&self.columns, self.outputs.iter().map(String::as_str), "outputs")?;

        Ok(())
    }

    /// The output projection: `outputs` in order, or the whole catalog when empty
    pub fn output_columns(&self) -> Vec<String> {
        if self.outputs.is_empty() {
            self.columns.iter().map(|c| c.name.clone()).collect()
        } else {
            self.outputs.clone()
        }
    }
}

/// Represents an error in a report definition
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid JSON report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid YAML report: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Unsupported report file format: '{0}'")]
    UnsupportedFormat(String),
    #[error("Report has no name")]
    MissingName,
    #[error("Unknown column '{column}' referenced by {context}")]
    UnknownColumn { column: String, context: String },
    #[error("Column '{0}' is declared more than once")]
    DuplicateColumn(String),
    #[error("{context} reads '{column}' before the DateTimeFormatter that writes it")]
    ReadBeforeFormatted { column: String, context: String },
}
