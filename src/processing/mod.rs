// Processing module for row set transformations
// Author: Gabriel Demetrios Lafis

mod aggregate;
mod datetime;
mod format;
mod math;
mod order;
mod printf;
mod temporal;

pub use aggregate::*;
pub use datetime::*;
pub use format::*;
pub use math::*;
pub use order::*;
pub use printf::*;
pub use temporal::*;

use std::fmt;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::DataSet;
use crate::report::Report;

/// A configured transformation applied to the whole row set.
///
/// Most transformers edit rows in place; an aggregation replaces the row
/// vector wholesale.
pub trait Transformer {
    /// Apply the transformation to the row set
    fn transform(&self, rows: &mut DataSet) -> Result<(), ProcessingError>;

    /// Get the transformer name
    fn name(&self) -> &str;

    /// Get the transformer kind
    fn kind(&self) -> TransformerKind;
}

/// The closed set of transformer kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformerKind {
    DateTimeFormatter,
    Aggregator,
    MathOperation,
    Ordering,
    StringFormatter,
}

impl TransformerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformerKind::DateTimeFormatter => "DateTimeFormatter",
            TransformerKind::Aggregator => "Aggregator",
            TransformerKind::MathOperation => "MathOperation",
            TransformerKind::Ordering => "Ordering",
            TransformerKind::StringFormatter => "StringFormatter",
        }
    }
}

impl fmt::Display for TransformerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents an error in the processing module
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Column {column} is not a number (found {found})")]
    NotNumeric { column: String, found: String },
    #[error("Unsupported column type for ordering: column {column} holds {type_name}")]
    UnsupportedType { column: String, type_name: String },
    #[error("Invalid format or input types: {0}")]
    Format(String),
    #[error("Invalid date pattern: {0}")]
    InvalidPattern(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// One transformer step as declared in a report definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransformerConfig {
    DateTimeFormatter(DateTimeFormatter),
    Aggregator(Aggregator),
    MathOperation(MathOperation),
    Ordering(OrderBy),
    StringFormatter(StringFormatter),
}

impl TransformerConfig {
    fn inner(&self) -> &dyn Transformer {
        match self {
            TransformerConfig::DateTimeFormatter(t) => t,
            TransformerConfig::Aggregator(t) => t,
            TransformerConfig::MathOperation(t) => t,
            TransformerConfig::Ordering(t) => t,
            TransformerConfig::StringFormatter(t) => t,
        }
    }

    /// Every column name this step reads or writes
    /// Columns this step reads
    pub fn input_columns(&self) -> Vec<&str> {
        match self {
            TransformerConfig::DateTimeFormatter(t) => vec![t.input.as_str()],
            TransformerConfig::Aggregator(t) => std::iter::once(t.group_by_column.as_str())
                .chain(t.aggregate_columns.iter().map(|a| a.input.as_str()))
                .collect(),
            TransformerConfig::MathOperation(t) => t.inputs.iter().map(String::as_str).collect(),
            TransformerConfig::Ordering(t) => vec![t.input.as_str()],
            TransformerConfig::StringFormatter(t) => t.inputs.iter().map(String::as_str).collect(),
        }
    }

    pub fn referenced_columns(&self) -> Vec<&str> {
        match self {
            TransformerConfig::DateTimeFormatter(t) => vec![t.input.as_str(), t.output.as_str()],
            TransformerConfig::Aggregator(t) => {
                let mut refs = vec![t.group_by_column.as_str()];
                for aggregate in &t.aggregate_columns {
                    refs.push(aggregate.input.as_str());
                    refs.push(aggregate.output.as_str());
                }
                refs
            }
            TransformerConfig::MathOperation(t) => {
                let mut refs: Vec<&str> = t.inputs.iter().map(String::as_str).collect();
                refs.push(t.output.as_str());
                refs
            }
            TransformerConfig::Ordering(t) => vec![t.input.as_str()],
            TransformerConfig::StringFormatter(t) => {
                let mut refs: Vec<&str> = t.inputs.iter().map(String::as_str).collect();
                refs.push(t.output.as_str());
                refs
            }
        }
    }
}

impl Transformer for TransformerConfig {
    fn transform(&self, rows: &mut DataSet) -> Result<(), ProcessingError> {
        self.inner().transform(rows)
    }

    fn name(&self) -> &str {
        self.inner().name()
    }

    fn kind(&self) -> TransformerKind {
        self.inner().kind()
    }
}

impl From<DateTimeFormatter> for TransformerConfig {
    fn from(t: DateTimeFormatter) -> Self {
        TransformerConfig::DateTimeFormatter(t)
    }
}

impl From<Aggregator> for TransformerConfig {
    fn from(t: Aggregator) -> Self {
        TransformerConfig::Aggregator(t)
    }
}

impl From<MathOperation> for TransformerConfig {
    fn from(t: MathOperation) -> Self {
        TransformerConfig::MathOperation(t)
    }
}

impl From<OrderBy> for TransformerConfig {
    fn from(t: OrderBy) -> Self {
        TransformerConfig::Ordering(t)
    }
}

impl From<StringFormatter> for TransformerConfig {
    fn from(t: StringFormatter) -> Self {
        TransformerConfig::StringFormatter(t)
    }
}

/// Pipeline for applying transformers to a shared row set in declared order
pub struct Pipeline {
    name: String,
    stages: Vec<Box<dyn Transformer>>,
}

impl Pipeline {
    /// Create a new empty pipeline with the given name
    pub fn new(name: &str) -> Self {
        Pipeline {
            name: name.to_string(),
            stages: Vec::new(),
        }
    }

    /// Build a pipeline from a report's transformer list, in declared order
    pub fn from_report(report: &Report) -> Self {
        report
            .transformers
            .iter()
            .cloned()
            .fold(Pipeline::new(&report.report_name), Pipeline::add)
    }

    /// Add a transformer to the end of the pipeline
    pub fn add<T: Transformer + 'static>(mut self, transformer: T) -> Self {
        self.stages.push(Box::new(transformer));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage once, in order, over the row set.
    ///
    /// There is no rollback: the first failing stage aborts the run and leaves
    /// the row set as the previous stages left it.
    pub fn execute(&self, rows: &mut DataSet) -> Result<(), ProcessingError> {
        for (step, stage) in self.stages.iter().enumerate() {
            stage.transform(rows)?;
            info!(
                "[{}] step {}: {} done, {} rows",
                self.name,
                step + 1,
                stage.name(),
                rows.len()
            );
        }

        Ok(())
    }
}
