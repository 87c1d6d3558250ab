// Data module for the row set model and its sources and sinks
// Author: Gabriel Demetrios Lafis

mod csv;
mod json;

pub use self::csv::*;
pub use self::json::*;

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Represents a generic row source
pub trait DataSource {
    /// Read every row from the source
    fn read(&self) -> Result<DataSet, DataError>;

    /// Get the source name
    fn name(&self) -> &str;
}

/// Represents a generic row sink
pub trait DataSink {
    /// Write the given columns of every row to the sink
    fn write(&self, data: &DataSet, columns: &[String]) -> Result<(), DataError>;

    /// Get the sink name
    fn name(&self) -> &str;
}

/// The in-memory table threaded through the pipeline
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    /// Column names in the order the source declared them
    pub columns: Vec<String>,
    pub data: Vec<Row>,
    pub metadata: Metadata,
}

impl DataSet {
    /// Create a new empty dataset with the given header
    pub fn new(columns: Vec<String>) -> Self {
        DataSet {
            columns,
            data: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Create a dataset from already built rows
    pub fn from_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        DataSet {
            columns,
            data: rows,
            metadata: Metadata::new(),
        }
    }

    /// Append a row
    pub fn add_row(&mut self, row: Row) {
        self.data.push(row);
    }

    /// Swap the whole row vector, returning the previous one
    pub fn replace_rows(&mut self, rows: Vec<Row>) -> Vec<Row> {
        std::mem::replace(&mut self.data, rows)
    }

    /// Get the number of rows in the dataset
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a reference to a row by index
    pub fn get_row(&self, index: usize) -> Option<&Row> {
        self.data.get(index)
    }

    /// Get a mutable reference to a row by index
    pub fn get_row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.data.get_mut(index)
    }

    /// Iterate over the rows in order
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.data.iter()
    }

    /// Iterate mutably over the rows in order
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Row> {
        self.data.iter_mut()
    }
}

/// One record: a mapping from column name to value.
///
/// A column that was never populated is simply not present; it is not the
/// same thing as an empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<String, Value>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Row {
            values: HashMap::new(),
        }
    }

    /// Build a row from `(column, value)` pairs
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Row {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Get a reference to a value by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Get a mutable reference to a value by column name
    pub fn get_mut(&mut self, column: &str) -> Option<&mut Value> {
        self.values.get_mut(column)
    }

    /// Set a column, overwriting any previous value
    pub fn insert<K: Into<String>>(&mut self, column: K, value: Value) -> Option<Value> {
        self.values.insert(column.into(), value)
    }

    /// Remove a column from the row
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.values.remove(column)
    }

    /// Check whether a column is present
    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column names present in this row, sorted
    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Represents a value in a row
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Shorthand for a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::String(s.into())
    }

    /// The numeric value, for `Integer` and `Float` only
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the variant, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Value::Date(_) | Value::DateTime(_))
    }
}

/// Text rendering used by every sink and by `%s`.
///
/// Floats print in their shortest round-trip form, so `30.0` renders as `30`
/// and `7.5` as `7.5`. Dates print as `YYYY-MM-DD`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

/// Represents metadata for a dataset
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub properties: HashMap<String, String>,
    /// Source lines dropped because their field count did not match the header
    pub skipped_lines: usize,
}

impl Metadata {
    /// Create new empty metadata
    pub fn new() -> Self {
        Metadata::default()
    }

    /// Add a property to the metadata
    pub fn add(&mut self, key: String, value: String) {
        self.properties.insert(key, value);
    }

    /// Get a property from the metadata
    pub fn get(&self, key: &str) -> Option<&String> {
        self.properties.get(key)
    }
}

/// Represents an error in the data module
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Empty source: {0}")]
    EmptySource(String),
    #[error("Write error: {0}")]
    WriteError(String),
    #[error("Invalid delimiter {0:?}: must be a single ASCII character")]
    InvalidDelimiter(char),
}

impl From<::csv::Error> for DataError {
    fn from(err: ::csv::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}
