// JSON-lines row sink implementation
// Author: Gabriel Demetrios Lafis

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value as JsonValue};

use super::{DataError, DataSet, DataSink, Row};

/// JSON-lines row sink.
///
/// Writes one flat JSON object per row, one row per line. Every value is
/// written as its text rendering, so `30.5` becomes `"30.5"`. Floats use the
/// shortest form that reads back to the same number: a whole-valued float
/// such as an aggregated `30.0` is written as `"30"`, not `"30.0"`.
pub struct JsonLinesSink {
    path: String,
}

impl JsonLinesSink {
    /// Create a new JSON-lines row sink
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonLinesSink {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    /// Build the flat JSON object for one row, skipping absent columns
    pub fn row_to_json(row: &Row, columns: &[String]) -> JsonValue {
        let mut obj = Map::new();

        for column in columns {
            if let Some(value) = row.get(column) {
                obj.insert(column.clone(), JsonValue::String(value.to_string()));
            }
        }

        JsonValue::Object(obj)
    }

    /// Write rows to any writer instead of the configured path
    pub fn write_to<W: Write>(
        &self,
        mut writer: W,
        data: &DataSet,
        columns: &[String],
    ) -> Result<(), DataError> {
        for row in &data.data {
            let json = Self::row_to_json(row, columns);
            serde_json::to_writer(&mut writer, &json)
                .map_err(|e| DataError::WriteError(e.to_string()))?;
            writer.write_all(b"\n")?;
        }

        writer.flush()?;

        Ok(())
    }
}

impl DataSink for JsonLinesSink {
    fn write(&self, data: &DataSet, columns: &[String]) -> Result<(), DataError> {
        let file = File::create(&self.path)?;
        self.write_to(BufWriter::new(file), data, columns)
    }

    fn name(&self) -> &str {
        &self.path
    }
}
