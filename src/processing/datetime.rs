// Date and date-time reformatting
// Author: Gabriel Demetrios Lafis

use log::warn;
use serde::{Deserialize, Serialize};

use crate::data::{DataSet, Value};
use super::{parse_temporal, DatePattern, ProcessingError, Transformer, TransformerKind};

/// Reformat a text column holding ISO dates or UTC instants.
///
/// Text that parses as neither is written to `output` unchanged. Non-text and
/// absent values are left alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeFormatter {
    pub input: String,
    pub format: String,
    pub output: String,
}

impl DateTimeFormatter {
    /// Create a new date formatter
    pub fn new(input: &str, format: &str, output: &str) -> Self {
        DateTimeFormatter {
            input: input.to_string(),
            format: format.to_string(),
            output: output.to_string(),
        }
    }

    /// Reformat one text value with an already compiled pattern
    pub fn format_text(&self, pattern: &DatePattern, text: &str) -> Result<String, ProcessingError> {
        match parse_temporal(text) {
            Some(Value::DateTime(dt)) => pattern.format_datetime(dt),
            Some(Value::Date(d)) => pattern.format_date(d),
            _ => {
                warn!("Error formatting date: {}", text);
                Ok(text.to_string())
            }
        }
    }
}

impl Transformer for DateTimeFormatter {
    fn transform(&self, rows: &mut DataSet) -> Result<(), ProcessingError> {
        let pattern = DatePattern::parse(&self.format)?;

        for row in rows.iter_mut() {
            let formatted = match row.get(&self.input) {
                Some(Value::String(text)) => self.format_text(&pattern, text)?,
                _ => continue,
            };

            row.insert(self.output.clone(), Value::String(formatted));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "DateTimeFormatter"
    }

    fn kind(&self) -> TransformerKind {
        TransformerKind::DateTimeFormatter
    }
}
