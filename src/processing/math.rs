// Multi-column arithmetic
// Author: Gabriel Demetrios Lafis

use serde::{Deserialize, Serialize};

use crate::data::{DataSet, Row, Value};
use super::{ProcessingError, Transformer, TransformerKind};

/// Arithmetic operator folded over the input columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MathOperator {
    Add,
    Subtract,
}

/// Combine numeric columns into one output column.
///
/// Every input must already hold a number; anything else aborts the whole
/// transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MathOperation {
    pub inputs: Vec<String>,
    pub operation: MathOperator,
    pub output: String,
}

impl MathOperation {
    pub fn new(inputs: &[&str], operation: MathOperator, output: &str) -> Self {
        MathOperation {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            operation,
            output: output.to_string(),
        }
    }

    /// `v0 + v1 + ...`
    pub fn add(inputs: &[&str], output: &str) -> Self {
        Self::new(inputs, MathOperator::Add, output)
    }

    /// `v0 - v1 - ...`
    pub fn subtract(inputs: &[&str], output: &str) -> Self {
        Self::new(inputs, MathOperator::Subtract, output)
    }

    /// Compute the scalar for one row
    pub fn evaluate(&self, row: &Row) -> Result<f64, ProcessingError> {
        let mut result = 0.0;

        for (i, input) in self.inputs.iter().enumerate() {
            let value = match row.get(input) {
                Some(value) => value.as_f64().ok_or_else(|| ProcessingError::NotNumeric {
                    column: input.clone(),
                    found: value.type_name().to_string(),
                })?,
                None => {
                    return Err(ProcessingError::NotNumeric {
                        column: input.clone(),
                        found: "nothing".to_string(),
                    })
                }
            };

            result = match (self.operation, i) {
                (MathOperator::Add, _) => result + value,
                (MathOperator::Subtract, 0) => value,
                (MathOperator::Subtract, _) => result - value,
            };
        }

        Ok(result)
    }
}

impl Transformer for MathOperation {
    fn transform(&self, rows: &mut DataSet) -> Result<(), ProcessingError> {
        let results = rows
            .iter()
            .map(|row| self.evaluate(row))
            .collect::<Result<Vec<f64>, ProcessingError>>()?;

        for (row, result) in rows.iter_mut().zip(results) {
            row.insert(self.output.clone(), Value::Float(result));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "MathOperation"
    }

    fn kind(&self) -> TransformerKind {
        TransformerKind::MathOperation
    }
}
