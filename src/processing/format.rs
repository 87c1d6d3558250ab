// Multi-column string formatting
// Author: Gabriel Demetrios Lafis

use serde::{Deserialize, Serialize};

use crate::data::{DataSet, Value};
use super::{ProcessingError, Template, Transformer, TransformerKind};

/// Substitute input columns positionally into a printf-style template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringFormatter {
    pub inputs: Vec<String>,
    pub format: String,
    pub output: String,
}

impl StringFormatter {
    pub fn new(inputs: &[&str], format: &str, output: &str) -> Self {
        StringFormatter {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            format: format.to_string(),
            output: output.to_string(),
        }
    }

    /// Compile the template and check it against the number of inputs
    pub fn compile(&self) -> Result<Template, ProcessingError> {
        let template = Template::parse(&self.format)?;
        template.check_arguments(self.inputs.len())?;
        Ok(template)
    }
}

impl Transformer for StringFormatter {
    fn transform(&self, rows: &mut DataSet) -> Result<(), ProcessingError> {
        let template = self.compile()?;

        let results = rows
            .iter()
            .map(|row| {
                let args: Vec<Option<&Value>> =
                    self.inputs.iter().map(|input| row.get(input)).collect();
                template.render(&args)
            })
            .collect::<Result<Vec<String>, ProcessingError>>()?;

        for (row, formatted) in rows.iter_mut().zip(results) {
            row.insert(self.output.clone(), Value::String(formatted));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "StringFormatter"
    }

    fn kind(&self) -> TransformerKind {
        TransformerKind::StringFormatter
    }
}
