// Validation utilities
// Author: Gabriel Demetrios Lafis

use std::collections::HashSet;

use crate::processing::{Transformer, TransformerConfig};
use crate::report::{Column, ReportError};

/// Validate that every referenced column exists in the catalog
pub fn validate_column_refs<'a, I>(
    catalog: &[Column],
    references: I,
    context: &str,
) -> Result<(), ReportError>
where
    I: IntoIterator<Item = &'a str>,
{
    for name in references {
        if !catalog.iter().any(|c| c.name == name) {
            return Err(ReportError::UnknownColumn {
                column: name.to_string(),
                context: context.to_string(),
            });
        }
    }

    Ok(())
}

/// Validate that no column name is declared twice
pub fn validate_unique_names(catalog: &[Column]) -> Result<(), ReportError> {
    let mut names = HashSet::new();

    for column in catalog {
        if !names.insert(column.name.as_str()) {
            return Err(ReportError::DuplicateColumn(column.name.clone()));
        }
    }

    Ok(())
}

/// Validate that no step reads a column a later `DateTimeFormatter` creates.
///
/// A formatter writing back over its own input is fine: earlier steps see the
/// value as read.
pub fn validate_formatted_reads(transformers: &[TransformerConfig]) -> Result<(), ReportError> {
    for (position, transformer) in transformers.iter().enumerate() {
        let formatter = match transformer {
            TransformerConfig::DateTimeFormatter(formatter) if formatter.output != formatter.input => {
                formatter
            }
            _ => continue,
        };

        let column = formatter.output.as_str();
        if let Some(reader) = transformers[..position]
            .iter()
            .find(|earlier| earlier.input_columns().contains(&column))
        {
            return Err(ReportError::ReadBeforeFormatted {
                column: column.to_string(),
                context: reader.kind().as_str().to_string(),
            });
        }
    }

    Ok(())
}
