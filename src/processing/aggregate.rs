// Group-by aggregation
// Author: Gabriel Demetrios Lafis

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::data::{DataSet, Row, Value};
use super::{ProcessingError, Transformer, TransformerKind};

/// Represents an aggregation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregateMethod {
    Sum,
    Avg,
}

impl AggregateMethod {
    /// Reduce the coerced values of one group; an empty group yields `0`
    pub fn apply(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }

        let sum: f64 = values.iter().sum();
        match self {
            AggregateMethod::Sum => sum,
            AggregateMethod::Avg => sum / values.len() as f64,
        }
    }
}

/// One `(input, method, output)` aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateBy {
    pub input: String,
    pub method: AggregateMethod,
    pub output: String,
}

impl AggregateBy {
    pub fn new(input: &str, method: AggregateMethod, output: &str) -> Self {
        AggregateBy {
            input: input.to_string(),
            method,
            output: output.to_string(),
        }
    }
}

/// Group by processor for aggregating data.
///
/// Replaces the row set with one row per distinct group key, in the order the
/// keys were first seen. Rows without a group key are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregator {
    pub group_by_column: String,
    #[serde(default)]
    pub aggregate_columns: Vec<AggregateBy>,
}

impl Aggregator {
    /// Create a new aggregator grouping by the given column
    pub fn new(group_by_column: &str) -> Self {
        Aggregator {
            group_by_column: group_by_column.to_string(),
            aggregate_columns: Vec::new(),
        }
    }

    /// Add an aggregation
    pub fn aggregate(mut self, input: &str, method: AggregateMethod, output: &str) -> Self {
        self.aggregate_columns.push(AggregateBy::new(input, method, output));
        self
    }

    /// Add a sum aggregation
    pub fn sum(self, input: &str, output: &str) -> Self {
        self.aggregate(input, AggregateMethod::Sum, output)
    }

    /// Add an average aggregation
    pub fn avg(self, input: &str, output: &str) -> Self {
        self.aggregate(input, AggregateMethod::Avg, output)
    }
}

/// Coerce an aggregate contribution to a number, or drop it with a warning
pub fn coerce_number(value: &Value, column: &str) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) => Some(n),
            Err(_) => {
                warn!("Invalid number format for column {}: {}", column, s);
                None
            }
        },
        Value::Date(_) | Value::DateTime(_) => {
            warn!(
                "Unexpected type for column {}: {}",
                column,
                value.type_name()
            );
            None
        }
    }
}

/// Hashable identity of a group key value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Text(String),
    Integer(i64),
    Float(u64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl From<&Value> for GroupKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => GroupKey::Text(s.clone()),
            Value::Integer(i) => GroupKey::Integer(*i),
            // -0.0 and 0.0 share a group
            Value::Float(f) => GroupKey::Float(if *f == 0.0 { 0 } else { f.to_bits() }),
            Value::Date(d) => GroupKey::Date(*d),
            Value::DateTime(dt) => GroupKey::DateTime(*dt),
        }
    }
}

impl Transformer for Aggregator {
    fn transform(&self, rows: &mut DataSet) -> Result<(), ProcessingError> {
        let mut index: HashMap<GroupKey, usize> = HashMap::new();
        let mut groups: Vec<(Value, Vec<&Row>)> = Vec::new();

        for row in rows.iter() {
            let key = match row.get(&self.group_by_column) {
                Some(key) => key,
                None => continue,
            };

            let slot = *index.entry(GroupKey::from(key)).or_insert_with(|| {
                groups.push((key.clone(), Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(row);
        }

        let mut aggregated = Vec::with_capacity(groups.len());

        for (key, members) in groups {
            let mut output = Row::new();
            output.insert(self.group_by_column.clone(), key);

            for aggregate in &self.aggregate_columns {
                let values: Vec<f64> = members
                    .iter()
                    .filter_map(|row| row.get(&aggregate.input))
                    .filter_map(|value| coerce_number(value, &aggregate.input))
                    .collect();

                output.insert(
                    aggregate.output.clone(),
                    Value::Float(aggregate.method.apply(&values)),
                );
            }

            aggregated.push(output);
        }

        rows.replace_rows(aggregated);

        Ok(())
    }

    fn name(&self) -> &str {
        "Aggregator"
    }

    fn kind(&self) -> TransformerKind {
        TransformerKind::Aggregator
    }
}
