// Row ordering by a single column
// Author: Gabriel Demetrios Lafis

use std::cmp::Ordering;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::data::{DataSet, Row, Value};
use super::{parse_instant, parse_iso_date, temporal_key, ProcessingError, Transformer, TransformerKind};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// How a missing sort value compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbsentPolicy {
    /// A pair with a missing value on either side compares equal
    #[default]
    Equal,
    /// Missing values go after every present value, in both directions
    Last,
}

/// Sort the whole row set by one column.
///
/// Text is compared as ISO dates when both sides parse, otherwise as text.
/// Dates and date-times compare chronologically. Numbers are not orderable and
/// abort the sort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub input: String,
    pub order: SortOrder,
    #[serde(default)]
    pub absent: AbsentPolicy,
}

impl OrderBy {
    pub fn new(input: &str, order: SortOrder) -> Self {
        OrderBy {
            input: input.to_string(),
            order,
            absent: AbsentPolicy::Equal,
        }
    }

    pub fn asc(input: &str) -> Self {
        Self::new(input, SortOrder::Asc)
    }

    pub fn desc(input: &str) -> Self {
        Self::new(input, SortOrder::Desc)
    }

    /// Use a different policy for missing values
    pub fn with_absent(mut self, absent: AbsentPolicy) -> Self {
        self.absent = absent;
        self
    }

    /// Compare two rows in the configured direction
    pub fn compare_rows(&self, left: &Row, right: &Row) -> Result<Ordering, ProcessingError> {
        let (left, right) = match (left.get(&self.input), right.get(&self.input)) {
            (Some(l), Some(r)) => (l, r),
            (l, r) => return Ok(self.compare_absent(l.is_some(), r.is_some())),
        };

        let ordering = self.compare_values(left, right)?;

        Ok(match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        })
    }

    fn compare_absent(&self, left_present: bool, right_present: bool) -> Ordering {
        match self.absent {
            AbsentPolicy::Equal => {
                trace!("Missing '{}' value, treating pair as equal", self.input);
                Ordering::Equal
            }
            AbsentPolicy::Last => right_present.cmp(&left_present),
        }
    }

    /// Ascending comparison of two present values
    pub fn compare_values(&self, left: &Value, right: &Value) -> Result<Ordering, ProcessingError> {
        match left {
            Value::String(l) => Ok(match right {
                Value::String(r) => match (parse_iso_date(l), parse_iso_date(r)) {
                    (Some(a), Some(b)) => a.cmp(&b),
                    _ => l.as_str().cmp(r.as_str()),
                },
                other => l.as_str().cmp(other.to_string().as_str()),
            }),
            Value::Date(_) | Value::DateTime(_) => {
                let l = temporal_key(left);
                let r = match right {
                    Value::String(text) => parse_iso_date(text)
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .or_else(|| parse_instant(text)),
                    other => temporal_key(other),
                };

                Ok(match (l, r) {
                    (Some(a), Some(b)) => a.cmp(&b),
                    _ => left.to_string().cmp(&right.to_string()),
                })
            }
            Value::Integer(_) | Value::Float(_) => Err(ProcessingError::UnsupportedType {
                column: self.input.clone(),
                type_name: left.type_name().to_string(),
            }),
        }
    }
}

/// Stable merge sort driven by a fallible comparator.
///
/// Never panics on an inconsistent ordering; the first comparator error stops
/// the sort.
pub fn try_merge_sort<T, E, F>(items: Vec<T>, compare: &mut F) -> Result<Vec<T>, E>
where
    F: FnMut(&T, &T) -> Result<Ordering, E>,
{
    if items.len() <= 1 {
        return Ok(items);
    }

    let mut left = items;
    let right = left.split_off(left.len() / 2);

    let left = try_merge_sort(left, compare)?;
    let right = try_merge_sort(right, compare)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l)? == Ordering::Less,
            _ => break,
        };

        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }

    merged.extend(left);
    merged.extend(right);

    Ok(merged)
}

impl Transformer for OrderBy {
    fn transform(&self, rows: &mut DataSet) -> Result<(), ProcessingError> {
        let positions: Vec<usize> = (0..rows.len()).collect();
        let positions = try_merge_sort(positions, &mut |a: &usize, b: &usize| {
            self.compare_rows(&rows.data[*a], &rows.data[*b])
        })?;

        let mut slots: Vec<Option<Row>> = rows.replace_rows(Vec::new()).into_iter().map(Some).collect();
        let sorted = positions.into_iter().filter_map(|i| slots[i].take()).collect();
        rows.replace_rows(sorted);

        Ok(())
    }

    fn name(&self) -> &str {
        "Ordering"
    }

    fn kind(&self) -> TransformerKind {
        TransformerKind::Ordering
    }
}
