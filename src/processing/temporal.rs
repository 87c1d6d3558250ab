// Date parsing and pattern-based date formatting
// Author: Gabriel Demetrios Lafis

use std::fmt::{self, Write};

use chrono::format::{Fixed, Item, Numeric, Pad};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::data::Value;
use super::ProcessingError;

/// Parse a plain ISO calendar date (`YYYY-MM-DD`)
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Parse an RFC 3339 instant and convert it to UTC
pub fn parse_instant(text: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).naive_utc())
}

/// Classify text as an instant (has both `T` and `Z`) or a plain date and parse it
pub fn parse_temporal(text: &str) -> Option<Value> {
    if text.contains('T') && text.contains('Z') {
        parse_instant(text).map(Value::DateTime)
    } else {
        parse_iso_date(text).map(Value::Date)
    }
}

/// Date-time view of a temporal value; plain dates sit at midnight
pub fn temporal_key(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Date(d) => d.and_hms_opt(0, 0, 0),
        Value::DateTime(dt) => Some(*dt),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PatternField {
    /// Rendered by chrono
    Item(Item<'static>),
    /// Leading digits of the fraction of a second
    Fraction { digits: usize },
    /// First letter of the month name
    NarrowMonth,
    /// First letter of the weekday name
    NarrowWeekday,
}

impl PatternField {
    fn numeric(numeric: Numeric, count: usize) -> Self {
        let pad = if count > 1 { Pad::Zero } else { Pad::None };
        PatternField::Item(Item::Numeric(numeric, pad))
    }

    fn fixed(fixed: Fixed) -> Self {
        PatternField::Item(Item::Fixed(fixed))
    }

    fn needs_time(&self) -> bool {
        match self {
            PatternField::Fraction { .. } => true,
            PatternField::Item(Item::Numeric(numeric, _)) => matches!(
                numeric,
                Numeric::Hour | Numeric::Hour12 | Numeric::Minute | Numeric::Second
            ),
            PatternField::Item(Item::Fixed(fixed)) => matches!(
                fixed,
                Fixed::UpperAmPm
                    | Fixed::TimezoneName
                    | Fixed::TimezoneOffset
                    | Fixed::TimezoneOffsetColon
                    | Fixed::TimezoneOffsetColonZ
            ),
            _ => false,
        }
    }
}

/// A compiled output pattern in the `yyyy/MM/dd HH:mm:ss` letter convention.
///
/// Runs of the same letter select a field and its width; text in single quotes
/// is literal (`''` is a quote); any other non-letter is copied through. The
/// fields compile to chrono format items, and date-times render in UTC so the
/// zone letters `X`, `x`, `Z` and `z` print `Z`, `+00:00`, `+0000` and `UTC`.
#[derive(Debug, Clone, PartialEq)]
pub struct DatePattern {
    source: String,
    fields: Vec<PatternField>,
}

impl DatePattern {
    /// Compile a pattern, rejecting unknown letters and bad widths
    pub fn parse(pattern: &str) -> Result<Self, ProcessingError> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut fields = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if c == '\'' {
                if chars.get(i + 1) == Some(&'\'') {
                    literal.push('\'');
                    i += 2;
                    continue;
                }

                let mut j = i + 1;
                loop {
                    match chars.get(j) {
                        None => {
                            return Err(ProcessingError::InvalidPattern(format!(
                                "unterminated quote in '{}'",
                                pattern
                            )))
                        }
                        Some('\'') if chars.get(j + 1) == Some(&'\'') => {
                            literal.push('\'');
                            j += 2;
                        }
                        Some('\'') => break,
                        Some(other) => {
                            literal.push(*other);
                            j += 1;
                        }
                    }
                }
                i = j + 1;
                continue;
            }

            if !c.is_ascii_alphabetic() {
                literal.push(c);
                i += 1;
                continue;
            }

            let mut count = 1;
            while chars.get(i + count) == Some(&c) {
                count += 1;
            }

            if !literal.is_empty() {
                fields.push(Self::literal(std::mem::take(&mut literal)));
            }
            fields.push(Self::field(c, count, pattern)?);
            i += count;
        }

        if !literal.is_empty() {
            fields.push(Self::literal(literal));
        }

        Ok(DatePattern {
            source: pattern.to_string(),
            fields,
        })
    }

    fn literal(text: String) -> PatternField {
        PatternField::Item(Item::OwnedLiteral(text.into_boxed_str()))
    }

    fn field(letter: char, count: usize, pattern: &str) -> Result<PatternField, ProcessingError> {
        let field = match (letter, count) {
            ('y' | 'u', 2) => PatternField::Item(Item::Numeric(Numeric::YearMod100, Pad::Zero)),
            ('y' | 'u', 1 | 3 | 4) => PatternField::Item(Item::Numeric(Numeric::Year, Pad::Zero)),
            ('M' | 'L', 1 | 2) => PatternField::numeric(Numeric::Month, count),
            ('M' | 'L', 3) => PatternField::fixed(Fixed::ShortMonthName),
            ('M' | 'L', 4) => PatternField::fixed(Fixed::LongMonthName),
            ('M' | 'L', 5) => PatternField::NarrowMonth,
            ('d', 1 | 2) => PatternField::numeric(Numeric::Day, count),
            // Day of year only zero-pads at its full width of three.
            ('D', 1 | 2) => PatternField::numeric(Numeric::Ordinal, 1),
            ('D', 3) => PatternField::numeric(Numeric::Ordinal, 3),
            ('E', 1..=3) => PatternField::fixed(Fixed::ShortWeekdayName),
            ('E', 4) => PatternField::fixed(Fixed::LongWeekdayName),
            ('E', 5) => PatternField::NarrowWeekday,
            ('H', 1 | 2) => PatternField::numeric(Numeric::Hour, count),
            ('h', 1 | 2) => PatternField::numeric(Numeric::Hour12, count),
            ('m', 1 | 2) => PatternField::numeric(Numeric::Minute, count),
            ('s', 1 | 2) => PatternField::numeric(Numeric::Second, count),
            ('S', 1..=9) => PatternField::Fraction { digits: count },
            ('a', 1) => PatternField::fixed(Fixed::UpperAmPm),
            ('X', 1..=3) | ('Z', 5) => PatternField::fixed(Fixed::TimezoneOffsetColonZ),
            ('x', 1..=3) => PatternField::fixed(Fixed::TimezoneOffsetColon),
            ('Z', 1..=3) => PatternField::fixed(Fixed::TimezoneOffset),
            ('z', 1..=4) => PatternField::fixed(Fixed::TimezoneName),
            (
                'y' | 'u' | 'M' | 'L' | 'd' | 'D' | 'E' | 'H' | 'h' | 'm' | 's' | 'S' | 'a' | 'X'
                | 'x' | 'Z' | 'z',
                _,
            ) => {
                return Err(ProcessingError::InvalidPattern(format!(
                    "too many '{}' letters in '{}'",
                    letter, pattern
                )))
            }
            _ => {
                return Err(ProcessingError::InvalidPattern(format!(
                    "unknown pattern letter '{}' in '{}'",
                    letter, pattern
                )))
            }
        };

        Ok(field)
    }

    /// The pattern text this was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the pattern prints any time-of-day or zone field
    pub fn has_time_fields(&self) -> bool {
        self.fields.iter().any(PatternField::needs_time)
    }

    /// Render a calendar date; time-of-day and zone fields are an error
    pub fn format_date(&self, date: NaiveDate) -> Result<String, ProcessingError> {
        if self.has_time_fields() {
            return Err(ProcessingError::InvalidPattern(format!(
                "'{}' prints a time of day but the value {} is a plain date",
                self.source, date
            )));
        }

        match date.and_hms_opt(0, 0, 0) {
            Some(midnight) => self.render(midnight),
            None => Err(ProcessingError::InvalidArgument(format!("invalid date {}", date))),
        }
    }

    /// Render a UTC date-time
    pub fn format_datetime(&self, datetime: NaiveDateTime) -> Result<String, ProcessingError> {
        self.render(datetime)
    }

    fn render(&self, datetime: NaiveDateTime) -> Result<String, ProcessingError> {
        let instant = Utc.from_utc_datetime(&datetime);
        let mut out = String::new();

        for field in &self.fields {
            let written = match field {
                PatternField::Item(item) => {
                    write!(out, "{}", instant.format_with_items(std::iter::once(item)))
                }
                PatternField::Fraction { digits } => {
                    let nanos = format!("{:09}", datetime.nanosecond() % 1_000_000_000);
                    out.write_str(&nanos[..*digits])
                }
                PatternField::NarrowMonth => write_initial(&mut out, instant.format("%B")),
                PatternField::NarrowWeekday => write_initial(&mut out, instant.format("%A")),
            };

            written.map_err(|_| {
                ProcessingError::InvalidPattern(format!(
                    "'{}' cannot render {}",
                    self.source, datetime
                ))
            })?;
        }

        Ok(out)
    }
}

fn write_initial(out: &mut String, name: impl fmt::Display) -> fmt::Result {
    let mut full = String::new();
    write!(full, "{}", name)?;
    out.extend(full.chars().next());
    Ok(())
}
