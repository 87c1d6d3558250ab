// printf-style template compilation and rendering
// Author: Gabriel Demetrios Lafis

use std::collections::BTreeSet;

use crate::data::Value;
use super::ProcessingError;

/// A conversion character and its case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Str { upper: bool },
    Decimal,
    Fixed,
    Scientific { upper: bool },
    Hex { upper: bool },
    Bool { upper: bool },
    Char { upper: bool },
}

impl Conversion {
    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            's' => Conversion::Str { upper: false },
            'S' => Conversion::Str { upper: true },
            'd' => Conversion::Decimal,
            'f' => Conversion::Fixed,
            'e' => Conversion::Scientific { upper: false },
            'E' => Conversion::Scientific { upper: true },
            'x' => Conversion::Hex { upper: false },
            'X' => Conversion::Hex { upper: true },
            'b' => Conversion::Bool { upper: false },
            'B' => Conversion::Bool { upper: true },
            'c' => Conversion::Char { upper: false },
            'C' => Conversion::Char { upper: true },
            _ => return None,
        })
    }

    fn upper(&self) -> bool {
        match self {
            Conversion::Str { upper }
            | Conversion::Scientific { upper }
            | Conversion::Hex { upper }
            | Conversion::Bool { upper }
            | Conversion::Char { upper } => *upper,
            Conversion::Decimal | Conversion::Fixed => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    group: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Spec {
    /// Zero-based argument position
    index: usize,
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: Conversion,
    text: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Arg(Spec),
}

/// A compiled `%[index$][flags][width][.precision]conversion` template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    used: BTreeSet<usize>,
}

fn format_error(msg: String) -> ProcessingError {
    ProcessingError::Format(msg)
}

fn parse_number(chars: &[char], template: &str) -> Result<usize, ProcessingError> {
    chars
        .iter()
        .collect::<String>()
        .parse::<usize>()
        .map_err(|e| format_error(format!("bad number in '{}': {}", template, e)))
}

/// Largest width or precision a specifier may ask for
pub const MAX_FIELD_WIDTH: usize = 4096;

fn parse_bounded(chars: &[char], template: &str, what: &str) -> Result<usize, ProcessingError> {
    let value = parse_number(chars, template)?;
    if value > MAX_FIELD_WIDTH {
        return Err(format_error(format!(
            "{} {} in '{}' exceeds {}",
            what, value, template, MAX_FIELD_WIDTH
        )));
    }
    Ok(value)
}

impl Template {
    /// Compile a template
    pub fn parse(template: &str) -> Result<Self, ProcessingError> {
        let chars: Vec<char> = template.chars().collect();
        let n = chars.len();
        let mut segments = Vec::new();
        let mut used = BTreeSet::new();
        let mut literal = String::new();
        let mut ordinary = 0usize;
        let mut i = 0;

        while i < n {
            if chars[i] != '%' {
                literal.push(chars[i]);
                i += 1;
                continue;
            }

            let start = i;
            i += 1;

            let digits_start = i;
            while i < n && chars[i].is_ascii_digit() {
                i += 1;
            }
            let mut index = None;
            if i > digits_start && chars.get(i) == Some(&'$') {
                let position = parse_number(&chars[digits_start..i], template)?;
                if position == 0 {
                    return Err(format_error(format!(
                        "argument index 0 in '{}'; indexes start at 1",
                        template
                    )));
                }
                index = Some(position - 1);
                i += 1;
            } else {
                i = digits_start;
            }

            let mut flags = Flags::default();
            while i < n {
                match chars[i] {
                    '-' => flags.left = true,
                    '+' => flags.plus = true,
                    ' ' => flags.space = true,
                    '0' => flags.zero = true,
                    ',' => flags.group = true,
                    _ => break,
                }
                i += 1;
            }

            let width_start = i;
            while i < n && chars[i].is_ascii_digit() {
                i += 1;
            }
            let width = if i > width_start {
                Some(parse_bounded(&chars[width_start..i], template, "width")?)
            } else {
                None
            };

            let mut precision = None;
            if chars.get(i) == Some(&'.') {
                i += 1;
                let precision_start = i;
                while i < n && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if i == precision_start {
                    return Err(format_error(format!("missing precision in '{}'", template)));
                }
                precision = Some(parse_bounded(&chars[precision_start..i], template, "precision")?);
            }

            let conversion_char = *chars.get(i).ok_or_else(|| {
                format_error(format!("incomplete format specifier at end of '{}'", template))
            })?;
            i += 1;
            let text: String = chars[start..i].iter().collect();

            match conversion_char {
                '%' => {
                    literal.push('%');
                    continue;
                }
                'n' => {
                    literal.push('\n');
                    continue;
                }
                _ => {}
            }

            let conversion = Conversion::from_char(conversion_char).ok_or_else(|| {
                format_error(format!("unknown conversion '{}' in '{}'", conversion_char, text))
            })?;

            Self::check_spec(&text, conversion, flags, width, precision)?;

            let index = match index {
                Some(index) => index,
                None => {
                    ordinary += 1;
                    ordinary - 1
                }
            };
            used.insert(index);

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Arg(Spec {
                index,
                flags,
                width,
                precision,
                conversion,
                text,
            }));
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Template {
            source: template.to_string(),
            segments,
            used,
        })
    }

    fn check_spec(
        text: &str,
        conversion: Conversion,
        flags: Flags,
        width: Option<usize>,
        precision: Option<usize>,
    ) -> Result<(), ProcessingError> {
        if (flags.left || flags.zero) && width.is_none() {
            return Err(format_error(format!("'{}' needs a width", text)));
        }
        if flags.left && flags.zero {
            return Err(format_error(format!("'{}' cannot combine '-' and '0'", text)));
        }
        if flags.plus && flags.space {
            return Err(format_error(format!("'{}' cannot combine '+' and ' '", text)));
        }

        let signed = matches!(
            conversion,
            Conversion::Decimal | Conversion::Fixed | Conversion::Scientific { .. }
        );
        let numeric = signed || matches!(conversion, Conversion::Hex { .. });
        let groupable = matches!(conversion, Conversion::Decimal | Conversion::Fixed);

        if (flags.plus || flags.space) && !signed
            || flags.zero && !numeric
            || flags.group && !groupable
        {
            return Err(format_error(format!("flags in '{}' do not apply to this conversion", text)));
        }

        if precision.is_some()
            && matches!(
                conversion,
                Conversion::Decimal | Conversion::Hex { .. } | Conversion::Char { .. }
            )
        {
            return Err(format_error(format!("'{}' does not take a precision", text)));
        }

        Ok(())
    }

    /// The template text this was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of arguments the template reads
    pub fn arity(&self) -> usize {
        self.used.iter().next_back().map_or(0, |last| last + 1)
    }

    /// Check that exactly `count` arguments are consumed
    pub fn check_arguments(&self, count: usize) -> Result<(), ProcessingError> {
        if self.arity() > count {
            return Err(format_error(format!(
                "'{}' needs {} arguments but {} were given",
                self.source,
                self.arity(),
                count
            )));
        }

        if let Some(unused) = (0..count).find(|i| !self.used.contains(i)) {
            return Err(format_error(format!(
                "'{}' never uses argument {} of {}",
                self.source,
                unused + 1,
                count
            )));
        }

        Ok(())
    }

    /// Render the template; a missing argument renders as `null`
    pub fn render(&self, args: &[Option<&Value>]) -> Result<String, ProcessingError> {
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Arg(spec) => {
                    let arg = args.get(spec.index).ok_or_else(|| {
                        format_error(format!(
                            "missing argument {} for '{}'",
                            spec.index + 1,
                            spec.text
                        ))
                    })?;
                    out.push_str(&render_arg(spec, *arg)?);
                }
            }
        }

        Ok(out)
    }
}

fn render_arg(spec: &Spec, value: Option<&Value>) -> Result<String, ProcessingError> {
    let mismatch = |v: &Value| {
        format_error(format!(
            "'{}' cannot format a {} value ({})",
            spec.text,
            v.type_name(),
            v
        ))
    };

    let body = match (spec.conversion, value) {
        (Conversion::Bool { .. }, None) => truncate("false", spec.precision),
        (Conversion::Bool { .. }, Some(_)) => truncate("true", spec.precision),
        (_, None) => truncate("null", spec.precision),
        (Conversion::Str { .. }, Some(v)) => truncate(&v.to_string(), spec.precision),
        (Conversion::Decimal, Some(Value::Integer(i))) => {
            signed_number(spec, *i < 0, i.unsigned_abs().to_string())
        }
        (Conversion::Fixed, Some(v)) => {
            let f = v.as_f64().ok_or_else(|| mismatch(v))?;
            let precision = spec.precision.unwrap_or(6);
            float_number(spec, f, |abs| format!("{:.*}", precision, abs))
        }
        (Conversion::Scientific { .. }, Some(v)) => {
            let f = v.as_f64().ok_or_else(|| mismatch(v))?;
            let precision = spec.precision.unwrap_or(6);
            float_number(spec, f, |abs| scientific(abs, precision))
        }
        (Conversion::Hex { .. }, Some(Value::Integer(i))) => {
            pad_zeros(spec, String::new(), format!("{:x}", i))
        }
        (Conversion::Char { .. }, Some(v)) => match v {
            Value::String(s) if s.chars().count() == 1 => s.clone(),
            Value::Integer(i) => u32::try_from(*i)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .ok_or_else(|| mismatch(v))?,
            _ => return Err(mismatch(v)),
        },
        (_, Some(v)) => return Err(mismatch(v)),
    };

    let body = if spec.conversion.upper() {
        body.to_uppercase()
    } else {
        body
    };

    Ok(justify(spec, body))
}

fn truncate(text: &str, precision: Option<usize>) -> String {
    match precision {
        Some(p) => text.chars().take(p).collect(),
        None => text.to_string(),
    }
}

fn sign(spec: &Spec, negative: bool) -> String {
    if negative {
        "-".to_string()
    } else if spec.flags.plus {
        "+".to_string()
    } else if spec.flags.space {
        " ".to_string()
    } else {
        String::new()
    }
}

fn signed_number(spec: &Spec, negative: bool, magnitude: String) -> String {
    let magnitude = if spec.flags.group {
        group_thousands(&magnitude)
    } else {
        magnitude
    };
    pad_zeros(spec, sign(spec, negative), magnitude)
}

fn float_number<F>(spec: &Spec, value: f64, render: F) -> String
where
    F: Fn(f64) -> String,
{
    if value.is_nan() {
        return "NaN".to_string();
    }

    let negative = value.is_sign_negative();
    if value.is_infinite() {
        return format!("{}Infinity", sign(spec, negative));
    }

    signed_number(spec, negative, render(value.abs()))
}

fn pad_zeros(spec: &Spec, sign: String, magnitude: String) -> String {
    let len = sign.chars().count() + magnitude.chars().count();
    match spec.width {
        Some(width) if spec.flags.zero && width > len => {
            format!("{}{}{}", sign, "0".repeat(width - len), magnitude)
        }
        _ => format!("{}{}", sign, magnitude),
    }
}

fn justify(spec: &Spec, body: String) -> String {
    let len = body.chars().count();
    match spec.width {
        Some(width) if width > len => {
            let padding = " ".repeat(width - len);
            if spec.flags.left {
                body + &padding
            } else {
                padding + &body
            }
        }
        _ => body,
    }
}

fn group_thousands(magnitude: &str) -> String {
    let (int_part, rest) = match magnitude.find('.') {
        Some(pos) => magnitude.split_at(pos),
        None => (magnitude, ""),
    };

    let mut grouped = String::with_capacity(magnitude.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped.push_str(rest);
    grouped
}

/// `1.234560e+03` style exponent notation
fn scientific(value: f64, precision: usize) -> String {
    let rendered = format!("{:.*e}", precision, value);
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => rendered,
    }
}
