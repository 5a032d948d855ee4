//! Fixed-width field specifications and the column formatter.
//!
//! Every column of every record is described by a [`FieldSpec`]. The same
//! spec drives validation of caller input (see [`crate::validate`]) and the
//! rendering of a value into exactly `width` characters.

use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveTime};
use log::warn;
use regex::Regex;

/// How a field's content is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Digits only, never truncated.
    Numeric,
    /// Printable ASCII, truncated to the column width.
    Alphanumeric,
    /// Integer minor units, rendered without separator or sign.
    Amount,
    /// Calendar date rendered as `YYMMDD`.
    Date,
    /// Time of day rendered as `HHMM`.
    Time,
}

/// Column justification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Left,
    Right,
}

/// Validation rule attached to a field.
#[derive(Clone, Copy)]
pub enum Rule {
    /// No constraint beyond the field kind.
    Any,
    /// Raw value must match the regex returned by the accessor.
    Pattern(fn() -> &'static Regex, &'static str),
    /// Raw value must be one of the listed codes.
    OneOf(&'static [&'static str]),
    /// Raw value must be a number in the inclusive range.
    Range(u64, u64),
    /// Six digits forming a real `YYMMDD` date.
    CalendarDate,
    /// Four digits forming a real `HHMM` time.
    CalendarTime,
    /// Nine-digit routing number with a valid check digit.
    Routing,
    /// Arbitrary predicate returning the failure reason.
    Custom(fn(&str) -> std::result::Result<(), String>),
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::Any => write!(f, "Any"),
            Rule::Pattern(_, reason) => write!(f, "Pattern({})", reason),
            Rule::OneOf(codes) => write!(f, "OneOf({:?})", codes),
            Rule::Range(min, max) => write!(f, "Range({}..={})", min, max),
            Rule::CalendarDate => write!(f, "CalendarDate"),
            Rule::CalendarTime => write!(f, "CalendarTime"),
            Rule::Routing => write!(f, "Routing"),
            Rule::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Static metadata for one column of a record.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub width: usize,
    pub kind: FieldKind,
    pub justify: Justify,
    pub pad: char,
    pub required: bool,
    pub rule: Rule,
}

impl FieldSpec {
    /// Right-justified, zero-padded numeric column.
    pub const fn numeric(name: &'static str, width: usize, rule: Rule) -> Self {
        FieldSpec {
            name,
            width,
            kind: FieldKind::Numeric,
            justify: Justify::Right,
            pad: '0',
            required: true,
            rule,
        }
    }

    /// Left-justified, space-padded text column.
    pub const fn alpha(name: &'static str, width: usize, required: bool, rule: Rule) -> Self {
        FieldSpec {
            name,
            width,
            kind: FieldKind::Alphanumeric,
            justify: Justify::Left,
            pad: ' ',
            required,
            rule,
        }
    }

    pub const fn amount(name: &'static str, width: usize) -> Self {
        FieldSpec {
            name,
            width,
            kind: FieldKind::Amount,
            justify: Justify::Right,
            pad: '0',
            required: true,
            rule: Rule::Any,
        }
    }

    pub const fn date(name: &'static str) -> Self {
        FieldSpec {
            name,
            width: 6,
            kind: FieldKind::Date,
            justify: Justify::Left,
            pad: ' ',
            required: true,
            rule: Rule::CalendarDate,
        }
    }

    pub const fn time(name: &'static str) -> Self {
        FieldSpec {
            name,
            width: 4,
            kind: FieldKind::Time,
            justify: Justify::Left,
            pad: ' ',
            required: true,
            rule: Rule::CalendarTime,
        }
    }

    /// Same spec with a different justification and pad character.
    pub const fn justified(mut self, justify: Justify, pad: char) -> Self {
        self.justify = justify;
        self.pad = pad;
        self
    }
}

/// A semantic value handed to the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(u64),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Column left entirely to its pad character.
    Blank,
}

/// Render `value` into exactly `spec.width` characters.
pub fn format(value: FieldValue<'_>, spec: &FieldSpec) -> Result<String> {
    let content = match (spec.kind, value) {
        (_, FieldValue::Blank) => String::new(),
        (FieldKind::Numeric | FieldKind::Amount, FieldValue::Number(n)) => {
            fit_exact(n.to_string(), spec)?
        }
        (FieldKind::Numeric, FieldValue::Text(text)) => {
            if !text.chars().all(|c| c.is_ascii_digit()) {
                return Err(overflow(text, spec));
            }
            fit_exact(text.to_string(), spec)?
        }
        (FieldKind::Alphanumeric, FieldValue::Text(text)) => {
            let count = text.chars().count();
            if count > spec.width {
                warn!(
                    "Truncating {} from {} to {} columns: {}",
                    spec.name, count, spec.width, text
                );
            }
            text.chars().take(spec.width).collect()
        }
        (FieldKind::Date, FieldValue::Date(date)) => date.format("%y%m%d").to_string(),
        (FieldKind::Time, FieldValue::Time(time)) => time.format("%H%M").to_string(),
        (_, other) => {
            return Err(Error::Format {
                field: spec.name,
                value: format!("{:?}", other),
                width: spec.width,
            })
        }
    };

    Ok(pad(&content, spec))
}

fn fit_exact(digits: String, spec: &FieldSpec) -> Result<String> {
    if digits.len() > spec.width {
        return Err(overflow(&digits, spec));
    }
    Ok(digits)
}

fn overflow(value: &str, spec: &FieldSpec) -> Error {
    Error::Format {
        field: spec.name,
        value: value.to_string(),
        width: spec.width,
    }
}

fn pad(content: &str, spec: &FieldSpec) -> String {
    let fill: String = std::iter::repeat(spec.pad)
        .take(spec.width - content.chars().count())
        .collect();
    match spec.justify {
        Justify::Left => format!("{}{}", content, fill),
        Justify::Right => format!("{}{}", fill, content),
    }
}
