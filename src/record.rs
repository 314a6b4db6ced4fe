//! Delimited text records.
//!
//! A record is one line of a dataset file split on a fixed delimiter. Field
//! text is trimmed and classified: canonical integers (optional `-`, no
//! leading zeros, no `-0`, fits in `i64`) become [`Field::Int`], anything
//! else stays a [`Field::Symbol`]. Because only canonical text is turned into
//! an integer, writing a loaded field reproduces its text exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One field of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Int(i64),
    Symbol(String),
}

impl Field {
    /// Classify already-trimmed field text.
    pub fn parse(text: &str) -> Field {
        if is_canonical_int(text) {
            if let Ok(v) = text.parse::<i64>() {
                return Field::Int(v);
            }
        }
        Field::Symbol(text.to_string())
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Int(_) => FieldKind::Int,
            Field::Symbol(_) => FieldKind::Symbol,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Field::Int(v) => Some(*v),
            Field::Symbol(_) => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Field::Int(_) => None,
            Field::Symbol(s) => Some(s.as_str()),
        }
    }
}

fn is_canonical_int(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return false;
    }
    !(digits == "0" && text.starts_with('-'))
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Int(v) => write!(f, "{v}"),
            Field::Symbol(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Field {
    fn from(v: i64) -> Self { Field::Int(v) }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self { Field::parse(s) }
}

impl From<String> for Field {
    fn from(s: String) -> Self { Field::parse(&s) }
}

/// Expected kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Int,
    Symbol,
    Any,
}

impl FieldKind {
    pub fn accepts(self, field: &Field) -> bool {
        matches!((self, field), (FieldKind::Any, _) | (FieldKind::Int, Field::Int(_)) | (FieldKind::Symbol, Field::Symbol(_)))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Int => "int",
            FieldKind::Symbol => "symbol",
            FieldKind::Any => "any",
        })
    }
}

/// A fixed-order sequence of fields; one line of a dataset file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new(fields: Vec<Field>) -> Self { Record { fields } }

    #[inline]
    pub fn arity(&self) -> usize { self.fields.len() }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Field> { self.fields.get(idx) }
}

impl<F: Into<Field>> FromIterator<F> for Record {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        Record { fields: iter.into_iter().map(Into::into).collect() }
    }
}

/// How records are laid out on a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    /// Field separator.
    pub delimiter: char,
    /// Write a single space on both sides of the delimiter.
    pub padded: bool,
    /// Column kinds every record must match; `None` only fixes the arity
    /// to that of the first record.
    pub schema: Option<Vec<FieldKind>>,
}

impl Default for Format {
    fn default() -> Self { Format { delimiter: ',', padded: false, schema: None } }
}

impl Format {
    /// `ENGINE | QUEUE | OPTIONS`, the layout of HappyHex training files.
    pub fn happyhex() -> Self {
        Format { delimiter: '|', padded: true, schema: Some(vec![FieldKind::Any; 3]) }
    }

    pub fn with_schema(mut self, schema: Vec<FieldKind>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Split one line into a record. Never fails; validation happens against
    /// the dataset's arity and schema.
    pub fn parse_line(&self, line: &str) -> Record {
        line.trim().split(self.delimiter).map(|part| Field::parse(part.trim())).collect()
    }

    /// Render a record as one line, without the trailing newline.
    pub fn format_line(&self, record: &Record) -> String {
        let sep = if self.padded { format!(" {} ", self.delimiter) } else { self.delimiter.to_string() };
        record.fields.iter().map(ToString::to_string).collect::<Vec<_>>().join(&sep)
    }

    /// Why `field` cannot be written so that it reads back unchanged, if it cannot.
    pub fn unencodable_reason(&self, field: &Field) -> Option<String> {
        let text = field.to_string();
        if text.contains(self.delimiter) {
            return Some(format!("field {text:?} contains the delimiter {:?}", self.delimiter));
        }
        if text.contains(['\n', '\r']) {
            return Some(format!("field {text:?} contains a line break"));
        }
        if Field::parse(text.trim()) != *field {
            return Some(format!("field {text:?} would not read back as the same value"));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_canonical_integers_only() {
        assert_eq!(Field::parse("0"), Field::Int(0));
        assert_eq!(Field::parse("-17"), Field::Int(-17));
        assert_eq!(Field::parse("42"), Field::Int(42));
        assert_eq!(Field::parse("007"), Field::Symbol("007".into()));
        assert_eq!(Field::parse("-0"), Field::Symbol("-0".into()));
        assert_eq!(Field::parse("+3"), Field::Symbol("+3".into()));
        assert_eq!(Field::parse(""), Field::Symbol(String::new()));
        assert_eq!(Field::parse("WIN"), Field::Symbol("WIN".into()));
        // Longer than i64 stays symbolic.
        let long = "1".repeat(61);
        assert_eq!(Field::parse(&long), Field::Symbol(long.clone()));
    }

    #[test]
    fn parses_comma_lines() {
        let fmt = Format::default();
        let r = fmt.parse_line("1,0,1,WIN");
        assert_eq!(r, Record::new(vec![Field::Int(1), Field::Int(0), Field::Int(1), Field::Symbol("WIN".into())]));
        assert_eq!(fmt.format_line(&r), "1,0,1,WIN");
    }

    #[test]
    fn padded_format() {
        let fmt = Format::happyhex();
        let r = fmt.parse_line("0101 |  12,7 | 0:1:2 \n");
        assert_eq!(r.arity(), 3);
        assert_eq!(r.get(0), Some(&Field::Symbol("0101".into())));
        assert_eq!(r.get(1), Some(&Field::Symbol("12,7".into())));
        assert_eq!(fmt.format_line(&r), "0101 | 12,7 | 0:1:2");
    }

    #[test]
    fn schema_kinds() {
        assert!(FieldKind::Any.accepts(&Field::Int(1)));
        assert!(FieldKind::Int.accepts(&Field::Int(1)));
        assert!(!FieldKind::Int.accepts(&Field::Symbol("x".into())));
        assert!(FieldKind::Symbol.accepts(&Field::Symbol("x".into())));
    }

    #[test]
    fn unencodable_fields() {
        let fmt = Format::default();
        assert!(fmt.unencodable_reason(&Field::Symbol("a,b".into())).is_some());
        assert!(fmt.unencodable_reason(&Field::Symbol("a\nb".into())).is_some());
        assert!(fmt.unencodable_reason(&Field::Symbol(" a".into())).is_some());
        assert!(fmt.unencodable_reason(&Field::Symbol("5".into())).is_some());
        assert!(fmt.unencodable_reason(&Field::Symbol("05".into())).is_none());
        assert!(fmt.unencodable_reason(&Field::Int(-5)).is_none());
    }
}
