//! Template-based record formatting.
//!
//! A [`Formatter`] turns a [`Record`] into the final text line. Templates
//! use `{fieldname}` placeholders; the recognized fields are `{levelname}`,
//! `{name}`, `{message}`, and `{asctime}`. Unknown fields are rejected when
//! the formatter is constructed, never at dispatch time.

use crate::{Error, Record, Result};
use chrono::format::{Item, StrftimeItems};

/// Default formatter template, matching the conventional
/// `LEVEL:logger:message` line layout.
pub const BASIC_FORMAT: &str = "{levelname}:{name}:{message}";

/// Date pattern used for `{asctime}` when none is configured.
const DEFAULT_DATEFMT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Clone, Debug)]
enum Segment {
    Literal(String),
    Field(Field),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    LevelName,
    Name,
    Message,
    Asctime,
}

/// Renders records into text lines from a parsed template.
#[derive(Clone, Debug)]
pub struct Formatter {
    segments: Vec<Segment>,
    datefmt: Option<String>,
}

impl Formatter {
    /// Parse a template, validating every `{field}` placeholder and the
    /// optional `{asctime}` date pattern.
    ///
    /// Returns [`Error::Config`] for an unknown field name or an invalid
    /// date pattern. An unmatched `{` with no closing `}` is literal text.
    pub fn new(template: &str, datefmt: Option<&str>) -> Result<Self> {
        if let Some(pattern) = datefmt {
            validate_date_pattern(pattern)?;
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            literal.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                literal.push_str(&rest[start..]);
                rest = "";
                break;
            };
            let field = match &after[..end] {
                "levelname" => Field::LevelName,
                "name" => Field::Name,
                "message" => Field::Message,
                "asctime" => Field::Asctime,
                other => {
                    return Err(Error::Config(format!(
                        "unknown formatter field `{{{}}}`",
                        other
                    )))
                }
            };
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Field(field));
            rest = &after[end + 1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            segments,
            datefmt: datefmt.map(str::to_string),
        })
    }

    /// Render the final text line for a record.
    pub fn format(&self, record: &Record) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Field::LevelName) => out.push_str(&record.level().to_string()),
                Segment::Field(Field::Name) => out.push_str(record.name()),
                Segment::Field(Field::Message) => out.push_str(record.message()),
                Segment::Field(Field::Asctime) => {
                    let pattern = self.datefmt.as_deref().unwrap_or(DEFAULT_DATEFMT);
                    out.push_str(&record.timestamp().format(pattern).to_string());
                }
            }
        }
        out
    }
}

impl Default for Formatter {
    /// The raw-message formatter handlers fall back to when none is set.
    fn default() -> Self {
        Self {
            segments: vec![Segment::Field(Field::Message)],
            datefmt: None,
        }
    }
}

fn validate_date_pattern(pattern: &str) -> Result<()> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(Error::Config(format!(
            "invalid date pattern `{}`",
            pattern
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use serde_json::json;

    #[test]
    fn test_basic_format_round_trip() {
        let formatter = Formatter::new("{levelname}:{name}:{message}", None).unwrap();
        let record = Record::new(
            "svc",
            Level::WARNING,
            "disk at {pct}%",
            &[("pct", json!(87))],
        );
        assert_eq!(formatter.format(&record), "WARNING:svc:disk at 87%");
    }

    #[test]
    fn test_unknown_field_is_construction_error() {
        let err = Formatter::new("{levelname} {pid}", None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("pid"));
    }

    #[test]
    fn test_default_formatter_is_message_only() {
        let record = Record::new("svc", Level::INFO, "hello {who}", &[("who", json!("world"))]);
        assert_eq!(Formatter::default().format(&record), "hello world");
    }

    #[test]
    fn test_asctime_uses_date_pattern() {
        let formatter = Formatter::new("{asctime} {message}", Some("%Y")).unwrap();
        let record = Record::new("svc", Level::INFO, "tick", &[]);
        let year = record.timestamp().format("%Y").to_string();
        assert_eq!(formatter.format(&record), format!("{} tick", year));
    }

    #[test]
    fn test_invalid_date_pattern_is_construction_error() {
        let err = Formatter::new("{asctime}", Some("%Q")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_literal_text_preserved() {
        let formatter = Formatter::new("[{levelname}] <{name}>", None).unwrap();
        let record = Record::new("a.b", Level::ERROR, "x", &[]);
        assert_eq!(formatter.format(&record), "[ERROR] <a.b>");
    }
}
