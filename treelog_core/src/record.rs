//! Log records.
//!
//! A [`Record`] is the immutable snapshot of one log event, created only
//! after the originating logger's level check has passed. Message rendering
//! is deferred and memoized so repeated handler invocations for the same
//! record never pay the substitution cost twice.

use crate::Level;
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::HashMap;

/// Immutable snapshot of a single log event.
#[derive(Clone, Debug)]
pub struct Record {
    name: String,
    level: Level,
    template: String,
    context: HashMap<String, Value>,
    timestamp: DateTime<Utc>,
    rendered: OnceCell<String>,
}

impl Record {
    /// Create a record for the given logger name, level, and unrendered
    /// message template. Context values are substituted lazily on the first
    /// call to [`Record::message`].
    pub fn new(
        name: impl Into<String>,
        level: Level,
        template: &str,
        context: &[(&str, Value)],
    ) -> Self {
        Self {
            name: name.into(),
            level,
            template: template.to_string(),
            context: context
                .iter()
                .map(|(key, value)| ((*key).to_string(), value.clone()))
                .collect(),
            timestamp: Utc::now(),
            rendered: OnceCell::new(),
        }
    }

    /// Name of the logger that created this record.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// The unrendered message template.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn context(&self) -> &HashMap<String, Value> {
        &self.context
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The rendered message: each `{key}` placeholder in the template is
    /// replaced with the corresponding context value.
    ///
    /// Policy: a placeholder whose key is missing from the context is left
    /// verbatim in the output. String values substitute bare (no JSON
    /// quoting); other values use their JSON rendering. The result is
    /// computed at most once per record.
    pub fn message(&self) -> &str {
        self.rendered
            .get_or_init(|| render_template(&self.template, &self.context))
    }
}

fn render_template(template: &str, context: &HashMap<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match context.get(key) {
                    Some(value) => out.push_str(&value_to_string(value)),
                    None => {
                        // Missing key: keep the placeholder verbatim
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated brace is literal text
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
