//! Document model as reported by the remote service.
//!
//! The remote service owns documents; the store only caches the current page.
//! Only `id` and `parser_config` are typed. Every other field stays in
//! [`Document::fields`] as raw JSON and is read through lenient accessors, so
//! an unexpected shape (a `null` name, a numeric status) never fails a list
//! fetch and a document round-trips unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single ingested file within a knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub parser_config: Value,
    /// Everything else the server sent, uninterpreted.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Creates an enabled document with only an id and a name, as used by
    /// callers building a `current_record` before the server has answered.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parser_config: Value::Null,
            fields: Map::new(),
        }
        .with("name", name.into())
        .with("status", DocumentStatus::Enabled.as_wire())
    }

    /// Sets a raw field, builder style.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a raw field.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Raw field, `None` when absent or `null`.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.field("name").and_then(Value::as_str)
    }

    #[must_use]
    pub fn kb_id(&self) -> Option<&str> {
        self.field("kb_id").and_then(Value::as_str)
    }

    #[must_use]
    pub fn parser_id(&self) -> Option<&str> {
        self.field("parser_id").and_then(Value::as_str)
    }

    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.field("thumbnail").and_then(Value::as_str)
    }

    /// Parsing progress as a fraction; the service reports failures as `-1`.
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        self.field("progress").and_then(number)
    }

    #[must_use]
    pub fn chunk_num(&self) -> Option<u64> {
        self.field("chunk_num").and_then(count)
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.field("size").and_then(count)
    }

    /// Parsed enable flag. Anything other than `"1"` or `1` counts as disabled.
    #[must_use]
    pub fn enable_status(&self) -> DocumentStatus {
        self.field("status")
            .and_then(code)
            .map_or(DocumentStatus::Disabled, |raw| DocumentStatus::from_wire(&raw))
    }

    /// Parsed processing state, `None` when the server did not report one
    /// or reported a code this crate does not know.
    #[must_use]
    pub fn run_status(&self) -> Option<RunStatus> {
        self.field("run").and_then(code).and_then(|raw| RunStatus::from_wire(&raw))
    }
}

/// Wire codes arrive as `"1"` or as `1`.
fn code(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(value: &Value) -> Option<u64> {
    number(value).filter(|n| n.is_finite() && *n >= 0.0).map(|n| n as u64)
}

/// Whether a document takes part in retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Enabled,
    Disabled,
}

impl DocumentStatus {
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        if raw == "1" {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }

    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Enabled => "1",
            Self::Disabled => "0",
        }
    }
}

/// Parsing progress of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Unstarted,
    Running,
    Cancelled,
    Done,
    Failed,
}

impl RunStatus {
    #[must_use]
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "0" => Some(Self::Unstarted),
            "1" => Some(Self::Running),
            "2" => Some(Self::Cancelled),
            "3" => Some(Self::Done),
            "4" => Some(Self::Failed),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Unstarted => "0",
            Self::Running => "1",
            Self::Cancelled => "2",
            Self::Done => "3",
            Self::Failed => "4",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_unknown_fields_through_a_round_trip() {
        let raw = json!({
            "id": "d1",
            "name": "invoice.pdf",
            "status": "1",
            "run": "3",
            "parser_config": {"chunk_token_num": 128},
            "location": "invoice.pdf",
            "token_num": 4096
        });

        let doc: Document = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(doc.field("location"), Some(&json!("invoice.pdf")));
        assert_eq!(doc.name(), Some("invoice.pdf"));
        assert_eq!(doc.run_status(), Some(RunStatus::Done));
        assert_eq!(serde_json::to_value(&doc).unwrap(), raw);
    }

    #[test]
    fn odd_shapes_decode_and_degrade() {
        let doc: Document = serde_json::from_value(json!({
            "id": "d1",
            "name": null,
            "status": 1,
            "run": 4,
            "size": 1.5,
            "chunk_num": "12",
            "progress": "n/a",
            "thumbnail": 7
        }))
        .unwrap();

        assert_eq!(doc.name(), None);
        assert_eq!(doc.enable_status(), DocumentStatus::Enabled);
        assert_eq!(doc.run_status(), Some(RunStatus::Failed));
        assert_eq!(doc.size(), Some(1));
        assert_eq!(doc.chunk_num(), Some(12));
        assert_eq!(doc.progress(), None);
        assert_eq!(doc.thumbnail(), None);
    }

    #[test]
    fn anything_but_one_is_disabled() {
        let mut doc = Document::new("d1", "a.txt");
        assert_eq!(doc.enable_status(), DocumentStatus::Enabled);
        doc.set("status", "0");
        assert_eq!(doc.enable_status(), DocumentStatus::Disabled);
        doc.set("status", Value::Null);
        assert_eq!(doc.enable_status(), DocumentStatus::Disabled);
        doc.set("status", json!({"enabled": true}));
        assert_eq!(doc.enable_status(), DocumentStatus::Disabled);
    }

    #[test]
    fn unknown_run_code_has_no_status() {
        let doc = Document::new("d1", "a.txt").with("run", "9");
        assert_eq!(doc.run_status(), None);
    }
}
