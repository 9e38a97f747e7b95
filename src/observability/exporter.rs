//! OpenTelemetry span exporter writing one JSON object per span.

use super::file_writer::RotatingFile;
use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::future::BoxFuture;
use opentelemetry::trace::{SpanId, Status, TraceError};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

/// Service name attached to the provider resource and every record.
pub const SERVICE_NAME: &str = "knowledge-file";

/// One exported span, flattened for line-oriented tooling.
///
/// ```json
/// {"ts":"2026-01-02T03:04:05.000006Z","service":"knowledge-file",
///  "trace_id":"…","span_id":"…","parent_span_id":null,
///  "name":"dispatch","duration_us":1834,
///  "attributes":{"operation":"getKfList","retcode":0},"status":"unset"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanRecord {
    /// End time, RFC 3339 in UTC with microseconds.
    pub ts: String,
    pub service: String,
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: Option<String>,
    pub name: String,
    pub duration_us: u64,
    pub attributes: Map<String, JsonValue>,
    pub status: String,
}

impl SpanRecord {
    #[must_use]
    pub fn from_span(span: &SpanData, service: &str) -> Self {
        let parent_span_id = (span.parent_span_id != SpanId::INVALID).then(|| format!("{:016x}", span.parent_span_id));
        let duration_us = span
            .end_time
            .duration_since(span.start_time)
            .map_or(0, |d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX));

        Self {
            ts: timestamp(span.end_time),
            service: service.to_string(),
            trace_id: format!("{:032x}", span.span_context.trace_id()),
            span_id: format!("{:016x}", span.span_context.span_id()),
            parent_span_id,
            name: span.name.to_string(),
            duration_us,
            attributes: attributes_json(&span.attributes),
            status: status_text(&span.status),
        }
    }
}

fn timestamp(at: SystemTime) -> String {
    DateTime::<Utc>::from(at).to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn attributes_json(attributes: &[KeyValue]) -> Map<String, JsonValue> {
    attributes
        .iter()
        .map(|kv| (kv.key.to_string(), value_json(&kv.value)))
        .collect()
}

fn value_json(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::I64(i) => JsonValue::from(*i),
        Value::F64(f) => serde_json::Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::String(s) => JsonValue::String(s.to_string()),
        other @ Value::Array(_) => JsonValue::String(other.to_string()),
    }
}

fn status_text(status: &Status) -> String {
    match status {
        Status::Unset => "unset".to_string(),
        Status::Ok => "ok".to_string(),
        Status::Error { description } => format!("error: {description}"),
    }
}

/// [`SpanExporter`] appending [`SpanRecord`] lines to a [`RotatingFile`].
#[derive(Debug)]
pub struct JsonLinesExporter {
    writer: Arc<RotatingFile>,
    service: String,
    shut_down: AtomicBool,
}

impl JsonLinesExporter {
    #[must_use]
    pub fn new(writer: Arc<RotatingFile>) -> Self {
        Self {
            writer,
            service: SERVICE_NAME.to_string(),
            shut_down: AtomicBool::new(false),
        }
    }

    fn write_batch(&self, batch: &[SpanData]) -> ExportResult {
        for span in batch {
            let line = serde_json::to_string(&SpanRecord::from_span(span, &self.service))
                .map_err(|e| TraceError::from(e.to_string()))?;
            self.writer
                .write_line(&line)
                .map_err(|e| TraceError::from(e.to_string()))?;
        }
        Ok(())
    }
}

impl SpanExporter for JsonLinesExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = if self.shut_down.load(Ordering::Acquire) {
            Err(TraceError::from("span exporter is shut down"))
        } else {
            self.write_batch(&batch)
        };
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.shut_down.store(true, Ordering::Release);
    }

    fn set_resource(&mut self, resource: &Resource) {
        if let Some(name) = resource.get(opentelemetry::Key::from_static_str("service.name")) {
            self.service = name.to_string();
        }
    }
}

/// Builds a tracer provider that exports every finished span synchronously
/// to `writer`.
#[must_use]
pub fn tracer_provider(writer: Arc<RotatingFile>) -> TracerProvider {
    let resource = Resource::new(vec![KeyValue::new("service.name", SERVICE_NAME)]);

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(JsonLinesExporter::new(writer))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{Span as _, Tracer as _, TracerProvider as _};

    #[test]
    fn attribute_values_keep_their_json_types() {
        let attrs = attributes_json(&[
            KeyValue::new("kb_id", "kb-1"),
            KeyValue::new("retcode", 0_i64),
            KeyValue::new("throttled", false),
            KeyValue::new("ratio", 0.5),
        ]);

        assert_eq!(attrs["kb_id"], JsonValue::from("kb-1"));
        assert_eq!(attrs["retcode"], JsonValue::from(0));
        assert_eq!(attrs["throttled"], JsonValue::from(false));
        assert_eq!(attrs["ratio"], JsonValue::from(0.5));
    }

    #[test]
    fn timestamps_are_utc_rfc3339() {
        let at = SystemTime::UNIX_EPOCH + std::time::Duration::from_micros(1_500_000);
        assert_eq!(timestamp(at), "1970-01-01T00:00:01.500000Z");
    }

    #[test]
    fn finished_spans_are_written_as_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Arc::new(RotatingFile::new(dir.path().join("spans.jsonl")));
        let provider = tracer_provider(Arc::clone(&writer));
        let tracer = provider.tracer("test");

        let mut span = tracer.start("getKfList");
        span.set_attribute(KeyValue::new("kb_id", "kb-1"));
        span.end();

        let text = std::fs::read_to_string(writer.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);

        let record: JsonValue = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record["name"], "getKfList");
        assert_eq!(record["service"], SERVICE_NAME);
        assert_eq!(record["attributes"]["kb_id"], "kb-1");
        assert_eq!(record["parent_span_id"], JsonValue::Null);
        assert_eq!(record["status"], "unset");
        assert!(record["ts"].as_str().unwrap().ends_with('Z'));
    }
}
