//! Test doubles shared by the integration suites.

#![allow(dead_code)]

use async_trait::async_trait;
use knowledge_file::notify::Notifier;
use knowledge_file::service::{ApiResponse, Endpoint, KbService, Payload};
use knowledge_file::{mount, Config, KnowledgeFileError, ListStateStore, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned outcome of one endpoint.
#[derive(Debug, Clone)]
enum Reply {
    Respond(ApiResponse),
    HttpError(u16),
}

/// [`KbService`] that records every call and answers from a per-endpoint table.
///
/// Unconfigured endpoints answer `retcode = 0`; the list endpoint then
/// carries an empty page and the thumbnail endpoint an empty map.
#[derive(Debug, Default)]
pub struct MockKbService {
    calls: Mutex<Vec<(Endpoint, Payload)>>,
    replies: Mutex<HashMap<Endpoint, Reply>>,
    latency: Mutex<Option<Duration>>,
}

impl MockKbService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, endpoint: Endpoint, response: ApiResponse) {
        self.replies.lock().unwrap().insert(endpoint, Reply::Respond(response));
    }

    pub fn fail_with_status(&self, endpoint: Endpoint, status: u16) {
        self.replies.lock().unwrap().insert(endpoint, Reply::HttpError(status));
    }

    /// Every call sleeps this long before its reply is looked up.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    pub fn calls(&self) -> Vec<(Endpoint, Payload)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.calls().into_iter().map(|(endpoint, _)| endpoint).collect()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.calls().iter().filter(|(e, _)| *e == endpoint).count()
    }

    fn default_reply(endpoint: Endpoint) -> ApiResponse {
        match endpoint {
            Endpoint::GetDocumentList => ApiResponse::ok(Some(json!({"docs": [], "total": 0}))),
            Endpoint::DocumentThumbnails => ApiResponse::ok(Some(json!({}))),
            _ => ApiResponse::ok(None),
        }
    }
}

#[async_trait]
impl KbService for MockKbService {
    async fn request(&self, endpoint: Endpoint, body: Payload) -> Result<ApiResponse> {
        self.calls.lock().unwrap().push((endpoint, body));
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let reply = self.replies.lock().unwrap().get(&endpoint).cloned();
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::HttpError(status)) => Err(KnowledgeFileError::Http {
                status,
                body: "mock failure".to_string(),
            }),
            None => Ok(Self::default_reply(endpoint)),
        }
    }
}

/// [`Notifier`] keeping every message in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

pub type TestStore = ListStateStore<Arc<MockKbService>, Arc<RecordingNotifier>>;

pub struct Harness {
    pub service: Arc<MockKbService>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<TestStore>,
}

pub fn harness() -> Harness {
    let service = MockKbService::new();
    let notifier = RecordingNotifier::new();
    let store = mount(Arc::clone(&service), Arc::clone(&notifier), &Config::default());
    Harness { service, notifier, store }
}

/// Builds a payload from a JSON object literal.
pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("payload must be a JSON object, got {other}"),
    }
}

pub fn list_page(ids: &[&str], total: u64) -> ApiResponse {
    let docs: Vec<Value> = ids
        .iter()
        .map(|id| json!({"id": id, "name": format!("{id}.pdf"), "status": "1", "run": "3"}))
        .collect();
    ApiResponse::ok(Some(json!({"docs": docs, "total": total})))
}
