//! HTTP implementation of [`KbService`] on top of `reqwest`.

use crate::domain::error::{KnowledgeFileError, Result};
use crate::service::client::{ApiResponse, Endpoint, KbService, Method};
use crate::service::payload::Payload;
use crate::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::Instrument;

/// Knowledge-base API client.
#[derive(Debug, Clone)]
pub struct HttpKbService {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpKbService {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or the HTTP client cannot be
    /// constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(KnowledgeFileError::Config("api_base_url is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: config.api_token.clone(),
        })
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

#[async_trait]
impl KbService for HttpKbService {
    async fn request(&self, endpoint: Endpoint, body: Payload) -> Result<ApiResponse> {
        let span = tracing::debug_span!("kb_request", endpoint = %endpoint);

        async move {
            let url = self.url(endpoint);
            let mut req = match endpoint.method() {
                Method::Get => self.client.get(&url).query(&query_pairs(&body)),
                Method::Post => self.client.post(&url).json(&body),
            };
            if let Some(token) = &self.token {
                req = req.bearer_auth(token);
            }

            let response = req.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::debug!(status = status.as_u16(), "non-success HTTP status");
                return Err(KnowledgeFileError::Http {
                    status: status.as_u16(),
                    body,
                });
            }

            let bytes = response.bytes().await?;
            let envelope: ApiResponse = serde_json::from_slice(&bytes)?;
            tracing::debug!(retcode = envelope.retcode, "response received");
            Ok(envelope)
        }
        .instrument(span)
        .await
    }
}

/// Flattens a payload into query parameters. Arrays are comma-joined, nested
/// objects are sent as their JSON text, `null` values are dropped.
fn query_pairs(body: &Payload) -> Vec<(String, String)> {
    body.iter()
        .filter_map(|(key, value)| scalar_text(value).map(|text| (key.clone(), text)))
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_pairs_flatten_scalars_and_arrays() {
        let body = json!({
            "kb_id": "k1",
            "page": 2,
            "doc_ids": ["a", "b"],
            "skip": null
        });
        let mut pairs = query_pairs(body.as_object().unwrap());
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("doc_ids".to_string(), "a,b".to_string()),
                ("kb_id".to_string(), "k1".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_empty_base_url() {
        let config = Config {
            api_base_url: "/".to_string(),
            ..Config::default()
        };
        assert!(matches!(HttpKbService::new(&config), Err(KnowledgeFileError::Config(_))));
    }

    #[test]
    fn joins_paths_without_double_slash() {
        let config = Config {
            api_base_url: "http://kb.local:9380/".to_string(),
            ..Config::default()
        };
        let service = HttpKbService::new(&config).unwrap();
        assert_eq!(service.url(Endpoint::DocumentRm), "http://kb.local:9380/v1/document/rm");
    }
}
