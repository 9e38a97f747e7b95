//! Remote service abstraction.
//!
//! [`KbService`] is the seam between the store and the knowledge-base REST API.
//! Implementations only have to provide [`KbService::request`]; the per-call
//! methods route through it so a test double can record every call in one
//! place.

use crate::domain::error::Result;
use crate::domain::Document;
use crate::service::payload::Payload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// HTTP verb an endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One remote call of the knowledge-base API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CreateKb,
    UpdateKb,
    GetKbDetail,
    GetDocumentList,
    DocumentChangeStatus,
    DocumentRm,
    DocumentRename,
    DocumentCreate,
    DocumentRun,
    DocumentChangeParser,
    DocumentThumbnails,
}

impl Endpoint {
    /// Path relative to the API base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::CreateKb => "/v1/kb/create",
            Self::UpdateKb => "/v1/kb/update",
            Self::GetKbDetail => "/v1/kb/detail",
            Self::GetDocumentList => "/v1/document/list",
            Self::DocumentChangeStatus => "/v1/document/change_status",
            Self::DocumentRm => "/v1/document/rm",
            Self::DocumentRename => "/v1/document/rename",
            Self::DocumentCreate => "/v1/document/create",
            Self::DocumentRun => "/v1/document/run",
            Self::DocumentChangeParser => "/v1/document/change_parser",
            Self::DocumentThumbnails => "/v1/document/thumbnails",
        }
    }

    #[must_use]
    pub const fn method(self) -> Method {
        match self {
            Self::GetKbDetail | Self::GetDocumentList | Self::DocumentThumbnails => Method::Get,
            _ => Method::Post,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Envelope every endpoint answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// `0` on success, anything else is a failure reported by the service.
    pub retcode: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retmsg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.retcode == 0
    }

    /// Successful envelope carrying `data`.
    #[must_use]
    pub const fn ok(data: Option<Value>) -> Self {
        Self { retcode: 0, retmsg: None, data }
    }

    /// Failed envelope with the given code.
    #[must_use]
    pub const fn failed(retcode: i64) -> Self {
        Self { retcode, retmsg: None, data: None }
    }
}

/// `data` of a successful document list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentListData {
    pub docs: Vec<Document>,
    pub total: u64,
}

/// Client for the knowledge-base REST API.
///
/// Errors returned here are transport-level failures. A non-zero `retcode`
/// arrives as `Ok(ApiResponse)`.
#[async_trait]
pub trait KbService: Send + Sync {
    /// Sends `body` to `endpoint` and decodes the response envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent, the HTTP status is not
    /// a success, or the body is not a response envelope.
    async fn request(&self, endpoint: Endpoint, body: Payload) -> Result<ApiResponse>;

    async fn create_kb(&self, body: Payload) -> Result<ApiResponse> {
        self.request(Endpoint::CreateKb, body).await
    }

    async fn update_kb(&self, body: Payload) -> Result<ApiResponse> {
        self.request(Endpoint::UpdateKb, body).await
    }

    async fn get_kb_detail(&self, body: Payload) -> Result<ApiResponse> {
        self.request(Endpoint::GetKbDetail, body).await
    }

    async fn get_document_list(&self, body: Payload) -> Result<ApiResponse> {
        self.request(Endpoint::GetDocumentList, body).await
    }

    async fn document_change_status(&self, body: Payload) -> Result<ApiResponse> {
        self.request(Endpoint::DocumentChangeStatus, body).await
    }

    async fn document_rm(&self, body: Payload) -> Result<ApiResponse> {
        self.request(Endpoint::DocumentRm, body).await
    }

    async fn document_rename(&self, body: Payload) -> Result<ApiResponse> {
        self.request(Endpoint::DocumentRename, body).await
    }

    async fn document_create(&self, body: Payload) -> Result<ApiResponse> {
        self.request(Endpoint::DocumentCreate, body).await
    }

    async fn document_run(&self, body: Payload) -> Result<ApiResponse> {
        self.request(Endpoint::DocumentRun, body).await
    }

    async fn document_change_parser(&self, body: Payload) -> Result<ApiResponse> {
        self.request(Endpoint::DocumentChangeParser, body).await
    }

    async fn document_thumbnails(&self, body: Payload) -> Result<ApiResponse> {
        self.request(Endpoint::DocumentThumbnails, body).await
    }
}

#[async_trait]
impl<T: KbService + ?Sized> KbService for std::sync::Arc<T> {
    async fn request(&self, endpoint: Endpoint, body: Payload) -> Result<ApiResponse> {
        (**self).request(endpoint, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_without_data_decodes() {
        let resp: ApiResponse = serde_json::from_value(json!({"retcode": 102, "retmsg": "no auth"})).unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.data, None);
    }

    #[test]
    fn read_endpoints_are_gets() {
        assert_eq!(Endpoint::GetDocumentList.method(), Method::Get);
        assert_eq!(Endpoint::DocumentThumbnails.method(), Method::Get);
        assert_eq!(Endpoint::DocumentRm.method(), Method::Post);
        assert_eq!(Endpoint::DocumentRename.to_string(), "/v1/document/rename");
    }
}
