//! Operations, request shaping and response handling.
//!
//! Every remote-sync operation follows the same flow:
//! 1. [`request_body`] shapes the caller's payload (allow/deny-listing fields,
//!    or adding pagination and search for the list fetch)
//! 2. the store sends it to the operation's [`Endpoint`]
//! 3. [`handle_response`] inspects `retcode` and returns the follow-up actions
//! 4. the store executes them and returns `retcode` to the caller
//!
//! A non-zero `retcode` yields no actions at all: state is left unchanged and
//! nothing is notified.

use super::actions::Action;
use super::modals::Modal;
use super::state::{PageState, StatePatch, Thumbnails};
use crate::domain::error::{KnowledgeFileError, Result};
use crate::service::payload::{id_field, omit, pick, Payload};
use crate::service::{ApiResponse, DocumentListData, Endpoint};
use serde_json::Value;

pub const MSG_CREATED: &str = "Created!";
pub const MSG_MODIFIED: &str = "Modified!";
pub const MSG_DELETED: &str = "Deleted!";
pub const MSG_RENAMED: &str = "rename success!";
pub const MSG_RUN: &str = "Operation successfully!";

/// A named operation with the payload the page layer passed in.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Creates a knowledge base.
    CreateKb(Payload),
    /// Updates a knowledge base.
    UpdateKb(Payload),
    /// Reads knowledge-base details. The response is not used.
    GetKbDetail(Payload),
    /// Fetches the current page of documents.
    GetDocumentList(Payload),
    /// Enables or disables a document. Sends only `doc_id` and `status`.
    UpdateDocumentStatus(Payload),
    /// Deletes a document. Sends only `doc_id`.
    RemoveDocument(Payload),
    /// Renames a document. Sends everything but `kb_id`.
    RenameDocument(Payload),
    /// Creates an empty document.
    CreateDocument(Payload),
    /// Starts or cancels parsing. Sends everything but `knowledgeBaseId`.
    RunDocument(Payload),
    /// Changes a document's parser and parser configuration.
    ChangeParser(Payload),
    /// Fetches thumbnails for a set of documents.
    FetchThumbnails(Payload),
}

impl Operation {
    /// Looks an operation up by the name the page layer dispatches it with.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeFileError::UnknownOperation`] for any other name.
    pub fn from_name(name: &str, payload: Payload) -> Result<Self> {
        let op = match name {
            "createKf" => Self::CreateKb(payload),
            "updateKf" => Self::UpdateKb(payload),
            "getKfDetail" => Self::GetKbDetail(payload),
            "getKfList" => Self::GetDocumentList(payload),
            "updateDocumentStatus" => Self::UpdateDocumentStatus(payload),
            "document_rm" => Self::RemoveDocument(payload),
            "document_rename" => Self::RenameDocument(payload),
            "document_create" => Self::CreateDocument(payload),
            "document_run" => Self::RunDocument(payload),
            "document_change_parser" => Self::ChangeParser(payload),
            "fetch_document_thumbnails" => Self::FetchThumbnails(payload),
            other => return Err(KnowledgeFileError::UnknownOperation(other.to_string())),
        };
        Ok(op)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateKb(_) => "createKf",
            Self::UpdateKb(_) => "updateKf",
            Self::GetKbDetail(_) => "getKfDetail",
            Self::GetDocumentList(_) => "getKfList",
            Self::UpdateDocumentStatus(_) => "updateDocumentStatus",
            Self::RemoveDocument(_) => "document_rm",
            Self::RenameDocument(_) => "document_rename",
            Self::CreateDocument(_) => "document_create",
            Self::RunDocument(_) => "document_run",
            Self::ChangeParser(_) => "document_change_parser",
            Self::FetchThumbnails(_) => "fetch_document_thumbnails",
        }
    }

    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        match self {
            Self::CreateKb(_) => Endpoint::CreateKb,
            Self::UpdateKb(_) => Endpoint::UpdateKb,
            Self::GetKbDetail(_) => Endpoint::GetKbDetail,
            Self::GetDocumentList(_) => Endpoint::GetDocumentList,
            Self::UpdateDocumentStatus(_) => Endpoint::DocumentChangeStatus,
            Self::RemoveDocument(_) => Endpoint::DocumentRm,
            Self::RenameDocument(_) => Endpoint::DocumentRename,
            Self::CreateDocument(_) => Endpoint::DocumentCreate,
            Self::RunDocument(_) => Endpoint::DocumentRun,
            Self::ChangeParser(_) => Endpoint::DocumentChangeParser,
            Self::FetchThumbnails(_) => Endpoint::DocumentThumbnails,
        }
    }

    #[must_use]
    pub const fn payload(&self) -> &Payload {
        match self {
            Self::CreateKb(p)
            | Self::UpdateKb(p)
            | Self::GetKbDetail(p)
            | Self::GetDocumentList(p)
            | Self::UpdateDocumentStatus(p)
            | Self::RemoveDocument(p)
            | Self::RenameDocument(p)
            | Self::CreateDocument(p)
            | Self::RunDocument(p)
            | Self::ChangeParser(p)
            | Self::FetchThumbnails(p) => p,
        }
    }
}

/// Shapes the request body an operation sends.
#[must_use]
pub fn request_body(op: &Operation, state: &PageState) -> Payload {
    match op {
        Operation::GetDocumentList(payload) => list_request_body(payload, state),
        Operation::UpdateDocumentStatus(payload) => pick(payload, &["doc_id", "status"]),
        Operation::RemoveDocument(payload) => pick(payload, &["doc_id"]),
        Operation::RenameDocument(payload) => omit(payload, &["kb_id"]),
        Operation::RunDocument(payload) => omit(payload, &["knowledgeBaseId"]),
        Operation::CreateKb(payload)
        | Operation::UpdateKb(payload)
        | Operation::GetKbDetail(payload)
        | Operation::CreateDocument(payload)
        | Operation::ChangeParser(payload)
        | Operation::FetchThumbnails(payload) => payload.clone(),
    }
}

/// List request: the caller's payload plus the page cursor, plus `keywords`
/// when a search string is set. Cursor and search override same-named keys
/// in the payload.
#[must_use]
pub fn list_request_body(payload: &Payload, state: &PageState) -> Payload {
    let mut body = payload.clone();
    body.insert("page".to_string(), Value::from(state.pagination.current.get()));
    body.insert("page_size".to_string(), Value::from(state.pagination.page_size.get()));
    if !state.search_string.is_empty() {
        body.insert("keywords".to_string(), Value::String(state.search_string.clone()));
    }
    body
}

/// Decides what follows a response.
///
/// # Errors
///
/// Returns [`KnowledgeFileError::MalformedResponse`] if a successful list or
/// thumbnail response does not carry the expected `data`.
pub fn handle_response(op: &Operation, response: &ApiResponse) -> Result<Vec<Action>> {
    if !response.is_success() {
        tracing::debug!(
            operation = op.name(),
            retcode = response.retcode,
            retmsg = ?response.retmsg,
            "remote call reported failure, leaving state unchanged"
        );
        return Ok(vec![]);
    }

    let actions = match op {
        Operation::CreateKb(_) => vec![Action::notify(MSG_CREATED)],
        Operation::UpdateKb(_) => vec![Action::notify(MSG_MODIFIED)],
        Operation::GetKbDetail(_) => vec![],
        Operation::GetDocumentList(_) => {
            let list: DocumentListData = decode_data(response)?;
            tracing::debug!(docs = list.docs.len(), total = list.total, "document list received");
            vec![Action::Patch(StatePatch::default().listing(list.docs, list.total))]
        }
        Operation::UpdateDocumentStatus(payload) => vec![
            Action::notify(MSG_MODIFIED),
            Action::RefreshList { kb_id: id_field(payload, "kb_id") },
        ],
        Operation::RemoveDocument(payload) => vec![
            Action::notify(MSG_DELETED),
            Action::RefreshList { kb_id: id_field(payload, "kb_id") },
        ],
        Operation::RenameDocument(payload) => vec![
            Action::notify(MSG_RENAMED),
            Action::Patch(StatePatch::default().modal(Modal::Rename, false)),
            Action::RefreshList { kb_id: id_field(payload, "kb_id") },
        ],
        Operation::CreateDocument(_) => vec![
            Action::Patch(StatePatch::default().modal(Modal::CreateDocument, false)),
            Action::notify(MSG_CREATED),
        ],
        Operation::RunDocument(payload) => {
            let mut actions = Vec::with_capacity(2);
            if let Some(kb_id) = id_field(payload, "knowledgeBaseId") {
                actions.push(Action::RefreshList { kb_id: Some(kb_id) });
            }
            actions.push(Action::notify(MSG_RUN));
            actions
        }
        Operation::ChangeParser(_) => vec![
            Action::Patch(StatePatch::default().modal(Modal::SegmentSet, false)),
            Action::notify(MSG_MODIFIED),
        ],
        Operation::FetchThumbnails(_) => {
            let thumbnails: Thumbnails = decode_data(response)?;
            vec![Action::Patch(StatePatch::default().thumbnails(thumbnails))]
        }
    };

    Ok(actions)
}

fn decode_data<T: serde::de::DeserializeOwned>(response: &ApiResponse) -> Result<T> {
    let data = response.data.clone().unwrap_or(Value::Null);
    Ok(serde_json::from_value(data)?)
}
