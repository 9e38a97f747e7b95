//! The list state store: page state plus the operations that sync it with the
//! remote service.
//!
//! [`ListStateStore`] owns the page state of one mounted list page. Its remote
//! service and notifier are injected at construction; nothing is looked up
//! from a global registry. State is published through a `tokio::sync::watch`
//! channel, so views can either take a [`snapshot`](ListStateStore::snapshot)
//! or [`subscribe`](ListStateStore::subscribe) to every change.
//!
//! # Concurrency
//!
//! Every patch is a single `send_modify`, so it is applied entirely or not at
//! all. Independent operations may be in flight at the same time (a poll fetch
//! while a rename is outstanding); each applies its own patch when its
//! response arrives, and the last writer wins. A dispatched remote call is
//! never cancelled.
//!
//! # Example
//!
//! ```rust,no_run
//! use knowledge_file::app::ListStateStore;
//! use knowledge_file::notify::TracingNotifier;
//! use knowledge_file::service::HttpKbService;
//! use knowledge_file::Config;
//!
//! # async fn run() -> knowledge_file::Result<()> {
//! let config = Config::default();
//! let store = ListStateStore::mount(HttpKbService::new(&config)?, TracingNotifier, &config);
//! store.set_search_string("invoice");
//! let retcode = store.fetch_list("kb-1").await?;
//! println!("{retcode}: {} documents", store.snapshot().total);
//! # Ok(())
//! # }
//! ```

use super::actions::Action;
use super::handler::{self, Operation};
use super::modals::Modal;
use super::state::{PageState, PaginationPatch, StatePatch, Thumbnails};
use super::viewmodel::ListViewModel;
use crate::domain::error::Result;
use crate::domain::Document;
use crate::notify::Notifier;
use crate::service::payload::{kb_payload, Payload};
use crate::service::{ApiResponse, Endpoint, KbService};
use crate::Config;
use tokio::sync::watch;
use tracing::Instrument;

/// State and operations of one document list page session.
pub struct ListStateStore<S, N> {
    service: S,
    notifier: N,
    state: watch::Sender<PageState>,
}

impl<S, N> std::fmt::Debug for ListStateStore<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListStateStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<S: KbService, N: Notifier> ListStateStore<S, N> {
    /// Creates a store around `initial`.
    pub fn new(service: S, notifier: N, initial: PageState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            service,
            notifier,
            state,
        }
    }

    /// Creates a store with the defaults of a freshly mounted page.
    pub fn mount(service: S, notifier: N, config: &Config) -> Self {
        tracing::debug!(page_size = config.page_size.get(), "mounting document list store");
        Self::new(service, notifier, PageState::new(config.page_size))
    }

    // ------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> PageState {
        self.state.borrow().clone()
    }

    /// Runs `f` against the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&PageState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PageState> {
        self.state.subscribe()
    }

    /// View model for the list as it stands now.
    #[must_use]
    pub fn view_model(&self) -> ListViewModel {
        self.read(ListViewModel::from_state)
    }

    // ------------------------------------------------------------------
    // Patches
    // ------------------------------------------------------------------

    /// Applies a bulk patch. Fields the patch does not carry are untouched.
    pub fn apply_patch(&self, patch: StatePatch) {
        if patch.is_empty() {
            return;
        }
        self.state.send_modify(|state| state.apply(patch));
    }

    pub fn set_current_record(&self, record: Option<Document>) {
        self.state.send_modify(|state| state.current_record = record);
    }

    pub fn set_search_string(&self, search: impl Into<String>) {
        let search = search.into();
        self.state.send_modify(|state| state.search_string = search);
    }

    pub fn set_rename_modal_visible(&self, visible: bool) {
        self.set_modal_visible(Modal::Rename, visible);
    }

    pub fn set_modal_visible(&self, modal: Modal, visible: bool) {
        self.state.send_modify(|state| state.modals.set(modal, visible));
    }

    /// Replaces the whole thumbnail map.
    pub fn set_thumbnails(&self, thumbnails: Thumbnails) {
        self.state.send_modify(|state| state.thumbnails = thumbnails);
    }

    /// Merges into the page cursor only.
    pub fn merge_pagination(&self, patch: PaginationPatch) {
        self.state.send_modify(|state| state.merge_pagination(patch));
    }

    // ------------------------------------------------------------------
    // Remote-sync operations
    // ------------------------------------------------------------------

    /// Runs an operation and returns the remote `retcode`.
    ///
    /// On `retcode == 0` the operation's follow-ups (patches, notifications,
    /// list refetches) run in order before this returns. A failed follow-up
    /// refetch is logged; it does not change the returned code.
    ///
    /// # Errors
    ///
    /// Transport failures and malformed responses are returned as errors;
    /// state is left unchanged in that case.
    pub async fn dispatch(&self, op: Operation) -> Result<i64> {
        let span = tracing::debug_span!("dispatch", operation = op.name());

        async move {
            let (response, actions) = self.send(&op).await?;

            for action in actions {
                match action {
                    Action::Patch(patch) => self.apply_patch(patch),
                    Action::Notify(message) => self.notifier.success(&message),
                    Action::RefreshList { kb_id } => {
                        if let Err(e) = self.refresh(kb_id.as_deref()).await {
                            tracing::warn!(error = %e, kb_id = ?kb_id, "list refetch after operation failed");
                        }
                    }
                }
            }

            tracing::debug!(retcode = response.retcode, "operation finished");
            Ok(response.retcode)
        }
        .instrument(span)
        .await
    }

    /// Runs an operation by the name the page layer knows it under.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names, and otherwise as [`dispatch`](Self::dispatch).
    pub async fn dispatch_named(&self, name: &str, payload: Payload) -> Result<i64> {
        self.dispatch(Operation::from_name(name, payload)?).await
    }

    /// Creates a knowledge base; notifies on success.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn create_kb(&self, payload: Payload) -> Result<i64> {
        self.dispatch(Operation::CreateKb(payload)).await
    }

    /// Updates a knowledge base; notifies on success.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn update_kb(&self, payload: Payload) -> Result<i64> {
        self.dispatch(Operation::UpdateKb(payload)).await
    }

    /// Reads knowledge-base details. The response body is not kept.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn get_kb_detail(&self, payload: Payload) -> Result<i64> {
        self.dispatch(Operation::GetKbDetail(payload)).await
    }

    /// Fetches the current page with the store's cursor and search string.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn get_document_list(&self, payload: Payload) -> Result<i64> {
        self.dispatch(Operation::GetDocumentList(payload)).await
    }

    /// Fetches the current page of `kb_id`. Both refresh triggers end here.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn fetch_list(&self, kb_id: &str) -> Result<i64> {
        self.refresh(Some(kb_id)).await
    }

    /// Enables or disables a document, then refetches the list of `kb_id`.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn update_document_status(&self, payload: Payload) -> Result<i64> {
        self.dispatch(Operation::UpdateDocumentStatus(payload)).await
    }

    /// Deletes a document, then refetches the list of `kb_id`.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn remove_document(&self, payload: Payload) -> Result<i64> {
        self.dispatch(Operation::RemoveDocument(payload)).await
    }

    /// Renames a document, closes the rename dialog and refetches the list.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn rename_document(&self, payload: Payload) -> Result<i64> {
        self.dispatch(Operation::RenameDocument(payload)).await
    }

    /// Creates a document and closes the create dialog.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn create_document(&self, payload: Payload) -> Result<i64> {
        self.dispatch(Operation::CreateDocument(payload)).await
    }

    /// Starts or stops parsing; refetches the list of `knowledgeBaseId` if given.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn run_document(&self, payload: Payload) -> Result<i64> {
        self.dispatch(Operation::RunDocument(payload)).await
    }

    /// Changes the parser configuration and closes the segment-set dialog.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn change_parser(&self, payload: Payload) -> Result<i64> {
        self.dispatch(Operation::ChangeParser(payload)).await
    }

    /// Fetches thumbnails and replaces the thumbnail map.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn fetch_thumbnails(&self, payload: Payload) -> Result<i64> {
        self.dispatch(Operation::FetchThumbnails(payload)).await
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// List fetch used by follow-ups and triggers. Kept apart from
    /// `dispatch` so a refetch never schedules another refetch.
    async fn refresh(&self, kb_id: Option<&str>) -> Result<i64> {
        let op = Operation::GetDocumentList(kb_payload(kb_id));
        let (response, actions) = self.send(&op).await?;
        for action in actions {
            match action {
                Action::Patch(patch) => self.apply_patch(patch),
                Action::Notify(message) => self.notifier.success(&message),
                Action::RefreshList { .. } => {}
            }
        }
        Ok(response.retcode)
    }

    async fn send(&self, op: &Operation) -> Result<(ApiResponse, Vec<Action>)> {
        let body = self.read(|state| handler::request_body(op, state));
        let response = self.call(op.endpoint(), body).await?;
        let actions = handler::handle_response(op, &response)?;
        Ok((response, actions))
    }

    async fn call(&self, endpoint: Endpoint, body: Payload) -> Result<ApiResponse> {
        match endpoint {
            Endpoint::CreateKb => self.service.create_kb(body).await,
            Endpoint::UpdateKb => self.service.update_kb(body).await,
            Endpoint::GetKbDetail => self.service.get_kb_detail(body).await,
            Endpoint::GetDocumentList => self.service.get_document_list(body).await,
            Endpoint::DocumentChangeStatus => self.service.document_change_status(body).await,
            Endpoint::DocumentRm => self.service.document_rm(body).await,
            Endpoint::DocumentRename => self.service.document_rename(body).await,
            Endpoint::DocumentCreate => self.service.document_create(body).await,
            Endpoint::DocumentRun => self.service.document_run(body).await,
            Endpoint::DocumentChangeParser => self.service.document_change_parser(body).await,
            Endpoint::DocumentThumbnails => self.service.document_thumbnails(body).await,
        }
    }
}
