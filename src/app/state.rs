//! Page state and the patches that mutate it.
//!
//! [`PageState`] is the single source of truth for the document list page. It
//! is created with fixed defaults when the page mounts and dropped when the page
//! unmounts. It is only ever changed by applying a patch:
//!
//! - [`StatePatch`]: the bulk update. It names every field it may touch; fields
//!   left as `None` stay exactly as they were.
//! - [`PaginationPatch`]: merged into the cursor field by field, so a patch
//!   that only sets `current` keeps the page size.
//!
//! Documents and their total travel together as one [`DocumentListing`], so a
//! patch can never update one without the other.
//!
//! # Example
//!
//! ```rust
//! use knowledge_file::app::{Modal, PageState, PaginationPatch, StatePatch};
//! use std::num::NonZeroU32;
//!
//! let mut state = PageState::default();
//! state.apply(StatePatch::default().modal(Modal::Rename, true).search("invoice"));
//! state.merge_pagination(PaginationPatch::default().current(NonZeroU32::new(3).unwrap()));
//!
//! assert!(state.modals.rename);
//! assert_eq!(state.pagination.current.get(), 3);
//! assert_eq!(state.pagination.page_size.get(), 10);
//! ```

use super::modals::{Modal, ModalFlags};
use crate::domain::Document;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::num::NonZeroU32;

/// Document id → thumbnail reference (usually a data URL or an image path).
pub type Thumbnails = BTreeMap<String, String>;

/// Default number of documents per page.
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

/// Page cursor. Both fields are positive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current: NonZeroU32,
    pub page_size: NonZeroU32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// First page with the given size.
    #[must_use]
    pub const fn with_page_size(page_size: NonZeroU32) -> Self {
        Self {
            current: NonZeroU32::MIN,
            page_size,
        }
    }

    pub fn merge(&mut self, patch: PaginationPatch) {
        if let Some(current) = patch.current {
            self.current = current;
        }
        if let Some(page_size) = patch.page_size {
            self.page_size = page_size;
        }
    }
}

/// Partial pagination update; unset fields persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationPatch {
    pub current: Option<NonZeroU32>,
    pub page_size: Option<NonZeroU32>,
}

impl PaginationPatch {
    #[must_use]
    pub fn current(mut self, current: NonZeroU32) -> Self {
        self.current = Some(current);
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: NonZeroU32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// One page of documents together with the server-reported total.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentListing {
    pub documents: Vec<Document>,
    pub total: u64,
}

/// Bulk update restricted to the fields listed here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatePatch {
    /// Modal flags to set, applied in order.
    pub modals: Vec<(Modal, bool)>,
    pub tenant_info: Option<Map<String, Value>>,
    pub listing: Option<DocumentListing>,
    /// `Some(None)` clears the current record.
    pub current_record: Option<Option<Document>>,
    pub search_string: Option<String>,
    /// Merged, never replaced.
    pub pagination: Option<PaginationPatch>,
    /// Replaces the whole map.
    pub thumbnails: Option<Thumbnails>,
}

impl StatePatch {
    #[must_use]
    pub fn modal(mut self, modal: Modal, visible: bool) -> Self {
        self.modals.push((modal, visible));
        self
    }

    #[must_use]
    pub fn tenant_info(mut self, info: Map<String, Value>) -> Self {
        self.tenant_info = Some(info);
        self
    }

    #[must_use]
    pub fn listing(mut self, documents: Vec<Document>, total: u64) -> Self {
        self.listing = Some(DocumentListing { documents, total });
        self
    }

    #[must_use]
    pub fn current_record(mut self, record: Option<Document>) -> Self {
        self.current_record = Some(record);
        self
    }

    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search_string = Some(search.into());
        self
    }

    #[must_use]
    pub fn pagination(mut self, patch: PaginationPatch) -> Self {
        self.pagination = Some(patch);
        self
    }

    #[must_use]
    pub fn thumbnails(mut self, thumbnails: Thumbnails) -> Self {
        self.thumbnails = Some(thumbnails);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// UI state of one document list page session.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub modals: ModalFlags,
    pub tenant_info: Map<String, Value>,
    pub documents: Vec<Document>,
    pub total: u64,
    pub current_record: Option<Document>,
    pub search_string: String,
    pub pagination: Pagination,
    pub thumbnails: Thumbnails,
}

impl PageState {
    /// Fresh state for a page that lists `page_size` documents at a time.
    #[must_use]
    pub fn new(page_size: NonZeroU32) -> Self {
        Self {
            pagination: Pagination::with_page_size(page_size),
            ..Self::default()
        }
    }

    /// Applies a bulk patch, touching only the fields it carries.
    pub fn apply(&mut self, patch: StatePatch) {
        let StatePatch {
            modals,
            tenant_info,
            listing,
            current_record,
            search_string,
            pagination,
            thumbnails,
        } = patch;

        for (modal, visible) in modals {
            self.modals.set(modal, visible);
        }
        if let Some(info) = tenant_info {
            self.tenant_info = info;
        }
        if let Some(DocumentListing { documents, total }) = listing {
            self.documents = documents;
            self.total = total;
        }
        if let Some(record) = current_record {
            self.current_record = record;
        }
        if let Some(search) = search_string {
            self.search_string = search;
        }
        if let Some(patch) = pagination {
            self.pagination.merge(patch);
        }
        if let Some(thumbnails) = thumbnails {
            self.thumbnails = thumbnails;
        }
    }

    pub fn merge_pagination(&mut self, patch: PaginationPatch) {
        self.pagination.merge(patch);
    }

    /// Number of pages needed for `total` documents; at least one.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        let size = u64::from(self.pagination.page_size.get());
        self.total.div_ceil(size).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn populated() -> PageState {
        let mut state = PageState::default();
        state.apply(
            StatePatch::default()
                .listing(vec![Document::new("d1", "a.pdf")], 1)
                .search("old")
                .current_record(Some(Document::new("d1", "a.pdf")))
                .thumbnails(Thumbnails::from([("d1".to_string(), "t1".to_string())])),
        );
        state
    }

    #[test]
    fn defaults_match_a_freshly_mounted_page() {
        let state = PageState::default();
        assert_eq!(state.modals, ModalFlags::default());
        assert!(state.documents.is_empty());
        assert_eq!(state.total, 0);
        assert_eq!(state.current_record, None);
        assert_eq!(state.search_string, "");
        assert_eq!(state.pagination.current.get(), 1);
        assert_eq!(state.pagination.page_size.get(), 10);
        assert!(state.thumbnails.is_empty());
    }

    #[test]
    fn patch_changes_only_the_fields_it_carries() {
        let before = populated();

        let mut after = before.clone();
        after.apply(StatePatch::default().search("invoice"));

        assert_eq!(after.search_string, "invoice");
        let mut expected = before;
        expected.search_string = "invoice".to_string();
        assert_eq!(after, expected);
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let before = populated();
        let mut after = before.clone();
        assert!(StatePatch::default().is_empty());
        after.apply(StatePatch::default());
        assert_eq!(after, before);
    }

    #[test]
    fn listing_replaces_documents_and_total_together() {
        let mut state = populated();
        state.apply(StatePatch::default().listing(
            vec![Document::new("d2", "b.pdf"), Document::new("d3", "c.pdf")],
            42,
        ));
        assert_eq!(state.documents.len(), 2);
        assert_eq!(state.documents[0].id, "d2");
        assert_eq!(state.total, 42);
    }

    #[test]
    fn current_record_can_be_cleared() {
        let mut state = populated();
        state.apply(StatePatch::default().current_record(None));
        assert_eq!(state.current_record, None);
    }

    #[test]
    fn pagination_fields_merge_independently() {
        let mut state = PageState::default();
        state.merge_pagination(PaginationPatch::default().current(nz(2)));
        state.merge_pagination(PaginationPatch::default().page_size(nz(20)));
        assert_eq!(
            state.pagination,
            Pagination {
                current: nz(2),
                page_size: nz(20)
            }
        );
    }

    #[test]
    fn bulk_patch_merges_pagination_too() {
        let mut state = PageState::new(nz(25));
        state.apply(StatePatch::default().pagination(PaginationPatch::default().current(nz(4))));
        assert_eq!(state.pagination.current.get(), 4);
        assert_eq!(state.pagination.page_size.get(), 25);
    }

    #[test]
    fn thumbnails_are_replaced_not_merged() {
        let mut state = populated();
        state.apply(StatePatch::default().thumbnails(Thumbnails::from([(
            "d9".to_string(),
            "t9".to_string(),
        )])));
        assert_eq!(state.thumbnails.len(), 1);
        assert!(!state.thumbnails.contains_key("d1"));
    }

    #[test]
    fn page_count_rounds_up_and_never_hits_zero() {
        let mut state = PageState::default();
        assert_eq!(state.page_count(), 1);
        state.apply(StatePatch::default().listing(vec![], 21));
        assert_eq!(state.page_count(), 3);
        state.apply(StatePatch::default().listing(vec![], 20));
        assert_eq!(state.page_count(), 2);
    }
}
