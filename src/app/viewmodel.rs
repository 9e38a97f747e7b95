//! View model for the document list.
//!
//! Rendering lives outside this crate; views read a [`ListViewModel`] computed
//! from a state snapshot instead of reaching into [`PageState`] directly.

use super::modals::Modal;
use super::state::PageState;
use crate::domain::{Document, DocumentStatus, RunStatus};
use serde::Serialize;

/// Renderable representation of the list page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListViewModel {
    pub rows: Vec<DocumentRow>,
    pub page: u32,
    pub page_size: u32,
    pub page_count: u64,
    pub total: u64,
    /// Active search filter, `None` when the search string is empty.
    pub search: Option<String>,
    pub open_modals: Vec<Modal>,
}

/// One row of the document table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRow {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub run: Option<RunStatus>,
    /// Parsing progress in percent, when reported.
    pub progress_percent: Option<u8>,
    pub chunk_num: Option<u64>,
    /// Thumbnail from the fetched map, else the one embedded in the document.
    pub thumbnail: Option<String>,
    /// Whether this row is the record an open dialog targets.
    pub is_current: bool,
}

impl ListViewModel {
    #[must_use]
    pub fn from_state(state: &PageState) -> Self {
        let current_id = state.current_record.as_ref().map(|doc| doc.id.as_str());

        let rows = state
            .documents
            .iter()
            .map(|doc| DocumentRow::from_document(doc, state, current_id))
            .collect();

        Self {
            rows,
            page: state.pagination.current.get(),
            page_size: state.pagination.page_size.get(),
            page_count: state.page_count(),
            total: state.total,
            search: (!state.search_string.is_empty()).then(|| state.search_string.clone()),
            open_modals: state.modals.open(),
        }
    }
}

impl DocumentRow {
    fn from_document(doc: &Document, state: &PageState, current_id: Option<&str>) -> Self {
        let thumbnail = state
            .thumbnails
            .get(&doc.id)
            .cloned()
            .or_else(|| doc.thumbnail().map(String::from));

        Self {
            id: doc.id.clone(),
            name: doc.name().unwrap_or_default().to_string(),
            enabled: doc.enable_status() == DocumentStatus::Enabled,
            run: doc.run_status(),
            progress_percent: doc.progress().map(progress_percent),
            chunk_num: doc.chunk_num(),
            thumbnail,
            is_current: current_id == Some(doc.id.as_str()),
        }
    }
}

/// Converts a `0.0..=1.0` progress fraction to a whole percentage. Negative
/// values (the service reports failures as `-1`) clamp to zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn progress_percent(fraction: f64) -> u8 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::{StatePatch, Thumbnails};

    #[test]
    fn rows_prefer_fetched_thumbnails() {
        let a = Document::new("a", "a.pdf").with("thumbnail", "embedded-a");
        let b = Document::new("b", "b.pdf")
            .with("thumbnail", "embedded-b")
            .with("status", "0")
            .with("progress", 0.456);

        let mut state = PageState::default();
        state.apply(
            StatePatch::default()
                .listing(vec![a, b.clone()], 2)
                .thumbnails(Thumbnails::from([("a".to_string(), "fetched-a".to_string())]))
                .current_record(Some(b))
                .modal(Modal::Rename, true),
        );

        let vm = ListViewModel::from_state(&state);
        assert_eq!(vm.rows[0].thumbnail.as_deref(), Some("fetched-a"));
        assert_eq!(vm.rows[1].thumbnail.as_deref(), Some("embedded-b"));
        assert!(vm.rows[0].enabled);
        assert!(!vm.rows[1].enabled);
        assert_eq!(vm.rows[1].progress_percent, Some(46));
        assert!(vm.rows[1].is_current);
        assert!(!vm.rows[0].is_current);
        assert_eq!(vm.open_modals, vec![Modal::Rename]);
    }

    #[test]
    fn nameless_document_renders_with_empty_name() {
        let mut doc = Document::new("d1", "x");
        doc.set("name", serde_json::Value::Null);
        let mut state = PageState::default();
        state.apply(StatePatch::default().listing(vec![doc], 1));

        let vm = ListViewModel::from_state(&state);
        assert_eq!(vm.rows[0].name, "");
        assert_eq!(vm.rows[0].run, None);
    }

    #[test]
    fn empty_search_is_not_a_filter() {
        let vm = ListViewModel::from_state(&PageState::default());
        assert_eq!(vm.search, None);
        assert_eq!(vm.page, 1);
        assert_eq!(vm.page_count, 1);
        assert!(vm.rows.is_empty());
    }

    #[test]
    fn failed_progress_clamps_to_zero() {
        assert_eq!(progress_percent(-1.0), 0);
        assert_eq!(progress_percent(1.0), 100);
    }
}
