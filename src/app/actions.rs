//! Follow-up effects produced when a remote call succeeds.
//!
//! The handler turns a successful response into a `Vec<Action>`; the store
//! executes them in order. Keeping the decision pure makes the success path of
//! every operation testable without a remote service.

use super::state::StatePatch;

/// One follow-up effect of a successful operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Apply a state patch.
    Patch(StatePatch),

    /// Show a success message through the notifier.
    Notify(String),

    /// Re-fetch the document list.
    ///
    /// `kb_id` is `None` when the triggering payload did not carry one; the
    /// list request then goes out without a knowledge-base filter.
    RefreshList {
        kb_id: Option<String>,
    },
}

impl Action {
    pub(crate) fn notify(message: &str) -> Self {
        Self::Notify(message.to_string())
    }
}
