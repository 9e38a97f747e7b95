//! Dialog visibility flags for the document list page.
//!
//! Each dialog is an independent binary state machine: closed → open on user
//! action → closed on success or explicit cancel. No dialog's state depends on
//! another's.

use serde::Serialize;

/// Dialogs the list page can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Modal {
    /// Create-document dialog.
    CreateDocument,
    /// Tenant settings dialog.
    Tenant,
    /// Chunking method / parser configuration dialog.
    SegmentSet,
    /// Rename-document dialog.
    Rename,
}

impl Modal {
    pub const ALL: [Self; 4] = [Self::CreateDocument, Self::Tenant, Self::SegmentSet, Self::Rename];
}

/// Open/closed flag per dialog. All closed by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ModalFlags {
    pub create_document: bool,
    pub tenant: bool,
    pub segment_set: bool,
    pub rename: bool,
}

impl ModalFlags {
    #[must_use]
    pub const fn is_open(&self, modal: Modal) -> bool {
        match modal {
            Modal::CreateDocument => self.create_document,
            Modal::Tenant => self.tenant,
            Modal::SegmentSet => self.segment_set,
            Modal::Rename => self.rename,
        }
    }

    pub fn set(&mut self, modal: Modal, visible: bool) {
        let slot = match modal {
            Modal::CreateDocument => &mut self.create_document,
            Modal::Tenant => &mut self.tenant,
            Modal::SegmentSet => &mut self.segment_set,
            Modal::Rename => &mut self.rename,
        };
        *slot = visible;
    }

    /// Dialogs currently open, in [`Modal::ALL`] order.
    #[must_use]
    pub fn open(&self) -> Vec<Modal> {
        Modal::ALL.into_iter().filter(|m| self.is_open(*m)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_independent() {
        let mut flags = ModalFlags::default();
        flags.set(Modal::Rename, true);
        flags.set(Modal::SegmentSet, true);
        flags.set(Modal::Rename, false);

        assert!(!flags.is_open(Modal::Rename));
        assert!(flags.is_open(Modal::SegmentSet));
        assert_eq!(flags.open(), vec![Modal::SegmentSet]);
    }
}
