//! Atlas dropdown: the last applied list of stored selections.

use crate::model::{SelectionId, StoredSelection};

/// Dropdown menu listing stored selections.
///
/// List requests are numbered; a response older than the newest one already
/// applied is dropped, so overlapping refreshes never roll the list back.
#[derive(Debug, Default)]
pub struct AtlasDropdown {
    open: bool,
    selections: Vec<StoredSelection>,
    last_requested: u64,
    last_applied: u64,
}

impl AtlasDropdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selections(&self) -> &[StoredSelection] {
        &self.selections
    }

    pub fn find(&self, id: &SelectionId) -> Option<&StoredSelection> {
        self.selections.iter().find(|s| &s.id == id)
    }

    /// A list request is outstanding that is newer than the applied list.
    pub fn is_loading(&self) -> bool {
        self.last_requested > self.last_applied
    }

    /// Toggle the menu. Returns the sequence number of the list request to send
    /// when it opens.
    pub fn toggle(&mut self) -> Option<u64> {
        self.open = !self.open;
        self.open.then(|| self.next_request())
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Number a new list request.
    pub fn next_request(&mut self) -> u64 {
        self.last_requested += 1;
        self.last_requested
    }

    /// Apply a list response. Returns `false` if it was stale and dropped.
    pub fn apply(&mut self, seq: u64, selections: Vec<StoredSelection>) -> bool {
        if seq <= self.last_applied {
            log::debug!(
                "Dropping stale list response #{} (already showing #{})",
                seq,
                self.last_applied
            );
            return false;
        }
        log::debug!("Applying list response #{} ({} selections)", seq, selections.len());
        self.last_applied = seq;
        self.selections = selections;
        true
    }
}
