//! Single selection shared by the engine, the gesture controller and the style toolbar.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::doc::{DocStore, ItemRef, ItemView};

/// The one selected item, if any, across all four collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<ItemRef>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `item`, replacing any previous selection.
    pub fn select(&mut self, item: ItemRef) {
        self.selected = Some(item);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    #[must_use]
    pub fn selected(&self) -> Option<ItemRef> {
        self.selected
    }

    #[must_use]
    pub fn is_selected(&self, item: ItemRef) -> bool {
        self.selected == Some(item)
    }

    /// Clear the selection if it points at `item`. Returns `true` if it did.
    pub fn forget(&mut self, item: ItemRef) -> bool {
        if self.is_selected(item) {
            self.selected = None;
            return true;
        }
        false
    }

    /// Delete the selected item from `doc`.
    ///
    /// Does nothing when nothing is selected. Otherwise the selection is
    /// cleared afterwards whether or not the item still existed. Returns the
    /// reference that was targeted.
    pub fn delete_selected(&mut self, doc: &mut DocStore) -> Option<ItemRef> {
        let item = self.selected.take()?;
        if !doc.delete_item(item) {
            tracing::debug!(item = ?item, "selected item was already gone");
        }
        Some(item)
    }

    /// The selected item as the style toolbar sees it.
    #[must_use]
    pub fn snapshot<'a>(&self, doc: &'a DocStore) -> Option<ItemView<'a>> {
        self.selected.and_then(|item| doc.get(item))
    }

    /// The z-index a newly spawned item would receive right now.
    #[must_use]
    pub fn next_z_index(&self, doc: &DocStore) -> i64 {
        doc.next_z_index()
    }
}
