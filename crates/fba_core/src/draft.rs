//! The draft store: operator-only working copies of the content collections.
//!
//! Each orderable collection gets a [`DraftList`]: a working sequence the
//! admin UI mutates, plus an immutable "initial" snapshot captured when edit
//! mode loads. The snapshot is what makes local deletions observable to the
//! reconciler - any identifier present initially but missing from the
//! working copy is a pending deletion. Nothing here ever leaks into the
//! public content cache.

use crate::content::{AppItem, ContentRecord, MerchItem, Post, SiteInfo};

/// An editable, order-significant sequence plus its load-time snapshot.
#[derive(Debug, Clone)]
pub struct DraftList<T> {
    working: Vec<T>,
    initial: Vec<T>,
}

impl<T: ContentRecord> DraftList<T> {
    /// Create an empty draft list.
    pub fn new() -> Self {
        Self {
            working: Vec::new(),
            initial: Vec::new(),
        }
    }

    /// Load a freshly fetched collection, capturing the initial snapshot.
    pub fn load(&mut self, items: Vec<T>) {
        self.initial = items.clone();
        self.working = items;
    }

    /// The working sequence, in list order.
    pub fn items(&self) -> &[T] {
        &self.working
    }

    /// Mutable access to the working sequence, preserving order.
    pub(crate) fn items_mut(&mut self) -> &mut [T] {
        &mut self.working
    }

    /// Number of items in the working sequence.
    pub fn len(&self) -> usize {
        self.working.len()
    }

    /// Whether the working sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    /// Find an item by identifier.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.working.iter().find(|item| item.id() == id)
    }

    /// Find an item by identifier, mutably.
    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.working.iter_mut().find(|item| item.id() == id)
    }

    /// Insert or update an item.
    ///
    /// An existing item is replaced in place, preserving its position; a new
    /// item is prepended so it surfaces at the top of the list.
    pub fn upsert(&mut self, item: T) {
        match self.working.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => *existing = item,
            None => self.working.insert(0, item),
        }
    }

    /// Remove an item from the working copy only.
    ///
    /// The initial snapshot is untouched; that is what turns this removal
    /// into a remote deletion at the next save.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.working.len();
        self.working.retain(|item| item.id() != id);
        self.working.len() != before
    }

    /// Replace the working sequence wholesale.
    ///
    /// The ordering engine is the only expected caller; it hands back the
    /// same items in a new order.
    pub fn reorder(&mut self, sequence: Vec<T>) {
        self.working = sequence;
    }

    /// Identifiers present in the initial snapshot but missing from the
    /// working copy - the pending remote deletions.
    pub fn pending_deletions(&self) -> Vec<String> {
        let working_ids: std::collections::HashSet<&str> =
            self.working.iter().map(|item| item.id()).collect();
        self.initial
            .iter()
            .filter(|item| !working_ids.contains(item.id()))
            .map(|item| item.id().to_string())
            .collect()
    }

    /// Stamp every item's order rank with its current list index.
    pub fn stamp_ranks(&mut self) {
        for (index, item) in self.working.iter_mut().enumerate() {
            item.set_order_rank(index as i64);
        }
    }

    /// Resynchronize the initial snapshot to the working copy.
    ///
    /// Called only after a fully successful save, so the next save's
    /// deletion diff is computed against the just-saved state.
    pub fn commit(&mut self) {
        self.initial = self.working.clone();
    }

    /// Drop both copies.
    pub fn clear(&mut self) {
        self.working.clear();
        self.initial.clear();
    }
}

impl<T: ContentRecord> Default for DraftList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The full draft state for an editing session.
#[derive(Debug, Clone, Default)]
pub struct DraftStore {
    /// Draft posts.
    pub posts: DraftList<Post>,
    /// Draft merch items.
    pub merch: DraftList<MerchItem>,
    /// Draft app entries.
    pub apps: DraftList<AppItem>,
    /// Draft info document, when loaded.
    pub info: Option<SiteInfo>,
    loaded: bool,
}

impl DraftStore {
    /// Create an empty draft store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an edit-mode load has populated the store.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Mark the store as populated by an edit-mode load.
    pub(crate) fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    /// Drop all draft state.
    pub fn clear(&mut self) {
        self.posts.clear();
        self.merch.clear();
        self.apps.clear();
        self.info = None;
        self.loaded = false;
    }
}
