use std::collections::HashSet;
use std::path::PathBuf;

use crate::entry::{Entry, Listing, SelectionKey};

/// Pointer modifiers as they arrive from the input layer. `ctrl` also stands
/// in for Cmd on macOS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { ctrl: false, shift: false };
    pub const CTRL: Modifiers = Modifiers { ctrl: true, shift: false };
    pub const SHIFT: Modifiers = Modifiers { ctrl: false, shift: true };
}

/// Tracks which rows of the current listing are selected, plus the anchor
/// row that shift-clicks range from. The controller never stores entries
/// itself; callers pass the listing in, and `reset` must be called whenever
/// that listing is replaced.
#[derive(Debug, Default)]
pub struct SelectionController {
    selected: HashSet<SelectionKey>,
    anchor: Option<usize>,
}

impl SelectionController {
    pub fn new() -> Self {
        SelectionController::default()
    }

    /// Applies one click against `listing`. A click outside the listing
    /// bounds is a stale event from a swapped-out view and does nothing.
    ///
    /// Shift-click with an anchor selects the inclusive index range between
    /// anchor and click, leaving the anchor put. Ctrl-click toggles the row
    /// and re-anchors on it. A plain click (or a shift-click before any
    /// anchor exists) selects just that row and anchors there.
    pub fn click(&mut self, listing: &Listing, index: usize, modifiers: Modifiers) {
        if index >= listing.len() {
            return;
        }

        if let Some(anchor) = self.anchor.filter(|_| modifiers.shift) {
            let (low, high) = (anchor.min(index), anchor.max(index));
            self.selected.clear();
            for i in low..=high {
                if let Some(key) = listing.key(i) {
                    self.selected.insert(key.clone());
                }
            }
        } else if modifiers.ctrl {
            if let Some(key) = listing.key(index) {
                if !self.selected.remove(key) {
                    self.selected.insert(key.clone());
                }
            }
            self.anchor = Some(index);
        } else {
            self.selected.clear();
            if let Some(key) = listing.key(index) {
                self.selected.insert(key.clone());
            }
            self.anchor = Some(index);
        }
    }

    pub fn select_all(&mut self, listing: &Listing) {
        self.selected.clear();
        for i in 0..listing.len() {
            if let Some(key) = listing.key(i) {
                self.selected.insert(key.clone());
            }
        }
    }

    /// Clears the selection but keeps the anchor, so a following shift-click
    /// still ranges from the last clicked row.
    pub fn select_none(&mut self) {
        self.selected.clear();
    }

    pub fn invert(&mut self, listing: &Listing) {
        let mut inverted = HashSet::new();
        for i in 0..listing.len() {
            if let Some(key) = listing.key(i) {
                if !self.selected.contains(key) {
                    inverted.insert(key.clone());
                }
            }
        }
        self.selected = inverted;
    }

    /// Drops all selection state. Called when the listing is replaced.
    pub fn reset(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn is_selected(&self, listing: &Listing, index: usize) -> bool {
        listing
            .key(index)
            .is_some_and(|key| self.selected.contains(key))
    }

    pub fn count(&self, listing: &Listing) -> usize {
        (0..listing.len())
            .filter(|&i| self.is_selected(listing, i))
            .count()
    }

    /// The selected paths in listing order (not click order), which keeps
    /// multi-file operations deterministic.
    pub fn paths(&self, listing: &Listing) -> Vec<PathBuf> {
        listing
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_selected(listing, *i))
            .map(|(_, entry)| entry.path.clone())
            .collect()
    }

    /// The selected entries in listing order.
    pub fn entries<'a>(&self, listing: &'a Listing) -> Vec<&'a Entry> {
        listing
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_selected(listing, *i))
            .map(|(_, entry)| entry)
            .collect()
    }
}
