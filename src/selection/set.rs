//! Per-document page selection: one boolean per page.

use crate::error::PagesError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordered `keep` flags for every page of one document.
///
/// Index `i` is page number `i + 1`. The length is fixed when the set is
/// created and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    pages: Vec<bool>,
}

impl SelectionSet {
    /// A set with every page selected.
    pub fn new(page_count: usize) -> Self {
        Self {
            pages: vec![true; page_count],
        }
    }

    /// Number of pages in the document.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Whether page index `i` (0-based) is kept. Out-of-range indices are
    /// never selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.pages.get(index).copied().unwrap_or(false)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.pages
    }

    pub fn select_all(&mut self) {
        self.pages.iter_mut().for_each(|p| *p = true);
    }

    pub fn deselect_all(&mut self) {
        self.pages.iter_mut().for_each(|p| *p = false);
    }

    /// Set a single page (0-based index).
    pub fn toggle(&mut self, index: usize, value: bool) -> Result<(), PagesError> {
        let total = self.pages.len();
        match self.pages.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(PagesError::PageOutOfRange {
                page: index + 1,
                total,
            }),
        }
    }

    /// Apply `(page_number, deselect)` pairs in order, last write wins.
    ///
    /// Pairs whose page number falls outside `1..=len` are skipped. Returns
    /// how many pairs were skipped.
    pub fn apply_ranges(&mut self, pairs: &[(usize, bool)]) -> usize {
        let total = self.pages.len();
        let mut skipped = 0;
        for &(page, deselect) in pairs {
            if page >= 1 && page <= total {
                self.pages[page - 1] = !deselect;
            } else {
                skipped += 1;
            }
        }
        if skipped > 0 {
            debug!(skipped, total, "Ignored out-of-range quick-range pages");
        }
        skipped
    }

    /// Selected 0-based indices in ascending order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter_map(|(i, keep)| keep.then_some(i))
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.pages.iter().filter(|k| **k).count()
    }

    /// Selected pages as a display string of 1-based numbers, e.g. `1, 2, 5`.
    pub fn describe(&self) -> String {
        let pages = self.selected_indices();
        if pages.is_empty() {
            return "— none —".to_string();
        }
        pages
            .iter()
            .map(|i| (i + 1).to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
