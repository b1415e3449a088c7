//! Export order of the selected pages.

use super::SelectionSet;
use crate::error::PagesError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A user-chosen permutation of the selected page indices.
///
/// The order is re-derived lazily: while no explicit order exists, or the
/// stored one no longer covers exactly the selected pages, the effective
/// order is the ascending selection order. An explicit order therefore
/// survives selection edits that end up with the same selected set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderList {
    explicit: Option<Vec<usize>>,
}

impl OrderList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The explicit order, if one was accepted.
    pub fn explicit(&self) -> Option<&[usize]> {
        self.explicit.as_deref()
    }

    /// Order to use for `selection` right now (0-based indices).
    pub fn effective(&self, selection: &SelectionSet) -> Vec<usize> {
        let selected = selection.selected_indices();
        match &self.explicit {
            Some(order) if is_permutation_of(order, &selected) => order.clone(),
            _ => selected,
        }
    }

    /// Replace the order with `candidate` if it is a permutation of the
    /// currently selected indices.
    ///
    /// On rejection the previous order is kept and
    /// [`PagesError::OrderValidation`] is returned.
    pub fn propose(
        &mut self,
        candidate: &[usize],
        selection: &SelectionSet,
    ) -> Result<Vec<usize>, PagesError> {
        let selected = selection.selected_indices();
        if !is_permutation_of(candidate, &selected) {
            warn!(
                expected = selected.len(),
                got = candidate.len(),
                "Rejected page order"
            );
            return Err(PagesError::OrderValidation {
                expected: selected.len(),
                got: candidate.len(),
            });
        }
        self.explicit = Some(candidate.to_vec());
        Ok(candidate.to_vec())
    }

    /// Forget any explicit order.
    pub fn reset(&mut self) {
        self.explicit = None;
    }
}

/// `true` when `candidate` holds every index of `selected` exactly once and
/// nothing else.
pub fn is_permutation_of(candidate: &[usize], selected: &[usize]) -> bool {
    if candidate.len() != selected.len() {
        return false;
    }
    let mut a = candidate.to_vec();
    let mut b = selected.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// Parse a free-text order such as `"3, 1, 2"` into 1-based page numbers.
///
/// Items that are not plain digits are skipped.
pub fn parse_order_text(text: &str) -> Vec<usize> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|s| s.parse::<usize>().ok())
        .collect()
}

/// Convert 1-based page numbers to 0-based indices. Page `0` has no index
/// and yields `None`.
pub fn pages_to_indices(pages: &[usize]) -> Option<Vec<usize>> {
    pages.iter().map(|p| p.checked_sub(1)).collect()
}
