//! Per-session selection and order state, keyed by document identity.
//!
//! A [`Session`] is passed explicitly to whatever drives the UI; nothing in
//! the crate holds selection state globally. Every mutation either returns
//! the resulting state or a typed error, and a failed mutation leaves the
//! stored state exactly as it was.

use crate::document::{Document, DocumentKey};
use crate::error::PagesError;
use crate::export::ExportRequest;
use crate::selection::{range, OrderList, SelectionSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Selection and order of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentState {
    pub selection: SelectionSet,
    pub order: OrderList,
}

impl DocumentState {
    fn new(page_count: usize) -> Self {
        Self {
            selection: SelectionSet::new(page_count),
            order: OrderList::new(),
        }
    }
}

/// Keyed store of [`DocumentState`]s.
#[derive(Debug, Default)]
pub struct Session {
    documents: HashMap<DocumentKey, (String, DocumentState)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `document` with every page selected. Opening a document
    /// that is already known keeps its state.
    pub fn open(&mut self, document: &Document) -> &DocumentState {
        let entry = self
            .documents
            .entry(document.key().clone())
            .or_insert_with(|| {
                debug!(name = document.name(), key = document.key().short(), "Session opened document");
                (
                    document.name().to_string(),
                    DocumentState::new(document.page_count()),
                )
            });
        &entry.1
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn state(&self, document: &Document) -> Result<&DocumentState, PagesError> {
        self.documents
            .get(document.key())
            .map(|(_, state)| state)
            .ok_or_else(|| unknown(document))
    }

    fn state_mut(&mut self, document: &Document) -> Result<&mut DocumentState, PagesError> {
        self.documents
            .get_mut(document.key())
            .map(|(_, state)| state)
            .ok_or_else(|| unknown(document))
    }

    pub fn select_all(&mut self, document: &Document) -> Result<&SelectionSet, PagesError> {
        let state = self.state_mut(document)?;
        state.selection.select_all();
        Ok(&state.selection)
    }

    pub fn deselect_all(&mut self, document: &Document) -> Result<&SelectionSet, PagesError> {
        let state = self.state_mut(document)?;
        state.selection.deselect_all();
        Ok(&state.selection)
    }

    /// Set page index `index` (0-based).
    pub fn toggle(
        &mut self,
        document: &Document,
        index: usize,
        value: bool,
    ) -> Result<&SelectionSet, PagesError> {
        let state = self.state_mut(document)?;
        state.selection.toggle(index, value)?;
        Ok(&state.selection)
    }

    /// Parse and apply a quick-range expression.
    ///
    /// A malformed expression changes nothing. Page numbers outside the
    /// document are skipped.
    pub fn apply_quick_range(
        &mut self,
        document: &Document,
        expression: &str,
    ) -> Result<&SelectionSet, PagesError> {
        let state = self.state_mut(document)?;
        let pairs = range::parse(expression, state.selection.len())?;
        state.selection.apply_ranges(&pairs);
        info!(
            document = document.name(),
            expression,
            selected = state.selection.selected_count(),
            "Quick range applied"
        );
        Ok(&state.selection)
    }

    /// Propose an export order of 0-based indices.
    ///
    /// Returns the accepted order, or [`PagesError::OrderValidation`] with the
    /// previous order kept.
    pub fn propose_order(
        &mut self,
        document: &Document,
        candidate: &[usize],
    ) -> Result<Vec<usize>, PagesError> {
        let state = self.state_mut(document)?;
        state.order.propose(candidate, &state.selection)
    }

    /// Selected 1-based page numbers, ascending.
    pub fn selected_pages(&self, document: &Document) -> Result<Vec<usize>, PagesError> {
        Ok(self
            .state(document)?
            .selection
            .selected_indices()
            .into_iter()
            .map(|i| i + 1)
            .collect())
    }

    /// Export order of 0-based indices as it applies right now.
    pub fn effective_order(&self, document: &Document) -> Result<Vec<usize>, PagesError> {
        let state = self.state(document)?;
        Ok(state.order.effective(&state.selection))
    }

    /// Snapshot for the export engine.
    pub fn request(&self, document: &Document) -> Result<ExportRequest, PagesError> {
        let state = self.state(document)?;
        Ok(ExportRequest::new(document, &state.selection, &state.order))
    }

    /// Names of every open document, sorted.
    pub fn document_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.documents.values().map(|(n, _)| n.as_str()).collect();
        names.sort_unstable();
        names
    }
}

fn unknown(document: &Document) -> PagesError {
    PagesError::UnknownDocument {
        document: document.name().to_string(),
    }
}
