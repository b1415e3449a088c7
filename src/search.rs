//! Case-insensitive term search with bounded context snippets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contexts returned per term at most.
pub const MAX_CONTEXTS: usize = 5;

/// Characters of context kept on each side of a match.
pub const CONTEXT_RADIUS: usize = 30;

/// Matches of one term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermMatches {
    /// Non-overlapping occurrences in the whole text (not capped).
    pub count: usize,
    /// Up to [`MAX_CONTEXTS`] snippets around the first occurrences,
    /// newlines replaced by spaces.
    pub contexts: Vec<String>,
}

/// Count and contextualise every non-empty term in `text`.
///
/// Matching lowercases character by character, so positions in the folded
/// text line up with positions in the original and snippets are cut from
/// the original text. Contexts of nearby matches may overlap.
pub fn search<S: AsRef<str>>(text: &str, terms: &[S]) -> BTreeMap<String, TermMatches> {
    let original: Vec<char> = text.chars().collect();
    let folded: Vec<char> = original.iter().map(|&c| fold(c)).collect();

    let mut results = BTreeMap::new();
    for term in terms {
        let term = term.as_ref();
        if term.is_empty() {
            continue;
        }
        let needle: Vec<char> = term.chars().map(fold).collect();
        let positions = find_all(&folded, &needle);

        let contexts = positions
            .iter()
            .take(MAX_CONTEXTS)
            .map(|&idx| {
                let start = idx.saturating_sub(CONTEXT_RADIUS);
                let end = (idx + needle.len() + CONTEXT_RADIUS).min(original.len());
                original[start..end]
                    .iter()
                    .map(|&c| if c == '\n' { ' ' } else { c })
                    .collect()
            })
            .collect();

        results.insert(
            term.to_string(),
            TermMatches {
                count: positions.len(),
                contexts,
            },
        );
    }
    results
}

/// Lowercase when that maps to exactly one character.
fn fold(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Start positions of non-overlapping occurrences, scanning left to right.
fn find_all(haystack: &[char], needle: &[char]) -> Vec<usize> {
    let mut positions = Vec::new();
    if needle.is_empty() || needle.len() > haystack.len() {
        return positions;
    }
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if haystack[i..i + needle.len()] == *needle {
            positions.push(i);
            i += needle.len();
        } else {
            i += 1;
        }
    }
    positions
}
