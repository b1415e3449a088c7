//! Quick-range expressions: `2,5,8`, `3-6`, `-4`, `-10-12`.
//!
//! Grammar: comma-separated tokens, blank tokens ignored. A token is `N` or
//! `A-B` (inclusive, 1-based, `A <= B`), optionally prefixed with `-` to
//! deselect instead of select. Tokens apply left to right, so a later token
//! overrides an earlier one for overlapping pages.
//!
//! Parsing is all-or-nothing: one malformed token rejects the whole
//! expression. Page numbers outside the document are not an error; they are
//! dropped when the result is applied to a [`super::SelectionSet`].

use crate::error::PagesError;
use serde::{Deserialize, Serialize};
use std::num::IntErrorKind;

/// One parsed token of a quick-range expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeToken {
    /// First page (1-based, inclusive).
    pub start: usize,
    /// Last page (1-based, inclusive). Equal to `start` for a single page.
    pub end: usize,
    /// `true` when the token was prefixed with `-`.
    pub deselect: bool,
}

impl RangeToken {
    /// Pages of this token that exist in a `page_count`-page document, in
    /// ascending order, each paired with the token's deselect flag.
    fn pairs_within(&self, page_count: usize) -> impl Iterator<Item = (usize, bool)> + '_ {
        let lo = self.start.max(1);
        let hi = self.end.min(page_count);
        (lo..=hi).map(move |p| (p, self.deselect))
    }
}

/// Parse an expression into tokens without applying them.
pub fn parse_tokens(expression: &str) -> Result<Vec<RangeToken>, PagesError> {
    let mut tokens = Vec::new();

    for part in expression.split(',') {
        let raw = part.trim();
        if raw.is_empty() {
            continue;
        }

        let (deselect, body) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let token = match body.split_once('-') {
            Some((a, b)) => {
                let start = parse_bound(raw, a)?;
                let end = parse_bound(raw, b)?;
                if start > end {
                    return Err(PagesError::Parse {
                        token: raw.to_string(),
                        reason: format!("range start {start} is after range end {end}"),
                    });
                }
                RangeToken {
                    start,
                    end,
                    deselect,
                }
            }
            None => {
                let page = parse_bound(raw, body)?;
                RangeToken {
                    start: page,
                    end: page,
                    deselect,
                }
            }
        };

        tokens.push(token);
    }

    Ok(tokens)
}

/// Parse an expression into `(page_number, deselect)` pairs in application
/// order.
///
/// Pairs for pages outside `1..=page_count` are never produced; applying
/// them would be a no-op anyway, and skipping them keeps a typo such as
/// `1-99999999` from expanding into a huge vector.
pub fn parse(expression: &str, page_count: usize) -> Result<Vec<(usize, bool)>, PagesError> {
    let tokens = parse_tokens(expression)?;
    Ok(tokens
        .iter()
        .flat_map(|t| t.pairs_within(page_count).collect::<Vec<_>>())
        .collect())
}

fn parse_bound(token: &str, field: &str) -> Result<usize, PagesError> {
    let field = field.trim();
    if field.is_empty() {
        return Err(PagesError::Parse {
            token: token.to_string(),
            reason: "empty page number".into(),
        });
    }
    match field.parse::<usize>() {
        Ok(page) => Ok(page),
        // Too large for any document: keep it and let the range filter drop it.
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(usize::MAX),
        Err(_) => Err(PagesError::Parse {
            token: token.to_string(),
            reason: format!("'{field}' is not a page number"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pages_and_ranges() {
        assert_eq!(
            parse("2,5,8", 10).unwrap(),
            vec![(2, false), (5, false), (8, false)]
        );
        assert_eq!(
            parse("3-6", 10).unwrap(),
            vec![(3, false), (4, false), (5, false), (6, false)]
        );
    }

    #[test]
    fn leading_dash_deselects() {
        assert_eq!(parse("-3", 10).unwrap(), vec![(3, true)]);
        assert_eq!(
            parse("-3-5", 10).unwrap(),
            vec![(3, true), (4, true), (5, true)]
        );
    }

    #[test]
    fn blank_tokens_and_whitespace_are_ignored() {
        assert_eq!(
            parse(" 1 , ,  4 ,", 10).unwrap(),
            vec![(1, false), (4, false)]
        );
        assert!(parse("", 10).unwrap().is_empty());
        assert!(parse(" , ,", 10).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_pages_are_dropped_not_rejected() {
        assert_eq!(parse("12", 10).unwrap(), Vec::<(usize, bool)>::new());
        assert_eq!(parse("0", 10).unwrap(), Vec::<(usize, bool)>::new());
        assert_eq!(parse("9-12", 10).unwrap(), vec![(9, false), (10, false)]);
        assert_eq!(parse("1-4000000000", 3).unwrap().len(), 3);
    }

    #[test]
    fn tokens_keep_raw_bounds() {
        let tokens = parse_tokens("9-12,-4").unwrap();
        assert_eq!(
            tokens,
            vec![
                RangeToken {
                    start: 9,
                    end: 12,
                    deselect: false
                },
                RangeToken {
                    start: 4,
                    end: 4,
                    deselect: true
                },
            ]
        );
    }

    #[test]
    fn malformed_tokens_reject_whole_expression() {
        for bad in ["a", "3-x", "6-3", "-", "--3", "3-", "-3-", "1,2,x"] {
            let err = parse(bad, 10).unwrap_err();
            assert!(
                matches!(err, PagesError::Parse { .. }),
                "expected parse error for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn oversized_numbers_parse_and_fall_outside() {
        assert_eq!(parse("2,99999999999999999999999", 10).unwrap(), vec![(2, false)]);
        assert_eq!(
            parse("9-99999999999999999999999", 10).unwrap(),
            vec![(9, false), (10, false)]
        );
        assert!(parse("99999999999999999999999-3", 10).is_err());
    }
}
