//! Page selection state for one document.
//!
//! ```text
//! quick-range text ──▶ range::parse ──▶ (page, deselect) pairs
//!                                           │
//!          toggle / select_all ──────────▶ SelectionSet ──▶ OrderList ──▶ export
//!                                                           ▲
//!                                   propose(candidate) ─────┘
//! ```
//!
//! 1. [`range`] — the quick-range grammar (`2,5,8`, `3-6`, `-4`)
//! 2. [`set`]   — the per-page keep flags
//! 3. [`order`] — the export permutation, validated against the selection

pub mod order;
pub mod range;
pub mod set;

pub use order::{is_permutation_of, pages_to_indices, parse_order_text, OrderList};
pub use range::{parse, parse_tokens, RangeToken};
pub use set::SelectionSet;
