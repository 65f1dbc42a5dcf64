//! Application layer: selectors deriving sidebar views from the state tree.

/// Memoized selectors.
pub mod selectors;

pub use selectors::{Selector, UnreadCounts};
