//! Chanview - memoized sidebar views over a chat client's state tree.
//!
//! Selectors derive the channel sidebar (categories or the legacy grouped
//! layout) and unread badges from an immutable state snapshot, returning the
//! same shared value whenever the visible result did not change.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the selectors.
pub mod application;
/// Domain layer containing entities, the state tree, errors, and ports.
pub mod domain;
/// Infrastructure layer containing configuration and snapshot loading.
pub mod infrastructure;
/// Presentation layer containing the sidebar report.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "chanview";
