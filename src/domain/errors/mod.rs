//! Domain error types.

mod selector_error;

pub use selector_error::SelectorError;
