//! Domain layer with entities, the state snapshot, and port definitions.

/// Config keys and preference names.
pub mod constants;
/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Serde utilities.
pub mod serde_utils;
/// State snapshot.
pub mod state;

pub use errors::SelectorError;
pub use ports::{ChannelPermission, PermissionPort};
pub use state::GlobalState;
