//! Infrastructure layer: configuration files and state snapshots.

/// Application configuration.
pub mod config;
/// Permission answers derived from stored roles.
pub mod permissions;
/// State snapshot loading.
pub mod snapshot;

pub use config::{AppConfig, CliArgs, ConfigError, LogLevel, OutputFormat, StorageManager};
pub use permissions::RolePermissions;
pub use snapshot::{SnapshotError, StateSnapshot, load_snapshot, parse_snapshot};
