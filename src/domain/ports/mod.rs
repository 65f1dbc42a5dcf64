//! Port definitions.

mod permission_port;

pub use permission_port::{ChannelPermission, PermissionPort};

#[cfg(test)]
pub mod mocks {
    pub use super::permission_port::MockPermissionPort;
}
