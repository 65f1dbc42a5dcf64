//! Permission port definition.

use crate::domain::entities::{ChannelId, TeamId};

/// Channel-scoped permissions the selectors ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelPermission {
    /// Add or remove members of a public channel.
    ManagePublicChannelMembers,
    /// Add or remove members of a private channel.
    ManagePrivateChannelMembers,
    /// Post in the channel.
    CreatePost,
}

impl ChannelPermission {
    /// Returns the server's permission name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManagePublicChannelMembers => "manage_public_channel_members",
            Self::ManagePrivateChannelMembers => "manage_private_channel_members",
            Self::CreatePost => "create_post",
        }
    }
}

/// Port answering permission questions.
///
/// Role and scheme resolution live behind this port; selectors only consume
/// the boolean answer.
#[cfg_attr(test, mockall::automock)]
pub trait PermissionPort {
    /// Returns whether the current user holds `permission` in the channel.
    fn has_channel_permission(
        &self,
        team_id: &TeamId,
        channel_id: &ChannelId,
        permission: ChannelPermission,
    ) -> bool;
}
