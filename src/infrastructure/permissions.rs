//! Role based permission answers computed from a state snapshot.

use crate::domain::entities::{ChannelId, SYSTEM_ADMIN_ROLE, TeamId};
use crate::domain::ports::{ChannelPermission, PermissionPort};
use crate::domain::state::GlobalState;

const CHANNEL_ADMIN_ROLE: &str = "channel_admin";
const TEAM_ADMIN_ROLE: &str = "team_admin";

/// Answers permission questions from the roles stored in a snapshot.
///
/// System admins hold every permission. Team admins and channel admins may
/// manage channel members. Any member of an active channel may post.
#[derive(Debug, Clone, Copy)]
pub struct RolePermissions<'a> {
    state: &'a GlobalState,
}

impl<'a> RolePermissions<'a> {
    #[must_use]
    pub const fn new(state: &'a GlobalState) -> Self {
        Self { state }
    }

    fn is_system_admin(&self) -> bool {
        let users = &self.state.entities.users;
        users
            .current_user_id
            .as_ref()
            .and_then(|id| users.profiles.get(id))
            .is_some_and(|user| user.has_role(SYSTEM_ADMIN_ROLE))
    }

    fn is_team_admin(&self, team_id: &TeamId) -> bool {
        self.state
            .entities
            .teams
            .my_members
            .get(team_id)
            .is_some_and(|member| {
                member.delete_at == 0
                    && member.roles.split_whitespace().any(|role| role == TEAM_ADMIN_ROLE)
            })
    }
}

impl PermissionPort for RolePermissions<'_> {
    fn has_channel_permission(
        &self,
        team_id: &TeamId,
        channel_id: &ChannelId,
        permission: ChannelPermission,
    ) -> bool {
        if self.is_system_admin() {
            return true;
        }
        let Some(membership) = self.state.entities.channels.my_members.get(channel_id) else {
            return false;
        };

        match permission {
            ChannelPermission::CreatePost => self
                .state
                .entities
                .channels
                .channels
                .get(channel_id)
                .is_some_and(|channel| !channel.is_archived()),
            ChannelPermission::ManagePublicChannelMembers
            | ChannelPermission::ManagePrivateChannelMembers => {
                membership.has_role(CHANNEL_ADMIN_ROLE) || self.is_team_admin(team_id)
            }
        }
    }
}
