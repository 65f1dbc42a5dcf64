//! Channel predicates, unread state, and the current user's channel lists.

use std::sync::Arc;

use serde::Serialize;

use super::entities::{get_current_channel, get_current_user, is_config_enabled};
use super::memo::{IdsMemo, Selector};
use super::sorting::NaturalKey;
use crate::domain::constants::config;
use crate::domain::entities::{
    Channel, ChannelMembership, ChannelType, TOWN_SQUARE, TeamId, UserId, direct_channel_name,
    teammate_id_from_channel_name,
};
use crate::domain::ports::{ChannelPermission, PermissionPort};
use crate::domain::state::{ChannelMap, GlobalState, MembershipMap};

#[must_use]
pub fn get_direct_channel_name(user_a: &UserId, user_b: &UserId) -> String {
    direct_channel_name(user_a, user_b)
}

#[must_use]
pub fn get_user_id_from_channel_name(current_user_id: &UserId, channel_name: &str) -> UserId {
    teammate_id_from_channel_name(current_user_id, channel_name)
}

/// A channel counts as muted when it only marks unread on mentions.
#[must_use]
pub fn is_channel_muted(membership: Option<&ChannelMembership>) -> bool {
    membership.is_some_and(ChannelMembership::is_muted)
}

/// Unread state of a channel for the current user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelUnreadCounts {
    /// Messages not yet read.
    pub message_count: i64,
    /// Mentions not yet read.
    pub mention_count: i64,
    /// Whether the channel shows as unread.
    pub has_unread: bool,
}

/// Computes a channel's unread counts. No membership means nothing unread.
#[must_use]
pub fn get_channel_unread_counts(
    channel: &Channel,
    membership: Option<&ChannelMembership>,
) -> ChannelUnreadCounts {
    let Some(membership) = membership else {
        return ChannelUnreadCounts::default();
    };

    let message_count = membership.unread_messages(channel).max(0);
    let mention_count = membership.mention_count;
    ChannelUnreadCounts {
        message_count,
        mention_count,
        has_unread: mention_count > 0 || (!membership.is_muted() && message_count > 0),
    }
}

#[must_use]
pub fn is_unread_channel(members: &MembershipMap, channel: &Channel) -> bool {
    get_channel_unread_counts(channel, members.get(channel.id()).map(Arc::as_ref)).has_unread
}

fn collect_sorted_by_id(
    channels: &ChannelMap,
    keep: impl Fn(&Channel) -> bool,
) -> Vec<Arc<Channel>> {
    let mut kept: Vec<Arc<Channel>> = channels
        .values()
        .filter(|channel| keep(channel))
        .cloned()
        .collect();
    kept.sort_by(|a, b| a.id().cmp(b.id()));
    kept
}

/// Channels the current user belongs to in the current team, plus their
/// direct and group channels. Ordered by id.
#[derive(Debug)]
pub struct MyChannels {
    memo: IdsMemo<(Arc<ChannelMap>, Arc<MembershipMap>, Option<TeamId>), Arc<Channel>>,
}

impl Default for MyChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl MyChannels {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: IdsMemo::new("my_channels"),
        }
    }
}

impl Selector for MyChannels {
    type Output = Arc<Vec<Arc<Channel>>>;

    fn select(&mut self, state: &GlobalState, (): ()) -> Self::Output {
        let inputs = (
            Arc::clone(&state.entities.channels.channels),
            Arc::clone(&state.entities.channels.my_members),
            state.entities.teams.current_team_id.clone(),
        );
        self.memo.get_or_compute(inputs, |(channels, members, team_id)| {
            collect_sorted_by_id(channels, |channel| {
                members.contains_key(channel.id()) && channel.is_visible_in_team(team_id.as_ref())
            })
        })
    }
}

/// Every loaded channel of the current team, by display name.
#[derive(Debug)]
pub struct ChannelsInCurrentTeam {
    memo: IdsMemo<(Arc<ChannelMap>, Option<TeamId>), Arc<Channel>>,
}

impl Default for ChannelsInCurrentTeam {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelsInCurrentTeam {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: IdsMemo::new("channels_in_current_team"),
        }
    }
}

impl Selector for ChannelsInCurrentTeam {
    type Output = Arc<Vec<Arc<Channel>>>;

    fn select(&mut self, state: &GlobalState, (): ()) -> Self::Output {
        let inputs = (
            Arc::clone(&state.entities.channels.channels),
            state.entities.teams.current_team_id.clone(),
        );
        self.memo.get_or_compute(inputs, |(channels, team_id)| {
            let Some(team_id) = team_id else {
                return Vec::new();
            };
            let mut in_team = collect_sorted_by_id(channels, |channel| {
                channel.team_id() == Some(team_id)
            });
            in_team.sort_by_cached_key(|channel| NaturalKey::new(channel.display_name()));
            in_team
        })
    }
}

/// The current user's direct and group channels, ordered by id.
#[derive(Debug)]
pub struct DirectAndGroupChannels {
    memo: IdsMemo<(Arc<ChannelMap>, Arc<MembershipMap>), Arc<Channel>>,
}

impl Default for DirectAndGroupChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectAndGroupChannels {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: IdsMemo::new("direct_and_group_channels"),
        }
    }
}

impl Selector for DirectAndGroupChannels {
    type Output = Arc<Vec<Arc<Channel>>>;

    fn select(&mut self, state: &GlobalState, (): ()) -> Self::Output {
        let inputs = (
            Arc::clone(&state.entities.channels.channels),
            Arc::clone(&state.entities.channels.my_members),
        );
        self.memo.get_or_compute(inputs, |(channels, members)| {
            collect_sorted_by_id(channels, |channel| {
                channel.is_direct_or_group() && members.contains_key(channel.id())
            })
        })
    }
}

/// Town square is read-only for everyone but system admins when the server
/// says so.
#[must_use]
pub fn is_current_channel_read_only(state: &GlobalState) -> bool {
    let Some(channel) = get_current_channel(state) else {
        return false;
    };
    if channel.name() != TOWN_SQUARE || !is_config_enabled(state, config::TOWN_SQUARE_IS_READ_ONLY)
    {
        return false;
    }
    !get_current_user(state).is_ok_and(|user| user.is_system_admin())
}

#[must_use]
pub fn should_hide_town_square(state: &GlobalState) -> bool {
    is_config_enabled(state, config::HIDE_TOWN_SQUARE_IN_LHS)
}

/// True when the user may manage members of at least one of their public or
/// private channels in the current team.
#[must_use]
pub fn can_manage_any_channel_members_in_current_team(
    state: &GlobalState,
    permissions: &dyn PermissionPort,
) -> bool {
    let Some(team_id) = state.entities.teams.current_team_id.as_ref() else {
        return false;
    };
    let members = &state.entities.channels.my_members;

    state.entities.channels.channels.values().any(|channel| {
        if channel.team_id() != Some(team_id) || !members.contains_key(channel.id()) {
            return false;
        }
        let permission = match channel.channel_type() {
            ChannelType::Open => ChannelPermission::ManagePublicChannelMembers,
            ChannelType::Private => ChannelPermission::ManagePrivateChannelMembers,
            ChannelType::Direct | ChannelType::Group => return false,
        };
        permissions.has_channel_permission(team_id, channel.id(), permission)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::selectors::test_support::{channel_ids, fixture_state};
    use crate::domain::entities::{MarkUnread, UserProfile};
    use crate::domain::ports::mocks::MockPermissionPort;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn channel(total: i64) -> Channel {
        Channel::new("c", "c", ChannelType::Open).with_total_msg_count(total)
    }

    #[test_case(5, 5, 0, MarkUnread::All, false ; "all read")]
    #[test_case(5, 3, 0, MarkUnread::All, true ; "unread messages")]
    #[test_case(5, 3, 0, MarkUnread::Mention, false ; "muted messages do not count")]
    #[test_case(5, 5, 1, MarkUnread::Mention, true ; "mentions always count")]
    fn test_unread_rule(total: i64, read: i64, mentions: i64, mark: MarkUnread, expected: bool) {
        let membership = ChannelMembership::new("c", "me")
            .with_msg_count(read)
            .with_mention_count(mentions)
            .with_mark_unread(mark);
        let counts = get_channel_unread_counts(&channel(total), Some(&membership));
        assert_eq!(counts.has_unread, expected);
        assert_eq!(counts.message_count, total - read);
    }

    #[test]
    fn test_no_membership_is_read() {
        assert!(!get_channel_unread_counts(&channel(9), None).has_unread);
        assert!(!is_channel_muted(None));
    }

    #[test]
    fn test_direct_channel_name_round_trip() {
        let me = UserId::from("b");
        let name = get_direct_channel_name(&me, &UserId::from("a"));
        assert_eq!(name, "a__b");
        assert_eq!(get_user_id_from_channel_name(&me, &name), UserId::from("a"));
    }

    #[test]
    fn test_my_channels() {
        let state = fixture_state();
        let mut mine = MyChannels::new();
        let channels = mine.select(&state, ());
        assert_eq!(
            channel_ids(&channels),
            ["archived", "dm_alice", "dm_bob", "gm", "private", "public", "town"]
        );
        assert!(Arc::ptr_eq(&channels, &mine.select(&state, ())));
    }

    #[test]
    fn test_channels_in_current_team_by_name() {
        let state = fixture_state();
        let channels = ChannelsInCurrentTeam::new().select(&state, ());
        assert_eq!(
            channel_ids(&channels),
            ["archived", "not_member", "private", "public", "town"]
        );
    }

    #[test]
    fn test_direct_and_group_channels() {
        let state = fixture_state();
        let channels = DirectAndGroupChannels::new().select(&state, ());
        assert_eq!(channel_ids(&channels), ["dm_alice", "dm_bob", "gm"]);
    }

    #[test]
    fn test_town_square_read_only() {
        let state = fixture_state()
            .with_current_channel("town")
            .with_config([("ExperimentalTownSquareIsReadOnly", "true")]);
        assert!(is_current_channel_read_only(&state));

        let admin = state.with_profiles([
            UserProfile::new("me", "me").with_roles("system_user system_admin")
        ]);
        assert!(!is_current_channel_read_only(&admin));
    }

    #[test]
    fn test_manage_members_asks_port_per_type() {
        let state = fixture_state();
        let mut port = MockPermissionPort::new();
        port.expect_has_channel_permission()
            .withf(|team_id, _, _| team_id.as_str() == "t1")
            .returning(|_, channel_id, permission| {
                let private = channel_id.as_str() == "private";
                let expected = if private {
                    ChannelPermission::ManagePrivateChannelMembers
                } else {
                    ChannelPermission::ManagePublicChannelMembers
                };
                assert_eq!(permission, expected);
                private
            });

        assert!(can_manage_any_channel_members_in_current_team(&state, &port));
    }

    #[test]
    fn test_manage_members_without_team() {
        let mut state = fixture_state();
        state.entities.teams.current_team_id = None;
        let port = MockPermissionPort::new();
        assert!(!can_manage_any_channel_members_in_current_team(&state, &port));
    }
}
