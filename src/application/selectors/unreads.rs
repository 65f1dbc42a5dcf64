//! Unread and mention aggregation.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::ChannelList;
use super::channels::{MyChannels, is_unread_channel};
use super::memo::{IdsMemo, Identity, Memo, Selector};
use super::posts::get_channel_last_post_time;
use crate::domain::entities::{
    Channel, ChannelId, ChannelKind, ChannelMembership, ChannelType, TeamId, UserId,
};
use crate::domain::state::{
    ChannelMap, GlobalState, MembershipMap, PostMap, PostsInChannelMap, TeamMembershipMap,
    UserMap,
};

/// Badge counts: channels with unread messages and total unread mentions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnreadCounts {
    pub message_count: i64,
    pub mention_count: i64,
}

impl Identity for UnreadCounts {
    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

impl std::ops::AddAssign for UnreadCounts {
    fn add_assign(&mut self, other: Self) {
        self.message_count += other.message_count;
        self.mention_count += other.mention_count;
    }
}

/// What one channel adds to the badge counts.
///
/// Direct channels count every unread message as a mention, but only while
/// the teammate is active. Other channels count their mentions unless
/// archived. A channel adds at most one to the message count, and never when
/// muted.
#[must_use]
pub fn channel_unread_contribution(
    channel: &Channel,
    membership: &ChannelMembership,
    users: &UserMap,
    current_user_id: &UserId,
) -> UnreadCounts {
    let unread_messages = membership.unread_messages(channel).max(0);

    let mention_count = match channel.kind(current_user_id) {
        ChannelKind::Direct { teammate_id } => {
            if users.get(&teammate_id).is_some_and(|user| user.is_active()) {
                unread_messages
            } else {
                0
            }
        }
        _ if membership.mention_count > 0 && !channel.is_archived() => membership.mention_count,
        _ => 0,
    };

    UnreadCounts {
        message_count: i64::from(!membership.is_muted() && unread_messages > 0),
        mention_count,
    }
}

fn count_unreads(
    channels: &ChannelMap,
    members: &MembershipMap,
    users: &UserMap,
    current_user_id: &UserId,
    team_id: Option<&TeamId>,
) -> UnreadCounts {
    let mut counts = UnreadCounts::default();
    for membership in members.values() {
        let Some(channel) = channels.get(&membership.channel_id) else {
            continue;
        };
        if channel.is_visible_in_team(team_id) {
            counts += channel_unread_contribution(channel, membership, users, current_user_id);
        }
    }
    counts
}

type CurrentTeamInputs = (
    Arc<ChannelMap>,
    Arc<MembershipMap>,
    Arc<UserMap>,
    Option<UserId>,
    Option<TeamId>,
);

/// Badge counts for the current team, including direct and group channels.
#[derive(Debug)]
pub struct UnreadsInCurrentTeam {
    memo: Memo<CurrentTeamInputs, UnreadCounts>,
}

impl Default for UnreadsInCurrentTeam {
    fn default() -> Self {
        Self::new()
    }
}

impl UnreadsInCurrentTeam {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: Memo::new("unreads_in_current_team"),
        }
    }
}

impl Selector for UnreadsInCurrentTeam {
    type Output = UnreadCounts;

    fn select(&mut self, state: &GlobalState, (): ()) -> UnreadCounts {
        let inputs = (
            Arc::clone(&state.entities.channels.channels),
            Arc::clone(&state.entities.channels.my_members),
            Arc::clone(&state.entities.users.profiles),
            state.entities.users.current_user_id.clone(),
            state.entities.teams.current_team_id.clone(),
        );
        self.memo.get_or_compute(
            inputs,
            |(channels, members, users, current_user_id, team_id)| {
                let me = current_user_id.clone().unwrap_or_default();
                count_unreads(channels, members, users, &me, team_id.as_ref())
            },
        )
    }
}

fn other_active_teams<'a>(
    memberships: &'a TeamMembershipMap,
    current_team_id: Option<&'a TeamId>,
) -> impl Iterator<Item = (&'a TeamId, UnreadCounts)> {
    memberships
        .iter()
        .filter(move |(team_id, membership)| {
            membership.delete_at == 0 && Some(*team_id) != current_team_id
        })
        .map(|(team_id, membership)| {
            (
                team_id,
                UnreadCounts {
                    message_count: membership.msg_count,
                    mention_count: membership.mention_count,
                },
            )
        })
}

/// Badge counts across the whole server.
///
/// Other teams contribute the rollups stored on their team memberships.
#[derive(Debug)]
pub struct Unreads {
    current_team: UnreadsInCurrentTeam,
    memo: Memo<(UnreadCounts, Arc<TeamMembershipMap>, Option<TeamId>), UnreadCounts>,
}

impl Unreads {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current_team: UnreadsInCurrentTeam::new(),
            memo: Memo::new("unreads"),
        }
    }
}

impl Default for Unreads {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector for Unreads {
    type Output = UnreadCounts;

    fn select(&mut self, state: &GlobalState, (): ()) -> UnreadCounts {
        let inputs = (
            self.current_team.select(state, ()),
            Arc::clone(&state.entities.teams.my_members),
            state.entities.teams.current_team_id.clone(),
        );
        self.memo
            .get_or_compute(inputs, |(current, memberships, team_id)| {
                let mut total = *current;
                for (_, counts) in other_active_teams(memberships, team_id.as_ref()) {
                    total += counts;
                }
                total
            })
    }
}

pub type TeamUnreadMap = Arc<HashMap<TeamId, UnreadCounts>>;

/// Badge counts per team the user belongs to.
#[derive(Debug)]
pub struct TeamUnreads {
    current_team: UnreadsInCurrentTeam,
    memo: Memo<(UnreadCounts, Arc<TeamMembershipMap>, Option<TeamId>), TeamUnreadMap>,
}

impl Default for TeamUnreads {
    fn default() -> Self {
        Self::new()
    }
}

impl TeamUnreads {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current_team: UnreadsInCurrentTeam::new(),
            memo: Memo::new("team_unreads"),
        }
    }
}

impl Selector for TeamUnreads {
    type Output = TeamUnreadMap;

    fn select(&mut self, state: &GlobalState, (): ()) -> TeamUnreadMap {
        let inputs = (
            self.current_team.select(state, ()),
            Arc::clone(&state.entities.teams.my_members),
            state.entities.teams.current_team_id.clone(),
        );
        self.memo
            .get_or_compute(inputs, |(current, memberships, team_id)| {
                let mut by_team: HashMap<TeamId, UnreadCounts> =
                    other_active_teams(memberships, team_id.as_ref())
                        .map(|(id, counts)| (id.clone(), counts))
                        .collect();
                if let Some(team_id) = team_id {
                    by_team.insert(team_id.clone(), *current);
                }
                Arc::new(by_team)
            })
    }
}

/// True when a channel has unread mentions the user wants to hear about.
///
/// Muted channels never do. Unread direct channels always do.
#[must_use]
pub fn has_unread_mention(channel: &Channel, membership: Option<&ChannelMembership>) -> bool {
    let Some(membership) = membership else {
        return false;
    };
    if membership.is_muted() {
        return false;
    }
    membership.mention_count > 0
        || (channel.channel_type() == ChannelType::Direct
            && membership.unread_messages(channel) > 0)
}

type SortedUnreadInputs = (
    ChannelList,
    Arc<MembershipMap>,
    Arc<PostsInChannelMap>,
    Arc<PostMap>,
    Option<ChannelId>,
);

/// Unread channels of the current team plus direct and group channels.
///
/// Channels with mentions come first, then by latest activity.
#[derive(Debug)]
pub struct SortedUnreadChannels {
    my_channels: MyChannels,
    memo: IdsMemo<SortedUnreadInputs, Arc<Channel>>,
}

impl Default for SortedUnreadChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl SortedUnreadChannels {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            my_channels: MyChannels::new(),
            memo: IdsMemo::new("sorted_unread_channels"),
        }
    }
}

impl Selector for SortedUnreadChannels {
    type Output = ChannelList;

    fn select(&mut self, state: &GlobalState, (): ()) -> ChannelList {
        let inputs = (
            self.my_channels.select(state, ()),
            Arc::clone(&state.entities.channels.my_members),
            Arc::clone(&state.entities.posts.posts_in_channel),
            Arc::clone(&state.entities.posts.posts),
            state.entities.channels.current_channel_id.clone(),
        );
        self.memo.get_or_compute(
            inputs,
            |(channels, members, blocks, posts, current_channel_id)| {
                let mut unread: Vec<Arc<Channel>> = channels
                    .iter()
                    .filter(|channel| {
                        !channel.is_archived() || current_channel_id.as_ref() == Some(channel.id())
                    })
                    .filter(|channel| is_unread_channel(members, channel))
                    .cloned()
                    .collect();
                unread.sort_by_cached_key(|channel| {
                    let membership = members.get(channel.id()).map(Arc::as_ref);
                    (
                        Reverse(has_unread_mention(channel, membership)),
                        Reverse(get_channel_last_post_time(channel, blocks, posts)),
                    )
                });
                unread
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::selectors::test_support::channel_ids;
    use crate::domain::entities::{MarkUnread, Team, TeamMembership, UserProfile};
    use pretty_assertions::assert_eq;

    fn team_channel(id: &str, total: i64) -> Channel {
        Channel::new(id, id, ChannelType::Open)
            .with_team("t1")
            .with_total_msg_count(total)
    }

    fn base() -> GlobalState {
        GlobalState::default()
            .with_current_user("me")
            .with_current_team("t1")
            .with_profiles([
                UserProfile::new("me", "me"),
                UserProfile::new("a", "alice"),
                UserProfile::new("gone", "gone").with_delete_at(1),
            ])
    }

    #[test]
    fn test_mentions_only_channel_counts_mentions_not_messages() {
        let state = base()
            .with_channels([team_channel("c1", 5)])
            .with_my_members([ChannelMembership::new("c1", "me")
                .with_mention_count(2)
                .with_msg_count(0)
                .with_mark_unread(MarkUnread::Mention)]);

        let counts = UnreadsInCurrentTeam::new().select(&state, ());
        assert_eq!(
            counts,
            UnreadCounts {
                message_count: 0,
                mention_count: 2
            }
        );
    }

    #[test]
    fn test_direct_channels_count_messages_as_mentions() {
        let me = UserId::from("me");
        let state = base()
            .with_channels([
                Channel::direct("dm_a", &me, &UserId::from("a")).with_total_msg_count(3),
                Channel::direct("dm_gone", &me, &UserId::from("gone")).with_total_msg_count(4),
            ])
            .with_my_members([
                ChannelMembership::new("dm_a", "me"),
                ChannelMembership::new("dm_gone", "me"),
            ]);

        let counts = UnreadsInCurrentTeam::new().select(&state, ());
        assert_eq!(counts.mention_count, 3);
        assert_eq!(counts.message_count, 2);
    }

    #[test]
    fn test_archived_and_other_team_channels_skip_mentions() {
        let state = base()
            .with_channels([
                team_channel("archived", 1).with_delete_at(9),
                Channel::new("elsewhere", "elsewhere", ChannelType::Open)
                    .with_team("t2")
                    .with_total_msg_count(1),
            ])
            .with_my_members([
                ChannelMembership::new("archived", "me").with_mention_count(4),
                ChannelMembership::new("elsewhere", "me").with_mention_count(4),
            ]);

        let counts = UnreadsInCurrentTeam::new().select(&state, ());
        assert_eq!(
            counts,
            UnreadCounts {
                message_count: 1,
                mention_count: 0
            }
        );
    }

    #[test]
    fn test_whole_server_adds_team_rollups() {
        let state = base()
            .with_channels([team_channel("c1", 2)])
            .with_my_members([ChannelMembership::new("c1", "me").with_mention_count(1)])
            .with_teams(
                [Team::new("t1", "one"), Team::new("t2", "two"), Team::new("t3", "three")],
                [
                    TeamMembership::new("t1", "me").with_unreads(50, 50),
                    TeamMembership::new("t2", "me").with_unreads(3, 2),
                    TeamMembership {
                        delete_at: 7,
                        ..TeamMembership::new("t3", "me").with_unreads(9, 9)
                    },
                ],
            );

        let mut unreads = Unreads::new();
        let total = unreads.select(&state, ());
        assert_eq!(
            total,
            UnreadCounts {
                message_count: 4,
                mention_count: 3
            }
        );

        let per_team = TeamUnreads::new().select(&state, ());
        assert_eq!(per_team.len(), 2);
        assert_eq!(per_team[&TeamId::from("t1")].message_count, 1);
        assert_eq!(per_team[&TeamId::from("t2")].mention_count, 2);
    }

    #[test]
    fn test_sorted_unreads_put_mentions_first() {
        let me = UserId::from("me");
        let state = base()
            .with_channels([
                team_channel("busy", 5).with_last_post_at(900),
                team_channel("mentioned", 5).with_last_post_at(100),
                team_channel("muted_mention", 5).with_last_post_at(800),
                team_channel("read", 5).with_last_post_at(1000),
                Channel::direct("dm", &me, &UserId::from("a"))
                    .with_total_msg_count(1)
                    .with_last_post_at(50),
            ])
            .with_my_members([
                ChannelMembership::new("busy", "me"),
                ChannelMembership::new("mentioned", "me").with_mention_count(1),
                ChannelMembership::new("muted_mention", "me")
                    .with_mention_count(1)
                    .with_mark_unread(MarkUnread::Mention),
                ChannelMembership::new("read", "me").with_msg_count(5),
                ChannelMembership::new("dm", "me"),
            ]);

        let sorted = SortedUnreadChannels::new().select(&state, ());
        assert_eq!(
            channel_ids(&sorted),
            ["mentioned", "dm", "busy", "muted_mention"]
        );
    }
}
