//! Shared fixtures for selector tests.

use std::sync::Arc;

use super::ChannelList;
use crate::domain::entities::{
    Channel, ChannelId, ChannelMembership, ChannelType, UserId, UserProfile,
};
use crate::domain::state::GlobalState;

/// An open channel with the given display name and no team.
pub fn open_channel(id: &str, display_name: &str) -> Channel {
    Channel::new(id, id, ChannelType::Open).with_display_name(display_name)
}

/// The channels of `state` with the given ids, in that order.
pub fn channel_list(state: &GlobalState, ids: &[&str]) -> ChannelList {
    Arc::new(
        ids.iter()
            .map(|id| Arc::clone(&state.entities.channels.channels[&ChannelId::from(*id)]))
            .collect(),
    )
}

pub fn channel_ids(channels: &[Arc<Channel>]) -> Vec<&str> {
    channels.iter().map(|channel| channel.id().as_str()).collect()
}

pub fn id_strs(ids: &[ChannelId]) -> Vec<&str> {
    ids.iter().map(ChannelId::as_str).collect()
}

/// User `me` on team `t1` with a mix of team, archived, direct, and group
/// channels. `not_member` has no membership and `other_team` lives in `t2`.
pub fn fixture_state() -> GlobalState {
    let me = UserId::from("me");
    let in_team = |id: &str, name: &str, display_name: &str, channel_type| {
        Channel::new(id, name, channel_type)
            .with_team("t1")
            .with_display_name(display_name)
    };

    GlobalState::default()
        .with_current_user("me")
        .with_current_team("t1")
        .with_profiles([
            UserProfile::new("me", "me"),
            UserProfile::new("alice", "alice"),
            UserProfile::new("bob", "bob"),
        ])
        .with_channels([
            in_team("public", "public", "Public", ChannelType::Open),
            in_team("private", "private", "Private", ChannelType::Private),
            in_team("town", "town-square", "Town Square", ChannelType::Open),
            in_team("archived", "archived", "Archived", ChannelType::Open).with_delete_at(100),
            in_team("not_member", "not_member", "Not Member", ChannelType::Open),
            Channel::new("other_team", "other_team", ChannelType::Open)
                .with_team("t2")
                .with_display_name("Elsewhere"),
            Channel::direct("dm_alice", &me, &UserId::from("alice")),
            Channel::direct("dm_bob", &me, &UserId::from("bob")),
            Channel::new("gm", "gm", ChannelType::Group).with_display_name("alice, bob, me"),
        ])
        .with_my_members(
            [
                "public",
                "private",
                "town",
                "archived",
                "other_team",
                "dm_alice",
                "dm_bob",
                "gm",
            ]
            .map(|id| ChannelMembership::new(id, "me")),
        )
}
