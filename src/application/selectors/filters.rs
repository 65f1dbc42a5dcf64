//! Channel visibility filters.
//!
//! Every filter keeps the relative order of the channels it lets through and
//! hands back the input list itself when nothing was dropped, so a no-op
//! filter never invalidates what sits downstream of it.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::ChannelList;
use super::channels::is_unread_channel;
use super::memo::{Memo, Selector};
use super::posts::get_channel_last_post_time;
use super::preferences::{
    get_channel_timestamp_preference, get_preference, get_visible_dm_gm_limit,
    should_autoclose_dms,
};
use crate::domain::constants::{AUTOCLOSE_WINDOW_MS, category};
use crate::domain::entities::{CategoryType, Channel, ChannelId, ChannelKind, UserId};
use crate::domain::state::{
    GlobalState, MembershipMap, PostMap, PostsInChannelMap, PreferenceMap, UserMap,
};

/// Drops the channels `keep` rejects, returning `channels` itself when none are.
pub fn retain_channels(
    channels: &ChannelList,
    mut keep: impl FnMut(&Channel) -> bool,
) -> ChannelList {
    let kept: Vec<Arc<Channel>> = channels
        .iter()
        .filter(|channel| keep(channel))
        .cloned()
        .collect();
    if kept.len() == channels.len() {
        Arc::clone(channels)
    } else {
        Arc::new(kept)
    }
}

/// Latest time the user is known to have looked at a channel.
fn last_viewed_at(
    channel: &Channel,
    members: &MembershipMap,
    preferences: &PreferenceMap,
) -> i64 {
    let member_viewed = members
        .get(channel.id())
        .map_or(0, |member| member.last_viewed_at);
    member_viewed
        .max(get_channel_timestamp_preference(
            preferences,
            category::CHANNEL_APPROXIMATE_VIEW_TIME,
            channel.id(),
        ))
        .max(get_channel_timestamp_preference(
            preferences,
            category::CHANNEL_OPEN_TIME,
            channel.id(),
        ))
}

/// Hides archived channels except the one being viewed.
#[derive(Debug)]
pub struct FilterArchivedChannels {
    memo: Memo<(ChannelList, Option<ChannelId>), ChannelList>,
}

impl Default for FilterArchivedChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterArchivedChannels {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: Memo::new("filter_archived_channels"),
        }
    }
}

impl Selector<ChannelList> for FilterArchivedChannels {
    type Output = ChannelList;

    fn select(&mut self, state: &GlobalState, channels: ChannelList) -> ChannelList {
        let current = state.entities.channels.current_channel_id.clone();
        self.memo
            .get_or_compute((channels, current), |(channels, current)| {
                retain_channels(channels, |channel| {
                    !channel.is_archived() || current.as_ref() == Some(channel.id())
                })
            })
    }
}

type ManuallyClosedInputs = (
    ChannelList,
    Arc<MembershipMap>,
    Arc<PreferenceMap>,
    Option<ChannelId>,
    Option<UserId>,
);

/// Hides direct and group channels the user closed from the sidebar.
///
/// A direct channel stays open while `direct_channel_show--<teammate>` holds
/// anything but `"false"`; group channels use `group_channel_show--<channel>`.
/// Unread and current channels always stay.
#[derive(Debug)]
pub struct FilterManuallyClosedDms {
    memo: Memo<ManuallyClosedInputs, ChannelList>,
}

impl Default for FilterManuallyClosedDms {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterManuallyClosedDms {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: Memo::new("filter_manually_closed_dms"),
        }
    }
}

impl Selector<ChannelList> for FilterManuallyClosedDms {
    type Output = ChannelList;

    fn select(&mut self, state: &GlobalState, channels: ChannelList) -> ChannelList {
        let inputs = (
            channels,
            Arc::clone(&state.entities.channels.my_members),
            Arc::clone(&state.entities.preferences.my_preferences),
            state.entities.channels.current_channel_id.clone(),
            state.entities.users.current_user_id.clone(),
        );
        self.memo.get_or_compute(
            inputs,
            |(channels, members, preferences, current_channel_id, current_user_id)| {
                let me = current_user_id.clone().unwrap_or_default();
                retain_channels(channels, |channel| {
                    if !channel.is_direct_or_group()
                        || current_channel_id.as_ref() == Some(channel.id())
                        || is_unread_channel(members, channel)
                    {
                        return true;
                    }

                    let shown = match channel.kind(&me) {
                        ChannelKind::Direct { teammate_id } => get_preference(
                            preferences,
                            category::DIRECT_CHANNEL_SHOW,
                            teammate_id.as_str(),
                        ),
                        _ => get_preference(
                            preferences,
                            category::GROUP_CHANNEL_SHOW,
                            channel.id().as_str(),
                        ),
                    };
                    shown.is_some_and(|value| value != "false")
                })
            },
        )
    }
}

type CutoffInputs = (
    CategoryType,
    ChannelList,
    Arc<MembershipMap>,
    Arc<PreferenceMap>,
    Arc<UserMap>,
    Arc<PostsInChannelMap>,
    Arc<PostMap>,
    Option<ChannelId>,
    Option<UserId>,
    bool,
);

type Clock = Box<dyn Fn() -> i64>;

/// Hides direct and group channels without activity in the last week.
///
/// Only applies to the direct messages category. A channel stays when it is
/// unread or current, when it was opened or viewed after the cutoff, when
/// autoclose is off, or when its latest post is newer than the cutoff. Direct
/// channels with a missing or deactivated teammate are hidden.
///
/// The clock is read when the inputs change, not on every call.
pub struct FilterAutoclosedDmsByCutoff {
    clock: Clock,
    memo: Memo<CutoffInputs, ChannelList>,
}

impl std::fmt::Debug for FilterAutoclosedDmsByCutoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterAutoclosedDmsByCutoff")
            .field("memo", &self.memo)
            .finish_non_exhaustive()
    }
}

impl Default for FilterAutoclosedDmsByCutoff {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterAutoclosedDmsByCutoff {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(|| Utc::now().timestamp_millis())
    }

    /// Uses `clock` for the current time in milliseconds.
    #[must_use]
    pub fn with_clock(clock: impl Fn() -> i64 + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            memo: Memo::new("filter_autoclosed_dms_by_cutoff"),
        }
    }
}

impl Selector<(ChannelList, CategoryType)> for FilterAutoclosedDmsByCutoff {
    type Output = ChannelList;

    fn select(
        &mut self,
        state: &GlobalState,
        (channels, category_type): (ChannelList, CategoryType),
    ) -> ChannelList {
        let inputs = (
            category_type,
            channels,
            Arc::clone(&state.entities.channels.my_members),
            Arc::clone(&state.entities.preferences.my_preferences),
            Arc::clone(&state.entities.users.profiles),
            Arc::clone(&state.entities.posts.posts_in_channel),
            Arc::clone(&state.entities.posts.posts),
            state.entities.channels.current_channel_id.clone(),
            state.entities.users.current_user_id.clone(),
            should_autoclose_dms(state),
        );
        let clock = &self.clock;
        self.memo.get_or_compute(
            inputs,
            |(
                category_type,
                channels,
                members,
                preferences,
                users,
                blocks,
                posts,
                current_channel_id,
                current_user_id,
                autoclose,
            )| {
                if *category_type != CategoryType::DirectMessages {
                    return Arc::clone(channels);
                }

                let cutoff = clock() - AUTOCLOSE_WINDOW_MS;
                let me = current_user_id.clone().unwrap_or_default();
                retain_channels(channels, |channel| {
                    if !channel.is_direct_or_group()
                        || current_channel_id.as_ref() == Some(channel.id())
                        || is_unread_channel(members, channel)
                    {
                        return true;
                    }

                    if let ChannelKind::Direct { teammate_id } = channel.kind(&me)
                        && !users.get(&teammate_id).is_some_and(|user| user.is_active())
                    {
                        return false;
                    }

                    let opened_or_viewed = get_channel_timestamp_preference(
                        preferences,
                        category::CHANNEL_APPROXIMATE_VIEW_TIME,
                        channel.id(),
                    )
                    .max(get_channel_timestamp_preference(
                        preferences,
                        category::CHANNEL_OPEN_TIME,
                        channel.id(),
                    ));
                    if opened_or_viewed > cutoff || !*autoclose {
                        return true;
                    }

                    get_channel_last_post_time(channel, blocks, posts) > cutoff
                })
            },
        )
    }
}

type LimitInputs = (
    CategoryType,
    ChannelList,
    Arc<MembershipMap>,
    Arc<PreferenceMap>,
    Arc<UserMap>,
    Option<ChannelId>,
    Option<UserId>,
    usize,
);

/// Keeps the most recently viewed direct and group channels, up to the user's
/// visible limit.
///
/// Only applies to the direct messages category. Unread channels and the
/// current channel are always kept and use up the limit first; the remaining
/// slots go to the most recently viewed.
/// A direct channel is hidden when its teammate is missing or was deactivated
/// after the user last viewed it. Other channel types pass untouched.
#[derive(Debug)]
pub struct FilterAutoclosedDmsByLimit {
    memo: Memo<LimitInputs, ChannelList>,
}

impl Default for FilterAutoclosedDmsByLimit {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterAutoclosedDmsByLimit {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: Memo::new("filter_autoclosed_dms_by_limit"),
        }
    }
}

struct Candidate<'a> {
    id: &'a ChannelId,
    current: bool,
    unread: bool,
    last_viewed_at: i64,
}

impl Selector<(ChannelList, CategoryType)> for FilterAutoclosedDmsByLimit {
    type Output = ChannelList;

    fn select(
        &mut self,
        state: &GlobalState,
        (channels, category_type): (ChannelList, CategoryType),
    ) -> ChannelList {
        let inputs = (
            category_type,
            channels,
            Arc::clone(&state.entities.channels.my_members),
            Arc::clone(&state.entities.preferences.my_preferences),
            Arc::clone(&state.entities.users.profiles),
            state.entities.channels.current_channel_id.clone(),
            state.entities.users.current_user_id.clone(),
            get_visible_dm_gm_limit(state),
        );
        self.memo.get_or_compute(
            inputs,
            |(
                category_type,
                channels,
                members,
                preferences,
                users,
                current_channel_id,
                current_user_id,
                limit,
            )| {
                if *category_type != CategoryType::DirectMessages {
                    return Arc::clone(channels);
                }

                let me = current_user_id.clone().unwrap_or_default();
                let candidates: Vec<Candidate<'_>> = channels
                    .iter()
                    .filter(|channel| channel.is_direct_or_group())
                    .filter_map(|channel| {
                        let current = current_channel_id.as_ref() == Some(channel.id());
                        let unread = is_unread_channel(members, channel);
                        let last_viewed_at = last_viewed_at(channel, members, preferences);

                        if !current
                            && !unread
                            && let ChannelKind::Direct { teammate_id } = channel.kind(&me)
                        {
                            let visible = users
                                .get(&teammate_id)
                                .is_some_and(|user| user.delete_at() <= last_viewed_at);
                            if !visible {
                                return None;
                            }
                        }

                        Some(Candidate {
                            id: channel.id(),
                            current,
                            unread,
                            last_viewed_at,
                        })
                    })
                    .collect();

                let (pinned, mut rest): (Vec<_>, Vec<_>) =
                    candidates.into_iter().partition(|c| c.current || c.unread);
                rest.sort_by_key(|c| Reverse(c.last_viewed_at));
                let open_slots = limit.saturating_sub(pinned.len());
                let kept: HashSet<&ChannelId> = pinned
                    .iter()
                    .chain(rest.iter().take(open_slots))
                    .map(|c| c.id)
                    .collect();

                retain_channels(channels, |channel| {
                    !channel.is_direct_or_group() || kept.contains(channel.id())
                })
            },
        )
    }
}

/// Which autoclose rule hides inactive direct channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AutocloseStrategy {
    /// Hide channels idle for a week.
    Cutoff,
    /// Keep a fixed number of recently viewed channels.
    #[default]
    Limit,
}

/// Autoclose filter chosen at construction time.
#[derive(Debug)]
pub enum AutocloseFilter {
    Cutoff(FilterAutoclosedDmsByCutoff),
    Limit(FilterAutoclosedDmsByLimit),
}

impl AutocloseFilter {
    #[must_use]
    pub fn new(strategy: AutocloseStrategy) -> Self {
        match strategy {
            AutocloseStrategy::Cutoff => Self::Cutoff(FilterAutoclosedDmsByCutoff::new()),
            AutocloseStrategy::Limit => Self::Limit(FilterAutoclosedDmsByLimit::new()),
        }
    }

    #[must_use]
    pub const fn strategy(&self) -> AutocloseStrategy {
        match self {
            Self::Cutoff(_) => AutocloseStrategy::Cutoff,
            Self::Limit(_) => AutocloseStrategy::Limit,
        }
    }
}

impl Selector<(ChannelList, CategoryType)> for AutocloseFilter {
    type Output = ChannelList;

    fn select(&mut self, state: &GlobalState, args: (ChannelList, CategoryType)) -> ChannelList {
        match self {
            Self::Cutoff(filter) => filter.select(state, args),
            Self::Limit(filter) => filter.select(state, args),
        }
    }
}
