//! Grouped sidebar ordering used when the legacy sidebar is enabled.
//!
//! The sidebar is a flat list of named groups: Unreads and Favorites when
//! turned on, then either one group per channel type or a single combined
//! group. Each group runs its own filter and sort pipeline.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::channels::{MyChannels, is_unread_channel, should_hide_town_square};
use super::filters::{FilterArchivedChannels, FilterAutoclosedDmsByCutoff, FilterManuallyClosedDms};
use super::memo::{IdsMemo, Memo, Selector, Stable};
use super::preferences::{FavoriteChannelIds, get_legacy_sidebar_settings};
use super::sorting::{SortChannelsByNameWithDms, SortChannelsByRecency, same_or_new};
use super::unreads::has_unread_mention;
use super::{ChannelList, IdList};
use crate::domain::entities::{
    CategoryType, Channel, ChannelGrouping, ChannelId, ChannelType, LegacySorting, TOWN_SQUARE,
};
use crate::domain::state::{GlobalState, MembershipMap};

/// Kind of a legacy sidebar group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    Unreads,
    Favorites,
    Public,
    Private,
    Direct,
    /// Everything else in one group, by name.
    Alpha,
    /// Everything else in one group, by activity.
    Recent,
}

impl GroupType {
    /// Heading shown above the group.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Unreads => "UNREADS",
            Self::Favorites => "FAVORITE CHANNELS",
            Self::Public => "PUBLIC CHANNELS",
            Self::Private => "PRIVATE CHANNELS",
            Self::Direct => "DIRECT MESSAGES",
            Self::Alpha => "CHANNELS",
            Self::Recent => "RECENT ACTIVITY",
        }
    }

    fn admits(self, channel: &Channel) -> bool {
        match self {
            Self::Public => channel.channel_type() == ChannelType::Open,
            Self::Private => channel.channel_type() == ChannelType::Private,
            Self::Direct => channel.is_direct_or_group(),
            Self::Unreads | Self::Favorites | Self::Alpha | Self::Recent => true,
        }
    }

    const fn autoclose_category(self) -> CategoryType {
        match self {
            Self::Direct | Self::Alpha | Self::Recent => CategoryType::DirectMessages,
            Self::Unreads | Self::Favorites | Self::Public | Self::Private => {
                CategoryType::Channels
            }
        }
    }
}

/// One named group of the legacy sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelGroup {
    #[serde(rename = "type")]
    pub group_type: GroupType,
    pub name: &'static str,
    pub channel_ids: IdList,
}

type CandidateInputs = (
    ChannelList,
    Arc<MembershipMap>,
    IdList,
    Option<ChannelId>,
    Option<ChannelId>,
    bool,
    bool,
    bool,
);

/// Filter and sort pipeline of a single group.
#[derive(Debug)]
struct GroupPipeline {
    group_type: GroupType,
    candidates: IdsMemo<CandidateInputs, Arc<Channel>>,
    archived: FilterArchivedChannels,
    manually_closed: FilterManuallyClosedDms,
    autoclose: FilterAutoclosedDmsByCutoff,
    by_name: SortChannelsByNameWithDms,
    by_recency: SortChannelsByRecency,
    mentions_first: Memo<(ChannelList, Arc<MembershipMap>), ChannelList>,
    ids: Memo<(ChannelList,), IdList>,
    stable: Stable<IdList>,
}

impl GroupPipeline {
    fn new(group_type: GroupType, clock: Rc<dyn Fn() -> i64>) -> Self {
        Self {
            group_type,
            candidates: IdsMemo::new("legacy_group_candidates"),
            archived: FilterArchivedChannels::new(),
            manually_closed: FilterManuallyClosedDms::new(),
            autoclose: FilterAutoclosedDmsByCutoff::with_clock(move || (*clock)()),
            by_name: SortChannelsByNameWithDms::new(),
            by_recency: SortChannelsByRecency::new(),
            mentions_first: Memo::new("legacy_mentions_first"),
            ids: Memo::new("legacy_group_ids"),
            stable: Stable::new(),
        }
    }

    fn select(
        &mut self,
        state: &GlobalState,
        my_channels: ChannelList,
        favorites: IdList,
        last_unread_channel_id: Option<&ChannelId>,
    ) -> IdList {
        let settings = get_legacy_sidebar_settings(state);
        let group_type = self.group_type;

        let inputs = (
            my_channels,
            Arc::clone(&state.entities.channels.my_members),
            favorites,
            state.entities.channels.current_channel_id.clone(),
            last_unread_channel_id.cloned(),
            should_hide_town_square(state),
            settings.unreads_at_top,
            settings.favorite_at_top,
        );
        let channels = self.candidates.get_or_compute(
            inputs,
            |(
                channels,
                members,
                favorites,
                current_channel_id,
                last_unread_channel_id,
                hide_town_square,
                unreads_at_top,
                favorite_at_top,
            )| {
                let favorites: HashSet<&ChannelId> = favorites.iter().collect();
                let in_unreads = |channel: &Channel| {
                    is_unread_channel(members, channel)
                        || last_unread_channel_id.as_ref() == Some(channel.id())
                };

                channels
                    .iter()
                    .filter(|channel| {
                        let belongs = match group_type {
                            GroupType::Unreads => in_unreads(channel),
                            GroupType::Favorites => favorites.contains(channel.id()),
                            other => other.admits(channel),
                        };
                        if !belongs {
                            return false;
                        }
                        if group_type != GroupType::Unreads
                            && *unreads_at_top
                            && in_unreads(channel)
                        {
                            return false;
                        }
                        if !matches!(group_type, GroupType::Unreads | GroupType::Favorites)
                            && *favorite_at_top
                            && favorites.contains(channel.id())
                        {
                            return false;
                        }
                        !(*hide_town_square
                            && channel.name() == TOWN_SQUARE
                            && !is_unread_channel(members, channel)
                            && current_channel_id.as_ref() != Some(channel.id()))
                    })
                    .cloned()
                    .collect()
            },
        );

        let channels = self.archived.select(state, channels);
        let channels = self.manually_closed.select(state, channels);
        let channels = self
            .autoclose
            .select(state, (channels, group_type.autoclose_category()));
        let mut channels = match settings.sorting {
            LegacySorting::Alpha => self.by_name.select(state, channels),
            LegacySorting::Recent => self.by_recency.select(state, channels),
        };

        if group_type == GroupType::Unreads {
            let members = Arc::clone(&state.entities.channels.my_members);
            channels = self
                .mentions_first
                .get_or_compute((channels, members), |(channels, members)| {
                    let mut sorted = channels.to_vec();
                    sorted.sort_by_key(|channel| {
                        Reverse(has_unread_mention(
                            channel,
                            members.get(channel.id()).map(Arc::as_ref),
                        ))
                    });
                    same_or_new(channels, sorted)
                });
        }

        let stable = &mut self.stable;
        self.ids.get_or_compute((channels,), |(channels,)| {
            stable.settle(Arc::new(
                channels.iter().map(|channel| channel.id().clone()).collect(),
            ))
        })
    }
}

/// The legacy sidebar: ordered, named channel groups.
///
/// The group list is rebuilt only when some group's type or channel ids
/// differ from the previous call; otherwise the previous list is returned.
pub struct OrderedChannelGroups {
    my_channels: MyChannels,
    favorites: FavoriteChannelIds,
    unreads: GroupPipeline,
    favorite: GroupPipeline,
    public: GroupPipeline,
    private: GroupPipeline,
    direct: GroupPipeline,
    alpha: GroupPipeline,
    recent: GroupPipeline,
    last_groups: Option<Arc<Vec<ChannelGroup>>>,
}

impl std::fmt::Debug for OrderedChannelGroups {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderedChannelGroups")
            .field("last_groups", &self.last_groups)
            .finish_non_exhaustive()
    }
}

impl Default for OrderedChannelGroups {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedChannelGroups {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(|| chrono::Utc::now().timestamp_millis())
    }

    /// Uses `clock` for the autoclose cutoff, in milliseconds.
    #[must_use]
    pub fn with_clock(clock: impl Fn() -> i64 + 'static) -> Self {
        let clock: Rc<dyn Fn() -> i64> = Rc::new(clock);
        let pipeline = |group_type| GroupPipeline::new(group_type, Rc::clone(&clock));
        Self {
            my_channels: MyChannels::new(),
            favorites: FavoriteChannelIds::new(),
            unreads: pipeline(GroupType::Unreads),
            favorite: pipeline(GroupType::Favorites),
            public: pipeline(GroupType::Public),
            private: pipeline(GroupType::Private),
            direct: pipeline(GroupType::Direct),
            alpha: pipeline(GroupType::Alpha),
            recent: pipeline(GroupType::Recent),
            last_groups: None,
        }
    }

    fn pipeline(&mut self, group_type: GroupType) -> &mut GroupPipeline {
        match group_type {
            GroupType::Unreads => &mut self.unreads,
            GroupType::Favorites => &mut self.favorite,
            GroupType::Public => &mut self.public,
            GroupType::Private => &mut self.private,
            GroupType::Direct => &mut self.direct,
            GroupType::Alpha => &mut self.alpha,
            GroupType::Recent => &mut self.recent,
        }
    }

    /// True when `groups` matches the previous result, group for group.
    fn matches_last(&self, groups: &[(GroupType, IdList)]) -> bool {
        self.last_groups.as_ref().is_some_and(|last| {
            last.len() == groups.len()
                && last.iter().zip(groups).all(|(previous, (group_type, ids))| {
                    previous.group_type == *group_type && Arc::ptr_eq(&previous.channel_ids, ids)
                })
        })
    }
}

impl Selector<Option<&ChannelId>> for OrderedChannelGroups {
    type Output = Arc<Vec<ChannelGroup>>;

    /// `last_unread_channel_id` stays in the Unreads group after being read,
    /// so it does not jump while the user is looking at it.
    fn select(
        &mut self,
        state: &GlobalState,
        last_unread_channel_id: Option<&ChannelId>,
    ) -> Self::Output {
        let settings = get_legacy_sidebar_settings(state);

        let mut layout = Vec::with_capacity(5);
        if settings.unreads_at_top {
            layout.push(GroupType::Unreads);
        }
        if settings.favorite_at_top {
            layout.push(GroupType::Favorites);
        }
        match (settings.grouping, settings.sorting) {
            (ChannelGrouping::ByType, _) => {
                layout.extend([GroupType::Public, GroupType::Private, GroupType::Direct]);
            }
            (ChannelGrouping::None, LegacySorting::Alpha) => layout.push(GroupType::Alpha),
            (ChannelGrouping::None, LegacySorting::Recent) => layout.push(GroupType::Recent),
        }

        let my_channels = self.my_channels.select(state, ());
        let favorites = self.favorites.select(state, ());
        let groups: Vec<(GroupType, IdList)> = layout
            .into_iter()
            .map(|group_type| {
                let ids = self.pipeline(group_type).select(
                    state,
                    Arc::clone(&my_channels),
                    Arc::clone(&favorites),
                    last_unread_channel_id,
                );
                (group_type, ids)
            })
            .collect();

        if self.matches_last(&groups) {
            if let Some(last) = &self.last_groups {
                debug!(groups = last.len(), "Legacy sidebar groups unchanged");
                return Arc::clone(last);
            }
        }

        let built = Arc::new(
            groups
                .into_iter()
                .map(|(group_type, channel_ids)| ChannelGroup {
                    group_type,
                    name: group_type.display_name(),
                    channel_ids,
                })
                .collect::<Vec<_>>(),
        );
        self.last_groups = Some(Arc::clone(&built));
        built
    }
}
