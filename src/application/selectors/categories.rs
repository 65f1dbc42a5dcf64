//! Sidebar categories and the per-category channel pipeline.
//!
//! A category's channels go through archived, manually closed, and autoclose
//! filtering and are then ordered by the category's sorting mode. The whole
//! sidebar keeps one pipeline per category so a change in one category leaves
//! the others' outputs untouched.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::filters::{
    AutocloseFilter, AutocloseStrategy, FilterArchivedChannels, FilterManuallyClosedDms,
};
use super::memo::{IdsMemo, Identity, Memo, Selector, Stable};
use super::sorting::SortChannels;
use super::{ChannelList, IdList};
use crate::domain::entities::{
    CategoryId, CategoryType, Channel, ChannelCategory, ChannelId, TeamId,
};
use crate::domain::state::{CategoryMap, ChannelMap, GlobalState};

pub type CategoryList = Arc<Vec<Arc<ChannelCategory>>>;

/// A team's categories in sidebar order. Unknown teams yield an empty list.
#[derive(Debug)]
pub struct CategoriesForTeam {
    memo: IdsMemo<(Arc<CategoryMap>, Option<Arc<Vec<CategoryId>>>), Arc<ChannelCategory>>,
}

impl Default for CategoriesForTeam {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoriesForTeam {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: IdsMemo::new("categories_for_team"),
        }
    }
}

impl Selector<&TeamId> for CategoriesForTeam {
    type Output = CategoryList;

    fn select(&mut self, state: &GlobalState, team_id: &TeamId) -> CategoryList {
        let categories = &state.entities.channel_categories;
        let inputs = (
            Arc::clone(&categories.by_id),
            categories.order_by_team.get(team_id).cloned(),
        );
        self.memo.get_or_compute(inputs, |(by_id, order)| {
            order
                .iter()
                .flat_map(|ids| ids.iter())
                .filter_map(|id| by_id.get(id).cloned())
                .collect()
        })
    }
}

fn team_categories<'a>(
    state: &'a GlobalState,
    team_id: &TeamId,
) -> impl Iterator<Item = &'a Arc<ChannelCategory>> {
    let categories = &state.entities.channel_categories;
    categories
        .order_by_team
        .get(team_id)
        .into_iter()
        .flat_map(|ids| ids.iter())
        .filter_map(move |id| categories.by_id.get(id))
}

/// First category of the given type in the team.
#[must_use]
pub fn get_category_in_team_by_type(
    state: &GlobalState,
    team_id: &TeamId,
    category_type: CategoryType,
) -> Option<Arc<ChannelCategory>> {
    team_categories(state, team_id)
        .find(|category| category.category_type == category_type)
        .cloned()
}

/// The team category that lists `channel_id`.
#[must_use]
pub fn get_category_in_team_with_channel(
    state: &GlobalState,
    team_id: &TeamId,
    channel_id: &ChannelId,
) -> Option<Arc<ChannelCategory>> {
    team_categories(state, team_id)
        .find(|category| category.contains(channel_id))
        .cloned()
}

/// Resolves channel ids to loaded channels, skipping unknown ids.
#[derive(Debug)]
pub struct ChannelsForIds {
    memo: IdsMemo<(Arc<ChannelMap>, Arc<Vec<ChannelId>>), Arc<Channel>>,
}

impl Default for ChannelsForIds {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelsForIds {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: IdsMemo::new("channels_for_ids"),
        }
    }
}

impl Selector<Arc<Vec<ChannelId>>> for ChannelsForIds {
    type Output = ChannelList;

    fn select(&mut self, state: &GlobalState, ids: Arc<Vec<ChannelId>>) -> ChannelList {
        let channels = Arc::clone(&state.entities.channels.channels);
        self.memo.get_or_compute((channels, ids), |(channels, ids)| {
            ids.iter()
                .filter_map(|id| channels.get(id).cloned())
                .collect()
        })
    }
}

/// Visible channels of one category, in display order.
#[derive(Debug)]
pub struct ChannelsForCategory {
    channels_for_ids: ChannelsForIds,
    archived: FilterArchivedChannels,
    manually_closed: FilterManuallyClosedDms,
    autoclose: AutocloseFilter,
    sort: SortChannels,
}

impl Default for ChannelsForCategory {
    fn default() -> Self {
        Self::new(AutocloseStrategy::default())
    }
}

impl ChannelsForCategory {
    #[must_use]
    pub fn new(strategy: AutocloseStrategy) -> Self {
        Self {
            channels_for_ids: ChannelsForIds::new(),
            archived: FilterArchivedChannels::new(),
            manually_closed: FilterManuallyClosedDms::new(),
            autoclose: AutocloseFilter::new(strategy),
            sort: SortChannels::new(),
        }
    }
}

impl Selector<&ChannelCategory> for ChannelsForCategory {
    type Output = ChannelList;

    fn select(&mut self, state: &GlobalState, category: &ChannelCategory) -> ChannelList {
        let channels = self
            .channels_for_ids
            .select(state, Arc::clone(&category.channel_ids));
        let channels = self.archived.select(state, channels);
        let channels = self.manually_closed.select(state, channels);
        let channels = self
            .autoclose
            .select(state, (channels, category.category_type));
        self.sort.select(state, (channels, category.sorting))
    }
}

/// Visible channel ids of one category, in display order.
#[derive(Debug)]
pub struct ChannelIdsForCategory {
    channels: ChannelsForCategory,
    ids: Memo<(ChannelList,), IdList>,
    stable: Stable<IdList>,
}

impl Default for ChannelIdsForCategory {
    fn default() -> Self {
        Self::new(AutocloseStrategy::default())
    }
}

impl ChannelIdsForCategory {
    #[must_use]
    pub fn new(strategy: AutocloseStrategy) -> Self {
        Self {
            channels: ChannelsForCategory::new(strategy),
            ids: Memo::new("channel_ids_for_category"),
            stable: Stable::new(),
        }
    }
}

impl Selector<&ChannelCategory> for ChannelIdsForCategory {
    type Output = IdList;

    fn select(&mut self, state: &GlobalState, category: &ChannelCategory) -> IdList {
        let channels = self.channels.select(state, category);
        let stable = &mut self.stable;
        self.ids.get_or_compute((channels,), |(channels,)| {
            stable.settle(Arc::new(
                channels.iter().map(|channel| channel.id().clone()).collect(),
            ))
        })
    }
}

type Factory<P> = Box<dyn Fn() -> P>;

/// The whole sidebar for a team: one output per category, keyed by category id.
///
/// Each category gets its own pipeline, built on first use. When the team's
/// category list changes all pipelines are dropped and rebuilt. The returned
/// map keeps its previous reference while every category's output does.
pub struct SidebarByCategory<P, O> {
    categories: CategoriesForTeam,
    factory: Factory<P>,
    slots: HashMap<CategoryId, P>,
    last_category_ids: Vec<CategoryId>,
    stable: Stable<Arc<HashMap<CategoryId, O>>>,
}

impl<P, O> std::fmt::Debug for SidebarByCategory<P, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SidebarByCategory")
            .field("categories", &self.last_category_ids)
            .field("slots", &self.slots.len())
            .finish_non_exhaustive()
    }
}

impl<P, O> SidebarByCategory<P, O>
where
    P: for<'a> Selector<&'a ChannelCategory, Output = O>,
    O: Identity + Clone,
{
    pub fn new(factory: impl Fn() -> P + 'static) -> Self {
        Self {
            categories: CategoriesForTeam::new(),
            factory: Box::new(factory),
            slots: HashMap::new(),
            last_category_ids: Vec::new(),
            stable: Stable::new(),
        }
    }

    /// Number of per-category pipelines currently built.
    #[must_use]
    pub fn built_pipelines(&self) -> usize {
        self.slots.len()
    }
}

impl<P, O> Selector<&TeamId> for SidebarByCategory<P, O>
where
    P: for<'a> Selector<&'a ChannelCategory, Output = O>,
    O: Identity + Clone,
{
    type Output = Arc<HashMap<CategoryId, O>>;

    fn select(&mut self, state: &GlobalState, team_id: &TeamId) -> Self::Output {
        let categories = self.categories.select(state, team_id);

        let ids_changed = categories.len() != self.last_category_ids.len()
            || categories
                .iter()
                .zip(&self.last_category_ids)
                .any(|(category, id)| &category.id != id);
        if ids_changed {
            debug!(
                team_id = %team_id,
                dropped = self.slots.len(),
                categories = categories.len(),
                "Category list changed, rebuilding pipelines"
            );
            self.slots.clear();
            self.last_category_ids = categories.iter().map(|c| c.id.clone()).collect();
        }

        let factory = &self.factory;
        let mut by_category = HashMap::with_capacity(categories.len());
        for category in categories.iter() {
            let pipeline = self
                .slots
                .entry(category.id.clone())
                .or_insert_with(|| factory());
            by_category.insert(category.id.clone(), pipeline.select(state, &**category));
        }

        self.stable.settle(Arc::new(by_category))
    }
}

/// Visible channels of every category of a team.
pub type ChannelsByCategory = SidebarByCategory<ChannelsForCategory, ChannelList>;

/// Visible channel ids of every category of a team.
pub type ChannelIdsByCategory = SidebarByCategory<ChannelIdsForCategory, IdList>;

impl ChannelsByCategory {
    #[must_use]
    pub fn channels(strategy: AutocloseStrategy) -> Self {
        Self::new(move || ChannelsForCategory::new(strategy))
    }
}

impl ChannelIdsByCategory {
    #[must_use]
    pub fn channel_ids(strategy: AutocloseStrategy) -> Self {
        Self::new(move || ChannelIdsForCategory::new(strategy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::selectors::test_support::id_strs;
    use crate::domain::entities::{
        CategorySorting, ChannelMembership, ChannelType, MarkUnread, Preference, UserId,
        UserProfile,
    };
    use pretty_assertions::assert_eq;

    fn sidebar_state() -> GlobalState {
        let me = UserId::from("me");
        GlobalState::default()
            .with_current_user("me")
            .with_current_team("t1")
            .with_profiles([
                UserProfile::new("me", "me"),
                UserProfile::new("u_aard", "aardvark"),
            ])
            .with_channels([
                Channel::new("channel1", "zebra", ChannelType::Open)
                    .with_team("t1")
                    .with_display_name("Zebra"),
                Channel::new("channel2", "mango", ChannelType::Open)
                    .with_team("t1")
                    .with_display_name("Mango"),
                Channel::new("channel3", "apple", ChannelType::Open)
                    .with_team("t1")
                    .with_display_name("Apple"),
                Channel::direct("dmChannel2", &me, &UserId::from("u_aard"))
                    .with_display_name("zzz stale"),
            ])
            .with_my_members([
                ChannelMembership::new("channel1", "me"),
                ChannelMembership::new("channel2", "me"),
                ChannelMembership::new("channel3", "me"),
                ChannelMembership::new("dmChannel2", "me"),
            ])
            .with_preferences([Preference::new("direct_channel_show", "u_aard", "true")])
            .with_categories([
                ChannelCategory::new("favorites", "t1", CategoryType::Favorites, "Favorites")
                    .with_sorting(CategorySorting::Alphabetical)
                    .with_channel_ids(["dmChannel2", "channel1"]),
                ChannelCategory::new("channels", "t1", CategoryType::Channels, "Channels")
                    .with_sorting(CategorySorting::Manual)
                    .with_channel_ids(["channel2", "missing", "channel3"]),
                ChannelCategory::new("dms", "t1", CategoryType::DirectMessages, "DMs"),
            ])
    }

    fn category(state: &GlobalState, id: &str) -> ChannelCategory {
        (*state.entities.channel_categories.by_id[&CategoryId::from(id)]).clone()
    }

    #[test]
    fn test_categories_for_team() {
        let state = sidebar_state();
        let mut selector = CategoriesForTeam::new();
        let categories = selector.select(&state, &TeamId::from("t1"));
        let ids: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["favorites", "channels", "dms"]);
        assert!(Arc::ptr_eq(&categories, &selector.select(&state, &TeamId::from("t1"))));
        assert!(selector.select(&state, &TeamId::from("nope")).is_empty());
    }

    #[test]
    fn test_category_lookups() {
        let state = sidebar_state();
        let team = TeamId::from("t1");
        let dms = get_category_in_team_by_type(&state, &team, CategoryType::DirectMessages);
        assert_eq!(dms.map(|c| c.id.clone()), Some(CategoryId::from("dms")));
        let with = get_category_in_team_with_channel(&state, &team, &ChannelId::from("channel3"));
        assert_eq!(with.map(|c| c.id.clone()), Some(CategoryId::from("channels")));
        assert!(get_category_in_team_by_type(&state, &team, CategoryType::Custom).is_none());
    }

    #[test]
    fn test_favorites_sorted_with_live_dm_name_and_memoized() {
        let state = sidebar_state();
        let favorites = category(&state, "favorites");
        let mut selector = ChannelIdsForCategory::default();

        let first = selector.select(&state, &favorites);
        assert_eq!(id_strs(&first), ["dmChannel2", "channel1"]);
        let second = selector.select(&state, &favorites);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_manual_category_keeps_stored_order() {
        let state = sidebar_state();
        let channels = category(&state, "channels");
        let ids = ChannelIdsForCategory::default().select(&state, &channels);
        assert_eq!(id_strs(&ids), ["channel2", "channel3"]);
    }

    #[test]
    fn test_alphabetical_mutes_last() {
        let state = sidebar_state().with_my_members([
            ChannelMembership::new("channel1", "me"),
            ChannelMembership::new("channel2", "me"),
            ChannelMembership::new("channel3", "me").with_mark_unread(MarkUnread::Mention),
        ]);
        let custom = ChannelCategory::new("custom", "t1", CategoryType::Custom, "Custom")
            .with_sorting(CategorySorting::Alphabetical)
            .with_channel_ids(["channel1", "channel2", "channel3"]);

        let ids = ChannelIdsForCategory::default().select(&state, &custom);
        assert_eq!(id_strs(&ids), ["channel2", "channel1", "channel3"]);
    }

    #[test]
    fn test_unrelated_change_keeps_category_output() {
        let state = sidebar_state();
        let favorites = category(&state, "favorites");
        let mut selector = ChannelsForCategory::default();
        let first = selector.select(&state, &favorites);

        let mut changed = state.clone();
        changed.entities.teams.current_team_id = Some(TeamId::from("t2"));
        assert!(Arc::ptr_eq(&first, &selector.select(&changed, &favorites)));
    }

    #[test]
    fn test_whole_sidebar_is_stable() {
        let state = sidebar_state();
        let team = TeamId::from("t1");
        let mut sidebar = ChannelIdsByCategory::channel_ids(AutocloseStrategy::Limit);

        let first = sidebar.select(&state, &team);
        assert_eq!(id_strs(&first[&CategoryId::from("favorites")]), ["dmChannel2", "channel1"]);
        assert!(first[&CategoryId::from("dms")].is_empty());
        assert_eq!(sidebar.built_pipelines(), 3);

        let unrelated = state.clone().with_config([("SomeUnrelatedFlag", "true")]);
        let second = sidebar.select(&unrelated, &team);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_one_category_change_leaves_others() {
        let state = sidebar_state();
        let team = TeamId::from("t1");
        let mut sidebar = ChannelsByCategory::channels(AutocloseStrategy::Limit);
        let first = sidebar.select(&state, &team);

        let mut categories: Vec<ChannelCategory> = state
            .entities
            .channel_categories
            .by_id
            .values()
            .map(|c| (**c).clone())
            .collect();
        let order = ["favorites", "channels", "dms"];
        categories.sort_by_key(|c| order.iter().position(|id| *id == c.id.as_str()));
        for category in &mut categories {
            if category.id.as_str() == "channels" {
                category.channel_ids = Arc::new(vec![ChannelId::from("channel3")]);
            }
        }
        let changed = state.with_categories(categories);
        let second = sidebar.select(&changed, &team);

        assert!(!Arc::ptr_eq(&first, &second));
        let favorites = CategoryId::from("favorites");
        assert!(Arc::ptr_eq(&first[&favorites], &second[&favorites]));
        assert_eq!(second[&CategoryId::from("channels")].len(), 1);
    }

    #[test]
    fn test_category_list_change_rebuilds() {
        let state = sidebar_state();
        let team = TeamId::from("t1");
        let mut sidebar = ChannelIdsByCategory::channel_ids(AutocloseStrategy::Limit);
        sidebar.select(&state, &team);

        let fewer = state.with_categories([ChannelCategory::new(
            "favorites",
            "t1",
            CategoryType::Favorites,
            "Favorites",
        )]);
        let out = sidebar.select(&fewer, &team);
        assert_eq!(out.len(), 1);
        assert_eq!(sidebar.built_pipelines(), 1);

        let empty = GlobalState::default();
        assert!(sidebar.select(&empty, &team).is_empty());
        assert_eq!(sidebar.built_pipelines(), 0);
    }
}
