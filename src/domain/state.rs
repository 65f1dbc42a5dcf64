//! Immutable snapshot of the normalized client store.
//!
//! Every collection sits behind an [`Arc`]. Reducers (outside this crate)
//! never mutate a collection in place; they swap in a new `Arc`. Selectors use
//! pointer identity of these `Arc`s to decide whether anything changed.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use super::entities::{
    CategoryId, Channel, ChannelCategory, ChannelId, ChannelMembership, Post, PostId,
    PostOrderBlock, Preference, Team, TeamId, TeamMembership, UserId, UserProfile,
};

/// Entities keyed by id, each shared.
pub type ById<K, V> = HashMap<K, Arc<V>>;

/// Channels by id.
pub type ChannelMap = ById<ChannelId, Channel>;
/// The current user's channel memberships by channel id.
pub type MembershipMap = ById<ChannelId, ChannelMembership>;
/// Preferences by `category--name` key.
pub type PreferenceMap = ById<String, Preference>;
/// Profiles by user id.
pub type UserMap = ById<UserId, UserProfile>;
/// Posts by id.
pub type PostMap = ById<PostId, Post>;
/// Loaded post blocks per channel.
pub type PostsInChannelMap = HashMap<ChannelId, Arc<Vec<PostOrderBlock>>>;
/// Categories by id.
pub type CategoryMap = ById<CategoryId, ChannelCategory>;
/// Ordered category ids per team.
pub type CategoryOrderMap = HashMap<TeamId, Arc<Vec<CategoryId>>>;
/// Teams by id.
pub type TeamMap = ById<TeamId, Team>;
/// The current user's team memberships by team id.
pub type TeamMembershipMap = ById<TeamId, TeamMembership>;
/// Server config, string valued.
pub type ConfigMap = HashMap<String, String>;

/// Root of the state tree.
#[derive(Debug, Clone, Default)]
pub struct GlobalState {
    /// Normalized entities.
    pub entities: Entities,
}

/// Normalized entity slices.
#[derive(Debug, Clone, Default)]
pub struct Entities {
    /// Server config.
    pub general: GeneralState,
    /// Users.
    pub users: UsersState,
    /// Teams.
    pub teams: TeamsState,
    /// Channels and memberships.
    pub channels: ChannelsState,
    /// Sidebar categories.
    pub channel_categories: ChannelCategoriesState,
    /// Posts.
    pub posts: PostsState,
    /// Preferences.
    pub preferences: PreferencesState,
}

/// Server-provided config.
#[derive(Debug, Clone, Default)]
pub struct GeneralState {
    /// Client config map.
    pub config: Arc<ConfigMap>,
}

/// User profiles.
#[derive(Debug, Clone, Default)]
pub struct UsersState {
    /// Logged in user.
    pub current_user_id: Option<UserId>,
    /// Loaded profiles.
    pub profiles: Arc<UserMap>,
}

/// Teams and the current user's team memberships.
#[derive(Debug, Clone, Default)]
pub struct TeamsState {
    /// Team being viewed.
    pub current_team_id: Option<TeamId>,
    /// Loaded teams.
    pub teams: Arc<TeamMap>,
    /// The current user's memberships.
    pub my_members: Arc<TeamMembershipMap>,
}

/// Channels and the current user's channel memberships.
#[derive(Debug, Clone, Default)]
pub struct ChannelsState {
    /// Channel being viewed.
    pub current_channel_id: Option<ChannelId>,
    /// Loaded channels.
    pub channels: Arc<ChannelMap>,
    /// The current user's memberships.
    pub my_members: Arc<MembershipMap>,
}

/// Sidebar categories.
#[derive(Debug, Clone, Default)]
pub struct ChannelCategoriesState {
    /// Categories by id.
    pub by_id: Arc<CategoryMap>,
    /// Category order per team. Only ids present in `by_id`.
    pub order_by_team: Arc<CategoryOrderMap>,
}

/// Loaded posts.
#[derive(Debug, Clone, Default)]
pub struct PostsState {
    /// Posts by id.
    pub posts: Arc<PostMap>,
    /// Loaded blocks per channel.
    pub posts_in_channel: Arc<PostsInChannelMap>,
}

/// The current user's preferences.
#[derive(Debug, Clone, Default)]
pub struct PreferencesState {
    /// Preferences by `category--name` key.
    pub my_preferences: Arc<PreferenceMap>,
}

/// Indexes values by a key, sharing each value.
pub fn index_by<K, V>(
    items: impl IntoIterator<Item = V>,
    mut key: impl FnMut(&V) -> K,
) -> ById<K, V>
where
    K: Eq + Hash,
{
    items
        .into_iter()
        .map(|item| (key(&item), Arc::new(item)))
        .collect()
}

impl GlobalState {
    /// Returns a copy with the channel collection replaced.
    #[must_use]
    pub fn with_channels(mut self, channels: impl IntoIterator<Item = Channel>) -> Self {
        self.entities.channels.channels = Arc::new(index_by(channels, |c| c.id().clone()));
        self
    }

    /// Returns a copy with the channel memberships replaced.
    #[must_use]
    pub fn with_my_members(mut self, members: impl IntoIterator<Item = ChannelMembership>) -> Self {
        self.entities.channels.my_members = Arc::new(index_by(members, |m| m.channel_id.clone()));
        self
    }

    /// Returns a copy with the profiles replaced.
    #[must_use]
    pub fn with_profiles(mut self, profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        self.entities.users.profiles = Arc::new(index_by(profiles, |u| u.id().clone()));
        self
    }

    /// Returns a copy with the preferences replaced.
    #[must_use]
    pub fn with_preferences(mut self, preferences: impl IntoIterator<Item = Preference>) -> Self {
        self.entities.preferences.my_preferences =
            Arc::new(index_by(preferences, Preference::key));
        self
    }

    /// Returns a copy with the categories and per-team order replaced.
    ///
    /// Order follows the iteration order of `categories` within each team.
    #[must_use]
    pub fn with_categories(
        mut self,
        categories: impl IntoIterator<Item = ChannelCategory>,
    ) -> Self {
        let mut order: HashMap<TeamId, Vec<CategoryId>> = HashMap::new();
        let by_id = index_by(categories, |c| {
            order
                .entry(c.team_id.clone())
                .or_default()
                .push(c.id.clone());
            c.id.clone()
        });
        self.entities.channel_categories = ChannelCategoriesState {
            by_id: Arc::new(by_id),
            order_by_team: Arc::new(
                order
                    .into_iter()
                    .map(|(team, ids)| (team, Arc::new(ids)))
                    .collect(),
            ),
        };
        self
    }

    /// Returns a copy with the posts and their channel blocks replaced.
    ///
    /// Each channel gets one recent block, newest first.
    #[must_use]
    pub fn with_posts(mut self, posts: impl IntoIterator<Item = Post>) -> Self {
        let mut posts: Vec<Post> = posts.into_iter().collect();
        posts.sort_by(|a, b| b.create_at.cmp(&a.create_at));

        let mut blocks: HashMap<ChannelId, Vec<PostId>> = HashMap::new();
        for post in &posts {
            blocks
                .entry(post.channel_id.clone())
                .or_default()
                .push(post.id.clone());
        }

        self.entities.posts = PostsState {
            posts: Arc::new(index_by(posts, |p| p.id.clone())),
            posts_in_channel: Arc::new(
                blocks
                    .into_iter()
                    .map(|(channel, order)| {
                        (channel, Arc::new(vec![PostOrderBlock::recent(order)]))
                    })
                    .collect(),
            ),
        };
        self
    }

    /// Returns a copy with the config map replaced.
    #[must_use]
    pub fn with_config<K, V>(mut self, config: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.entities.general.config = Arc::new(
            config
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Returns a copy with teams and team memberships replaced.
    #[must_use]
    pub fn with_teams(
        mut self,
        teams: impl IntoIterator<Item = Team>,
        members: impl IntoIterator<Item = TeamMembership>,
    ) -> Self {
        self.entities.teams.teams = Arc::new(index_by(teams, |t| t.id.clone()));
        self.entities.teams.my_members = Arc::new(index_by(members, |m| m.team_id.clone()));
        self
    }

    /// Returns a copy with the current user set.
    #[must_use]
    pub fn with_current_user(mut self, user_id: impl Into<UserId>) -> Self {
        self.entities.users.current_user_id = Some(user_id.into());
        self
    }

    /// Returns a copy with the current team set.
    #[must_use]
    pub fn with_current_team(mut self, team_id: impl Into<TeamId>) -> Self {
        self.entities.teams.current_team_id = Some(team_id.into());
        self
    }

    /// Returns a copy with the current channel set.
    #[must_use]
    pub fn with_current_channel(mut self, channel_id: impl Into<ChannelId>) -> Self {
        self.entities.channels.current_channel_id = Some(channel_id.into());
        self
    }
}
