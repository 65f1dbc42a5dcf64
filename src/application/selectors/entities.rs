//! Plain projections from the state tree.

use std::sync::Arc;

use super::sorting::NaturalKey;
use crate::domain::entities::{
    CategoryId, Channel, ChannelCategory, ChannelId, Team, TeamId, UserId, UserProfile,
};
use crate::domain::errors::SelectorError;
use crate::domain::state::{
    CategoryMap, ChannelMap, ConfigMap, GlobalState, MembershipMap, PostMap, PostsInChannelMap,
    PreferenceMap, TeamMap, TeamMembershipMap, UserMap,
};

#[must_use]
pub fn get_all_channels(state: &GlobalState) -> Arc<ChannelMap> {
    Arc::clone(&state.entities.channels.channels)
}

#[must_use]
pub fn get_my_channel_memberships(state: &GlobalState) -> Arc<MembershipMap> {
    Arc::clone(&state.entities.channels.my_members)
}

#[must_use]
pub fn get_my_preferences(state: &GlobalState) -> Arc<PreferenceMap> {
    Arc::clone(&state.entities.preferences.my_preferences)
}

#[must_use]
pub fn get_users(state: &GlobalState) -> Arc<UserMap> {
    Arc::clone(&state.entities.users.profiles)
}

#[must_use]
pub fn get_posts(state: &GlobalState) -> Arc<PostMap> {
    Arc::clone(&state.entities.posts.posts)
}

#[must_use]
pub fn get_posts_in_channel(state: &GlobalState) -> Arc<PostsInChannelMap> {
    Arc::clone(&state.entities.posts.posts_in_channel)
}

#[must_use]
pub fn get_config(state: &GlobalState) -> Arc<ConfigMap> {
    Arc::clone(&state.entities.general.config)
}

#[must_use]
pub fn get_teams(state: &GlobalState) -> Arc<TeamMap> {
    Arc::clone(&state.entities.teams.teams)
}

#[must_use]
pub fn get_team_memberships(state: &GlobalState) -> Arc<TeamMembershipMap> {
    Arc::clone(&state.entities.teams.my_members)
}

#[must_use]
pub fn get_categories_by_id(state: &GlobalState) -> Arc<CategoryMap> {
    Arc::clone(&state.entities.channel_categories.by_id)
}

#[must_use]
pub fn get_current_user_id(state: &GlobalState) -> Option<UserId> {
    state.entities.users.current_user_id.clone()
}

#[must_use]
pub fn get_current_channel_id(state: &GlobalState) -> Option<ChannelId> {
    state.entities.channels.current_channel_id.clone()
}

#[must_use]
pub fn get_current_team_id(state: &GlobalState) -> Option<TeamId> {
    state.entities.teams.current_team_id.clone()
}

/// Returns the logged in user's profile.
///
/// # Errors
///
/// Returns [`SelectorError::NoCurrentUser`] when no user is logged in or the
/// profile is not loaded.
pub fn get_current_user(state: &GlobalState) -> Result<Arc<UserProfile>, SelectorError> {
    state
        .entities
        .users
        .current_user_id
        .as_ref()
        .and_then(|id| state.entities.users.profiles.get(id))
        .cloned()
        .ok_or(SelectorError::NoCurrentUser)
}

#[must_use]
pub fn get_channel(state: &GlobalState, channel_id: &ChannelId) -> Option<Arc<Channel>> {
    state.entities.channels.channels.get(channel_id).cloned()
}

/// Returns a channel that the caller knows must exist.
///
/// # Errors
///
/// Returns [`SelectorError::ChannelNotFound`] when the id is unknown.
pub fn require_channel(
    state: &GlobalState,
    channel_id: &ChannelId,
) -> Result<Arc<Channel>, SelectorError> {
    get_channel(state, channel_id).ok_or_else(|| SelectorError::channel_not_found(channel_id))
}

/// # Errors
///
/// Returns [`SelectorError::NoCurrentTeam`] before a team is selected.
pub fn require_current_team_id(state: &GlobalState) -> Result<TeamId, SelectorError> {
    get_current_team_id(state).ok_or(SelectorError::NoCurrentTeam)
}

/// Teams the user is an active member of, by display name.
#[must_use]
pub fn get_my_teams(state: &GlobalState) -> Vec<Arc<Team>> {
    let memberships = &state.entities.teams.my_members;
    let mut teams: Vec<Arc<Team>> = state
        .entities
        .teams
        .teams
        .values()
        .filter(|team| {
            team.delete_at == 0
                && memberships
                    .get(&team.id)
                    .is_some_and(|membership| membership.delete_at == 0)
        })
        .cloned()
        .collect();
    teams.sort_by_cached_key(|team| (NaturalKey::new(team.display_name.as_str()), team.id.clone()));
    teams
}

#[must_use]
pub fn get_current_channel(state: &GlobalState) -> Option<Arc<Channel>> {
    state
        .entities
        .channels
        .current_channel_id
        .as_ref()
        .and_then(|id| get_channel(state, id))
}

#[must_use]
pub fn get_config_value<'a>(config: &'a ConfigMap, key: &str) -> Option<&'a str> {
    config.get(key).map(String::as_str)
}

/// Returns true if the config flag is the string `"true"`.
#[must_use]
pub fn is_config_enabled(state: &GlobalState, key: &str) -> bool {
    get_config_value(&state.entities.general.config, key) == Some("true")
}

#[must_use]
pub fn get_category(state: &GlobalState, category_id: &CategoryId) -> Option<Arc<ChannelCategory>> {
    state
        .entities
        .channel_categories
        .by_id
        .get(category_id)
        .cloned()
}

/// Returns a category that the caller knows must exist.
///
/// # Errors
///
/// Returns [`SelectorError::CategoryNotFound`] when the id is unknown.
pub fn require_category(
    state: &GlobalState,
    category_id: &CategoryId,
) -> Result<Arc<ChannelCategory>, SelectorError> {
    get_category(state, category_id).ok_or_else(|| SelectorError::category_not_found(category_id))
}

/// Returns the team's ordered category ids, empty for unknown teams.
#[must_use]
pub fn get_category_ids_for_team(state: &GlobalState, team_id: &TeamId) -> Arc<Vec<CategoryId>> {
    state
        .entities
        .channel_categories
        .order_by_team
        .get(team_id)
        .cloned()
        .unwrap_or_default()
}

/// Returns the team's ordered category ids.
///
/// # Errors
///
/// Returns [`SelectorError::NoCategoriesForTeam`] when the team has none.
pub fn require_category_ids_for_team(
    state: &GlobalState,
    team_id: &TeamId,
) -> Result<Arc<Vec<CategoryId>>, SelectorError> {
    let ids = get_category_ids_for_team(state, team_id);
    if ids.is_empty() {
        return Err(SelectorError::NoCategoriesForTeam {
            team_id: team_id.clone(),
        });
    }
    Ok(ids)
}
