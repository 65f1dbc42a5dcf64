//! Typed reads of user preferences and the server config flags that back them.

use std::sync::Arc;

use tracing::warn;

use super::entities::{get_config_value, is_config_enabled};
use super::memo::{IdsMemo, Selector};
use crate::domain::constants::{self, category, config, name};
use crate::domain::entities::{ChannelId, LegacySidebarSettings, NameFormat, preference_key};
use crate::domain::state::{GlobalState, PreferenceMap};

#[must_use]
pub fn get_preference<'a>(
    preferences: &'a PreferenceMap,
    category: &str,
    name: &str,
) -> Option<&'a str> {
    preferences
        .get(&preference_key(category, name))
        .map(|pref| pref.value.as_str())
}

/// Returns `default` when unset, otherwise whether the value is `"true"`.
#[must_use]
pub fn get_bool_preference(
    preferences: &PreferenceMap,
    category: &str,
    name: &str,
    default: bool,
) -> bool {
    get_preference(preferences, category, name).map_or(default, |value| value == "true")
}

/// Parses an integer preference. Malformed values fall back to `default`.
#[must_use]
pub fn get_int_preference(
    preferences: &PreferenceMap,
    category: &str,
    name: &str,
    default: i64,
) -> i64 {
    let Some(raw) = get_preference(preferences, category, name) else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(category, name, value = raw, "Malformed integer preference");
        default
    })
}

/// Millisecond timestamp stored under `category--channel_id`, `0` when unset.
#[must_use]
pub fn get_channel_timestamp_preference(
    preferences: &PreferenceMap,
    category: &str,
    channel_id: &ChannelId,
) -> i64 {
    get_int_preference(preferences, category, channel_id.as_str(), 0)
}

/// Name format from the user's display settings, then the server default.
#[must_use]
pub fn get_teammate_name_display_setting(state: &GlobalState) -> NameFormat {
    let preferences = &state.entities.preferences.my_preferences;
    get_preference(preferences, category::DISPLAY_SETTINGS, name::NAME_FORMAT)
        .and_then(NameFormat::parse)
        .or_else(|| {
            get_config_value(&state.entities.general.config, config::TEAMMATE_NAME_DISPLAY)
                .and_then(NameFormat::parse)
        })
        .unwrap_or_default()
}

/// True when both the server and the user enabled closing unused direct channels.
#[must_use]
pub fn should_autoclose_dms(state: &GlobalState) -> bool {
    is_config_enabled(state, config::CLOSE_UNUSED_DIRECT_MESSAGES)
        && get_preference(
            &state.entities.preferences.my_preferences,
            category::SIDEBAR_SETTINGS,
            name::CLOSE_UNUSED_DIRECT_MESSAGES,
        ) == Some(constants::AUTOCLOSE_AFTER_SEVEN_DAYS)
}

/// Number of direct and group channels kept visible by the count-based autoclose.
#[must_use]
pub fn get_visible_dm_gm_limit(state: &GlobalState) -> usize {
    let default = i64::try_from(constants::DEFAULT_LIMIT_VISIBLE_DMS_GMS).unwrap_or(i64::MAX);
    let limit = get_int_preference(
        &state.entities.preferences.my_preferences,
        category::SIDEBAR_SETTINGS,
        name::LIMIT_VISIBLE_DMS_GMS,
        default,
    );
    usize::try_from(limit).unwrap_or(0)
}

/// Whether the Unreads section sits at the top of the category sidebar.
#[must_use]
pub fn should_show_unreads_category(state: &GlobalState) -> bool {
    let default_on = get_config_value(&state.entities.general.config, config::GROUP_UNREAD_CHANNELS)
        == Some("default_on");
    get_bool_preference(
        &state.entities.preferences.my_preferences,
        category::SIDEBAR_SETTINGS,
        name::SHOW_UNREAD_SECTION,
        default_on,
    )
}

#[must_use]
pub fn is_legacy_sidebar_enabled(state: &GlobalState) -> bool {
    is_config_enabled(state, config::ENABLE_LEGACY_SIDEBAR)
}

/// Parses the legacy sidebar settings blob.
///
/// A missing blob yields the defaults. A malformed one logs and yields the
/// defaults too.
#[must_use]
pub fn get_legacy_sidebar_settings(state: &GlobalState) -> LegacySidebarSettings {
    let Some(raw) = get_preference(
        &state.entities.preferences.my_preferences,
        category::SIDEBAR_SETTINGS,
        name::LEGACY_SIDEBAR_BLOB,
    ) else {
        return LegacySidebarSettings::default();
    };

    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!(error = %e, "Malformed sidebar settings, using defaults");
        LegacySidebarSettings::default()
    })
}

#[must_use]
pub fn is_favorite_channel(preferences: &PreferenceMap, channel_id: &ChannelId) -> bool {
    get_bool_preference(
        preferences,
        category::FAVORITE_CHANNEL,
        channel_id.as_str(),
        false,
    )
}

/// Favorite channel ids, sorted, memoized on the preference map.
#[derive(Debug)]
pub struct FavoriteChannelIds {
    memo: IdsMemo<(Arc<PreferenceMap>,), ChannelId>,
}

impl Default for FavoriteChannelIds {
    fn default() -> Self {
        Self::new()
    }
}

impl FavoriteChannelIds {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: IdsMemo::new("favorite_channel_ids"),
        }
    }
}

impl Selector for FavoriteChannelIds {
    type Output = Arc<Vec<ChannelId>>;

    fn select(&mut self, state: &GlobalState, (): ()) -> Self::Output {
        let preferences = Arc::clone(&state.entities.preferences.my_preferences);
        self.memo.get_or_compute((preferences,), |(preferences,)| {
            let mut ids: Vec<ChannelId> = preferences
                .values()
                .filter(|pref| pref.category == category::FAVORITE_CHANNEL && pref.value == "true")
                .map(|pref| ChannelId::from(pref.name.as_str()))
                .collect();
            ids.sort();
            ids
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ChannelGrouping, LegacySorting, Preference};
    use test_case::test_case;

    fn state_with(prefs: impl IntoIterator<Item = Preference>) -> GlobalState {
        GlobalState::default().with_preferences(prefs)
    }

    #[test_case(None, true ; "missing uses default")]
    #[test_case(Some("true"), true ; "explicit true")]
    #[test_case(Some("false"), false ; "explicit false")]
    #[test_case(Some("yes"), false ; "anything else is false")]
    fn test_bool_preference(value: Option<&str>, expected: bool) {
        let state = state_with(value.map(|v| Preference::new("cat", "flag", v)));
        let prefs = &state.entities.preferences.my_preferences;
        assert_eq!(get_bool_preference(prefs, "cat", "flag", true), expected);
    }

    #[test]
    fn test_malformed_int_falls_back() {
        let state = state_with([Preference::new("cat", "n", "twelve")]);
        let prefs = &state.entities.preferences.my_preferences;
        assert_eq!(get_int_preference(prefs, "cat", "n", 7), 7);
    }

    #[test_case(None, None, NameFormat::Username ; "nothing set")]
    #[test_case(None, Some("full_name"), NameFormat::FullName ; "server default")]
    #[test_case(Some("nickname_full_name"), Some("full_name"), NameFormat::NicknameFullName ; "user wins")]
    fn test_teammate_name_display(pref: Option<&str>, server: Option<&str>, expected: NameFormat) {
        let state = state_with(pref.map(|v| Preference::new("display_settings", "name_format", v)))
            .with_config(server.map(|v| ("TeammateNameDisplay", v)));
        assert_eq!(get_teammate_name_display_setting(&state), expected);
    }

    #[test]
    fn test_autoclose_needs_server_and_user() {
        let pref = Preference::new(
            "sidebar_settings",
            "close_unused_direct_messages",
            "after_seven_days",
        );
        let user_only = state_with([pref.clone()]);
        assert!(!should_autoclose_dms(&user_only));

        let both = state_with([pref]).with_config([("CloseUnusedDirectMessages", "true")]);
        assert!(should_autoclose_dms(&both));
    }

    #[test]
    fn test_visible_limit() {
        assert_eq!(get_visible_dm_gm_limit(&GlobalState::default()), 20);
        let state = state_with([Preference::new("sidebar_settings", "limit_visible_dms_gms", "2")]);
        assert_eq!(get_visible_dm_gm_limit(&state), 2);
        let state =
            state_with([Preference::new("sidebar_settings", "limit_visible_dms_gms", "-4")]);
        assert_eq!(get_visible_dm_gm_limit(&state), 0);
    }

    #[test]
    fn test_show_unreads_category() {
        assert!(!should_show_unreads_category(&GlobalState::default()));
        let server = GlobalState::default()
            .with_config([("ExperimentalGroupUnreadChannels", "default_on")]);
        assert!(should_show_unreads_category(&server));
        let user_off = server.with_preferences([Preference::new(
            "sidebar_settings",
            "show_unread_section",
            "false",
        )]);
        assert!(!should_show_unreads_category(&user_off));
    }

    #[test]
    fn test_legacy_settings_blob() {
        let state = state_with([Preference::new(
            "sidebar_settings",
            "",
            r#"{"grouping":"none","sorting":"recent","unreads_at_top":"false"}"#,
        )]);
        let settings = get_legacy_sidebar_settings(&state);
        assert_eq!(settings.grouping, ChannelGrouping::None);
        assert_eq!(settings.sorting, LegacySorting::Recent);
        assert!(!settings.unreads_at_top);
        assert!(settings.favorite_at_top);

        let broken = state_with([Preference::new("sidebar_settings", "", "{not json")]);
        assert_eq!(get_legacy_sidebar_settings(&broken), LegacySidebarSettings::default());
    }

    #[test]
    fn test_favorite_ids_memoized() {
        let state = state_with([
            Preference::new("favorite_channel", "c2", "true"),
            Preference::new("favorite_channel", "c1", "true"),
            Preference::new("favorite_channel", "c3", "false"),
        ]);
        let mut selector = FavoriteChannelIds::new();
        let first = selector.select(&state, ());
        assert_eq!(*first, vec![ChannelId::from("c1"), ChannelId::from("c2")]);
        assert!(Arc::ptr_eq(&first, &selector.select(&state, ())));
        assert!(is_favorite_channel(
            &state.entities.preferences.my_preferences,
            &ChannelId::from("c2")
        ));
    }
}
