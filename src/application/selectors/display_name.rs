//! Live display names.
//!
//! Direct and group channels store a display name that goes stale when a
//! participant renames themselves, so theirs are rebuilt from profiles.

use std::collections::HashMap;
use std::sync::Arc;

use super::memo::{Memo, Selector};
use super::preferences::get_teammate_name_display_setting;
use super::sorting::NaturalKey;
use super::users::{ProfilesByUsername, UsernameMap};
use crate::domain::entities::{
    Channel, ChannelId, ChannelKind, GROUP_DISPLAY_NAME_SEPARATOR, NameFormat, UserId, UserProfile,
};
use crate::domain::state::{GlobalState, UserMap};

/// Formats a user's name. A missing user yields an empty string.
#[must_use]
pub fn display_username(user: Option<&UserProfile>, name_format: NameFormat) -> String {
    let Some(user) = user else {
        return String::new();
    };

    let name = match name_format {
        NameFormat::Username => String::new(),
        NameFormat::FullName => user.full_name(),
        NameFormat::NicknameFullName => {
            if user.nickname().is_empty() {
                user.full_name()
            } else {
                user.nickname().to_owned()
            }
        }
    };

    if name.trim().is_empty() {
        user.username().to_owned()
    } else {
        name
    }
}

/// Everything needed to resolve a channel's display name.
#[derive(Debug, Clone, Copy)]
pub struct DisplayNameContext<'a> {
    pub current_user_id: Option<&'a UserId>,
    pub users: &'a UserMap,
    pub users_by_username: &'a HashMap<String, Arc<UserProfile>>,
    pub name_format: NameFormat,
}

/// Resolves the name shown for a channel.
///
/// Public and private channels use their stored name. A direct channel shows
/// the teammate. A group channel lists the other participants ordered by
/// username. Unknown participants fall back to the stored name.
#[must_use]
pub fn channel_display_name(channel: &Channel, ctx: &DisplayNameContext<'_>) -> String {
    let Some(current_user_id) = ctx.current_user_id else {
        return channel.display_name().to_owned();
    };

    match channel.kind(current_user_id) {
        ChannelKind::Public | ChannelKind::Private => channel.display_name().to_owned(),
        ChannelKind::Direct { teammate_id } => match ctx.users.get(&teammate_id) {
            Some(teammate) => display_username(Some(&**teammate), ctx.name_format),
            None => channel.display_name().to_owned(),
        },
        ChannelKind::Group {
            participant_usernames,
        } => {
            let mut participants: Vec<&Arc<UserProfile>> = participant_usernames
                .iter()
                .filter_map(|username| ctx.users_by_username.get(*username))
                .filter(|user| user.id() != current_user_id)
                .collect();
            if participants.is_empty() {
                return channel.display_name().to_owned();
            }
            participants.sort_by_cached_key(|user| NaturalKey::new(user.username()));
            participants
                .into_iter()
                .map(|user| display_username(Some(&**user), ctx.name_format))
                .collect::<Vec<_>>()
                .join(GROUP_DISPLAY_NAME_SEPARATOR)
        }
    }
}

type DisplayNameInputs = (
    Option<Arc<Channel>>,
    Arc<UserMap>,
    UsernameMap,
    Option<UserId>,
    NameFormat,
);

/// Display name of one channel, memoized on the channel and the profiles.
#[derive(Debug)]
pub struct ChannelDisplayName {
    profiles_by_username: ProfilesByUsername,
    memo: Memo<DisplayNameInputs, String>,
}

impl Default for ChannelDisplayName {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelDisplayName {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            profiles_by_username: ProfilesByUsername::new(),
            memo: Memo::new("channel_display_name"),
        }
    }
}

impl Selector<&ChannelId> for ChannelDisplayName {
    type Output = String;

    fn select(&mut self, state: &GlobalState, channel_id: &ChannelId) -> String {
        let inputs = (
            state.entities.channels.channels.get(channel_id).cloned(),
            Arc::clone(&state.entities.users.profiles),
            self.profiles_by_username.select(state, ()),
            state.entities.users.current_user_id.clone(),
            get_teammate_name_display_setting(state),
        );
        self.memo.get_or_compute(
            inputs,
            |(channel, users, by_username, current_user_id, name_format)| {
                channel.as_ref().map_or_else(String::new, |channel| {
                    let ctx = DisplayNameContext {
                        current_user_id: current_user_id.as_ref(),
                        users,
                        users_by_username: by_username,
                        name_format: *name_format,
                    };
                    channel_display_name(channel, &ctx)
                })
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ChannelType, Preference};
    use test_case::test_case;

    fn jane() -> UserProfile {
        UserProfile::new("u2", "jane").with_name("Jane", "Doe").with_nickname("JD")
    }

    #[test_case(NameFormat::Username, "jane" ; "username")]
    #[test_case(NameFormat::FullName, "Jane Doe" ; "full name")]
    #[test_case(NameFormat::NicknameFullName, "JD" ; "nickname")]
    fn test_display_username(format: NameFormat, expected: &str) {
        assert_eq!(display_username(Some(&jane()), format), expected);
    }

    #[test]
    fn test_display_username_fallbacks() {
        let bare = UserProfile::new("u3", "bare");
        assert_eq!(display_username(Some(&bare), NameFormat::NicknameFullName), "bare");
        assert_eq!(display_username(Some(&bare), NameFormat::FullName), "bare");
        assert_eq!(display_username(None, NameFormat::FullName), "");
    }

    fn state() -> GlobalState {
        let me = UserId::from("u1");
        GlobalState::default()
            .with_current_user("u1")
            .with_profiles([
                UserProfile::new("u1", "me"),
                jane(),
                UserProfile::new("u3", "bob10"),
                UserProfile::new("u4", "bob9"),
            ])
            .with_channels([
                Channel::direct("dm", &me, &UserId::from("u2")).with_display_name("stale"),
                Channel::new("gm", "gm", ChannelType::Group)
                    .with_display_name("me, bob10, jane, bob9"),
                Channel::new("pub", "pub", ChannelType::Open).with_display_name("Public"),
            ])
    }

    #[test_case("dm", "jane" ; "direct uses teammate")]
    #[test_case("gm", "bob9, bob10, jane" ; "group excludes me and sorts")]
    #[test_case("pub", "Public" ; "public uses stored name")]
    #[test_case("missing", "" ; "unknown channel")]
    fn test_channel_display_name(id: &str, expected: &str) {
        let mut selector = ChannelDisplayName::new();
        assert_eq!(selector.select(&state(), &ChannelId::from(id)), expected);
    }

    #[test]
    fn test_name_format_preference_applies() {
        let state = state().with_preferences([Preference::new(
            "display_settings",
            "name_format",
            "full_name",
        )]);
        let mut selector = ChannelDisplayName::new();
        assert_eq!(selector.select(&state, &ChannelId::from("dm")), "Jane Doe");
    }

    #[test]
    fn test_memoized_per_channel() {
        let state = state();
        let mut selector = ChannelDisplayName::new();
        selector.select(&state, &ChannelId::from("dm"));
        selector.select(&state, &ChannelId::from("dm"));
        assert_eq!(selector.memo.recomputations(), 1);
    }
}
