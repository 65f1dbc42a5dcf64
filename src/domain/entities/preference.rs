//! User preference entity and the preference values the sidebar reads.

use serde::{Deserialize, Serialize};

use super::UserId;
use crate::domain::serde_utils::bool_from_str;

/// Separator between category and name in a preference key.
pub const PREFERENCE_KEY_SEPARATOR: &str = "--";

/// Builds the composite `category--name` key used by preference maps.
#[must_use]
pub fn preference_key(category: &str, name: &str) -> String {
    format!("{category}{PREFERENCE_KEY_SEPARATOR}{name}")
}

/// A single `(category, name) -> value` preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    /// Owning user.
    #[serde(default)]
    pub user_id: UserId,
    /// Preference category.
    pub category: String,
    /// Preference name within the category.
    pub name: String,
    /// Raw string value.
    pub value: String,
}

impl Preference {
    /// Creates a preference owned by no particular user.
    #[must_use]
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            user_id: UserId::default(),
            category: category.into(),
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns this preference's composite key.
    #[must_use]
    pub fn key(&self) -> String {
        preference_key(&self.category, &self.name)
    }
}

/// How other users' names are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameFormat {
    /// Username only.
    #[default]
    Username,
    /// First and last name, falling back to the username.
    FullName,
    /// Nickname, then full name, then username.
    NicknameFullName,
}

impl NameFormat {
    /// Parses a stored preference or config value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "username" => Some(Self::Username),
            "full_name" => Some(Self::FullName),
            "nickname_full_name" => Some(Self::NicknameFullName),
            _ => None,
        }
    }
}

/// Legacy sidebar grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelGrouping {
    /// Separate public, private, and direct groups.
    #[default]
    ByType,
    /// A single combined group.
    None,
}

/// Legacy sidebar sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacySorting {
    /// Display name order.
    #[default]
    Alpha,
    /// Most recent post first.
    Recent,
}

/// Settings blob stored under the `sidebar_settings` category with an empty name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySidebarSettings {
    /// Grouping mode.
    #[serde(default)]
    pub grouping: ChannelGrouping,
    /// Sorting mode.
    #[serde(default)]
    pub sorting: LegacySorting,
    /// Show the Unreads group first.
    #[serde(default = "default_true", with = "bool_from_str")]
    pub unreads_at_top: bool,
    /// Show the Favorites group before the typed groups.
    #[serde(default = "default_true", with = "bool_from_str")]
    pub favorite_at_top: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for LegacySidebarSettings {
    fn default() -> Self {
        Self {
            grouping: ChannelGrouping::ByType,
            sorting: LegacySorting::Alpha,
            unreads_at_top: true,
            favorite_at_top: true,
        }
    }
}
