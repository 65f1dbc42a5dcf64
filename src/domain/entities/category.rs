//! Sidebar category entity.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{CategoryId, ChannelId, TeamId};

/// Kind of sidebar category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    /// Channels the user marked as favorite.
    Favorites,
    /// Public and private team channels.
    Channels,
    /// Direct and group messages.
    DirectMessages,
    /// User-defined category.
    Custom,
}

/// How channels inside a category are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CategorySorting {
    /// Category default, which is alphabetical.
    #[default]
    #[serde(rename = "")]
    Default,
    /// Stored order, never resorted.
    #[serde(rename = "manual")]
    Manual,
    /// Display name order.
    #[serde(rename = "alpha")]
    Alphabetical,
    /// Most recent post first.
    #[serde(rename = "recent")]
    Recency,
}

/// A named, ordered group of channels in a team's sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCategory {
    /// Category id.
    pub id: CategoryId,
    /// Owning team.
    pub team_id: TeamId,
    /// Category kind.
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    /// Name shown in the sidebar header.
    pub display_name: String,
    /// Sorting mode.
    #[serde(default)]
    pub sorting: CategorySorting,
    /// Member channels in stored order. Shared so that selectors can key on it.
    #[serde(default)]
    pub channel_ids: Arc<Vec<ChannelId>>,
    /// Whether the category is collapsed in the sidebar.
    #[serde(default)]
    pub collapsed: bool,
}

impl ChannelCategory {
    /// Creates an empty category.
    #[must_use]
    pub fn new(
        id: impl Into<CategoryId>,
        team_id: impl Into<TeamId>,
        category_type: CategoryType,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            team_id: team_id.into(),
            category_type,
            display_name: display_name.into(),
            sorting: CategorySorting::Default,
            channel_ids: Arc::new(Vec::new()),
            collapsed: false,
        }
    }

    /// Sets the sorting mode.
    #[must_use]
    pub const fn with_sorting(mut self, sorting: CategorySorting) -> Self {
        self.sorting = sorting;
        self
    }

    /// Sets the member channels.
    #[must_use]
    pub fn with_channel_ids<I, T>(mut self, channel_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ChannelId>,
    {
        self.channel_ids = Arc::new(channel_ids.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if the category lists the given channel.
    #[must_use]
    pub fn contains(&self, channel_id: &ChannelId) -> bool {
        self.channel_ids.contains(channel_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_builder() {
        let category = ChannelCategory::new("cat1", "t1", CategoryType::Custom, "Work")
            .with_sorting(CategorySorting::Manual)
            .with_channel_ids(["c1", "c2"]);

        assert_eq!(category.channel_ids.len(), 2);
        assert!(category.contains(&ChannelId::from("c2")));
        assert_eq!(category.sorting, CategorySorting::Manual);
    }

    #[test]
    fn test_sorting_wire_names() {
        let sorting: CategorySorting = serde_json::from_str("\"\"").unwrap();
        assert_eq!(sorting, CategorySorting::Default);
        let sorting: CategorySorting = serde_json::from_str("\"recent\"").unwrap();
        assert_eq!(sorting, CategorySorting::Recency);
        let kind: CategoryType = serde_json::from_str("\"direct_messages\"").unwrap();
        assert_eq!(kind, CategoryType::DirectMessages);
    }
}
