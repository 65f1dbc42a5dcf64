//! Memoized selectors over the state tree.
//!
//! Each selector is a struct owning its own cache. Two instances never share
//! a cache, so every call site that wants independent memoization constructs
//! its own.

use std::sync::Arc;

use crate::domain::entities::{Channel, ChannelId};

pub mod categories;
pub mod channels;
pub mod display_name;
pub mod entities;
pub mod filters;
pub mod legacy;
pub mod memo;
pub mod posts;
pub mod preferences;
pub mod sorting;
pub mod unreads;
pub mod users;

#[cfg(test)]
pub mod test_support;

/// An ordered list of channels shared between selectors.
pub type ChannelList = Arc<Vec<Arc<Channel>>>;

/// An ordered list of channel ids shared between selectors.
pub type IdList = Arc<Vec<ChannelId>>;

pub use categories::{
    CategoriesForTeam, ChannelIdsByCategory, ChannelIdsForCategory, ChannelsByCategory,
    ChannelsForCategory,
};
pub use filters::{AutocloseFilter, AutocloseStrategy};
pub use legacy::{ChannelGroup, GroupType, OrderedChannelGroups};
pub use memo::{Identity, Memo, Selector};
pub use unreads::{SortedUnreadChannels, TeamUnreads, UnreadCounts, Unreads, UnreadsInCurrentTeam};
