//! Selector error types.

use thiserror::Error;

use crate::domain::entities::{CategoryId, ChannelId, TeamId};

/// Lookups a caller asked for explicitly and that the state cannot satisfy.
///
/// List selectors never return these; absent data yields an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum SelectorError {
    #[error("category {category_id} is not loaded")]
    CategoryNotFound { category_id: CategoryId },

    #[error("channel {channel_id} is not loaded")]
    ChannelNotFound { channel_id: ChannelId },

    #[error("team {team_id} has no sidebar categories")]
    NoCategoriesForTeam { team_id: TeamId },

    #[error("no current user in state")]
    NoCurrentUser,

    #[error("no current team in state")]
    NoCurrentTeam,
}

impl SelectorError {
    /// Creates a missing category error.
    #[must_use]
    pub fn category_not_found(category_id: &CategoryId) -> Self {
        Self::CategoryNotFound {
            category_id: category_id.clone(),
        }
    }

    /// Creates a missing channel error.
    #[must_use]
    pub fn channel_not_found(channel_id: &ChannelId) -> Self {
        Self::ChannelNotFound {
            channel_id: channel_id.clone(),
        }
    }

    /// Returns whether the error means the state is still loading.
    #[must_use]
    pub const fn is_missing_session(&self) -> bool {
        matches!(self, Self::NoCurrentUser | Self::NoCurrentTeam)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SelectorError::category_not_found(&CategoryId::from("cat1"));
        assert_eq!(err.to_string(), "category cat1 is not loaded");
        assert!(!err.is_missing_session());
        assert!(SelectorError::NoCurrentUser.is_missing_session());
    }
}
