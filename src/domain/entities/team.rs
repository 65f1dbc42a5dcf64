//! Team entity and the current user's team membership.

use serde::{Deserialize, Serialize};

use super::{TeamId, UserId};

/// A team (workspace).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Team {
    /// Team id.
    pub id: TeamId,
    /// URL name.
    pub name: String,
    /// Human readable name.
    #[serde(default)]
    pub display_name: String,
    /// Deletion time, `0` while active.
    #[serde(default)]
    pub delete_at: i64,
}

impl Team {
    /// Creates an active team.
    #[must_use]
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: String::new(),
            delete_at: 0,
        }
    }
}

/// The current user's membership in a team.
///
/// `msg_count` and `mention_count` are server-maintained rollups across all of
/// the team's channels, so other teams never need a channel rescan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamMembership {
    /// Team id.
    pub team_id: TeamId,
    /// Member user id.
    #[serde(default)]
    pub user_id: UserId,
    /// Number of channels in the team with unread messages.
    #[serde(default)]
    pub msg_count: i64,
    /// Total unread mentions in the team.
    #[serde(default)]
    pub mention_count: i64,
    /// Space-separated role names.
    #[serde(default)]
    pub roles: String,
    /// Time the user left the team, `0` while a member.
    #[serde(default)]
    pub delete_at: i64,
}

impl TeamMembership {
    /// Creates a membership with no unreads.
    #[must_use]
    pub fn new(team_id: impl Into<TeamId>, user_id: impl Into<UserId>) -> Self {
        Self {
            team_id: team_id.into(),
            user_id: user_id.into(),
            msg_count: 0,
            mention_count: 0,
            roles: String::new(),
            delete_at: 0,
        }
    }

    /// Sets the unread rollups.
    #[must_use]
    pub const fn with_unreads(mut self, msg_count: i64, mention_count: i64) -> Self {
        self.msg_count = msg_count;
        self.mention_count = mention_count;
        self
    }
}
