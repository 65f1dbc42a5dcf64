//! State snapshot loading.
//!
//! A snapshot is a JSON document with flat entity lists. Loading indexes them
//! into a [`GlobalState`].

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::entities::{
    Channel, ChannelCategory, ChannelId, ChannelMembership, Post, Preference, Team,
    TeamMembership, TeamId, UserId, UserProfile,
};
use crate::domain::state::GlobalState;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized form of a state tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub current_user_id: Option<UserId>,
    #[serde(default)]
    pub current_team_id: Option<TeamId>,
    #[serde(default)]
    pub current_channel_id: Option<ChannelId>,
    #[serde(default)]
    pub config: HashMap<String, String>,
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub team_members: Vec<TeamMembership>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub channel_members: Vec<ChannelMembership>,
    #[serde(default)]
    pub categories: Vec<ChannelCategory>,
    #[serde(default)]
    pub preferences: Vec<Preference>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl StateSnapshot {
    /// Indexes the snapshot into a state tree.
    #[must_use]
    pub fn into_state(self) -> GlobalState {
        debug!(
            channels = self.channels.len(),
            categories = self.categories.len(),
            users = self.users.len(),
            "Indexing snapshot"
        );

        let mut state = GlobalState::default()
            .with_config(self.config)
            .with_profiles(self.users)
            .with_teams(self.teams, self.team_members)
            .with_channels(self.channels)
            .with_my_members(self.channel_members)
            .with_categories(self.categories)
            .with_preferences(self.preferences)
            .with_posts(self.posts);
        state.entities.users.current_user_id = self.current_user_id;
        state.entities.teams.current_team_id = self.current_team_id;
        state.entities.channels.current_channel_id = self.current_channel_id;
        state
    }
}

/// Parses a snapshot document.
///
/// # Errors
///
/// Returns `SnapshotError::Json` if the document is not a valid snapshot.
pub fn parse_snapshot(content: &str) -> Result<GlobalState, SnapshotError> {
    let snapshot: StateSnapshot = serde_json::from_str(content)?;
    Ok(snapshot.into_state())
}

/// Reads and parses a snapshot file.
///
/// # Errors
///
/// Returns `SnapshotError` if the file cannot be read or parsed.
pub fn load_snapshot(path: &Path) -> Result<GlobalState, SnapshotError> {
    let content = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let state = parse_snapshot(&content)?;
    info!(path = %path.display(), "Loaded state snapshot");
    Ok(state)
}
