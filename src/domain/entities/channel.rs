//! Channel entity.

use serde::{Deserialize, Serialize};

use super::{ChannelId, TeamId, UserId};
use crate::domain::serde_utils::empty_string_as_none;

/// Machine name of the default channel every team member belongs to.
pub const TOWN_SQUARE: &str = "town-square";

/// Separator between the two user ids in a direct channel's name.
pub const DIRECT_NAME_SEPARATOR: &str = "__";

/// Separator between participant usernames in a group channel's stored display name.
pub const GROUP_DISPLAY_NAME_SEPARATOR: &str = ", ";

/// Channel type as stored by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChannelType {
    /// Public team channel.
    #[default]
    #[serde(rename = "O")]
    Open,
    /// Private team channel.
    #[serde(rename = "P")]
    Private,
    /// Direct message between two users.
    #[serde(rename = "D")]
    Direct,
    /// Group message between three or more users.
    #[serde(rename = "G")]
    Group,
}

impl ChannelType {
    /// Returns true for direct and group message channels.
    #[must_use]
    pub const fn is_direct_or_group(self) -> bool {
        matches!(self, Self::Direct | Self::Group)
    }
}

/// Channel type with the participants resolved for the viewing user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelKind<'a> {
    /// Public team channel.
    Public,
    /// Private team channel.
    Private,
    /// Direct message with a single teammate.
    Direct {
        /// The participant who is not the viewing user.
        teammate_id: UserId,
    },
    /// Group message. Participants are only known by username.
    Group {
        /// Usernames taken from the stored display name.
        participant_usernames: Vec<&'a str>,
    },
}

/// Channel information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    id: ChannelId,
    #[serde(default, with = "empty_string_as_none")]
    team_id: Option<TeamId>,
    #[serde(rename = "type")]
    channel_type: ChannelType,
    name: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    delete_at: i64,
    #[serde(default)]
    last_post_at: i64,
    #[serde(default)]
    total_msg_count: i64,
}

impl Channel {
    /// Creates a new channel with the given id, machine name, and type.
    #[must_use]
    pub fn new(
        id: impl Into<ChannelId>,
        name: impl Into<String>,
        channel_type: ChannelType,
    ) -> Self {
        Self {
            id: id.into(),
            team_id: None,
            channel_type,
            name: name.into(),
            display_name: String::new(),
            delete_at: 0,
            last_post_at: 0,
            total_msg_count: 0,
        }
    }

    /// Creates a direct channel between two users with the canonical name.
    #[must_use]
    pub fn direct(id: impl Into<ChannelId>, user_a: &UserId, user_b: &UserId) -> Self {
        Self::new(id, direct_channel_name(user_a, user_b), ChannelType::Direct)
    }

    /// Sets the owning team.
    #[must_use]
    pub fn with_team(mut self, team_id: impl Into<TeamId>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    /// Sets the stored display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Marks the channel archived at the given time.
    #[must_use]
    pub const fn with_delete_at(mut self, delete_at: i64) -> Self {
        self.delete_at = delete_at;
        self
    }

    /// Sets the server-reported time of the last post.
    #[must_use]
    pub const fn with_last_post_at(mut self, last_post_at: i64) -> Self {
        self.last_post_at = last_post_at;
        self
    }

    /// Sets the total number of messages in the channel.
    #[must_use]
    pub const fn with_total_msg_count(mut self, total_msg_count: i64) -> Self {
        self.total_msg_count = total_msg_count;
        self
    }

    /// Returns the channel id.
    #[must_use]
    pub fn id(&self) -> &ChannelId {
        &self.id
    }

    /// Returns the owning team, or `None` for direct and group channels.
    #[must_use]
    pub fn team_id(&self) -> Option<&TeamId> {
        self.team_id.as_ref()
    }

    /// Returns the channel type.
    #[must_use]
    pub const fn channel_type(&self) -> ChannelType {
        self.channel_type
    }

    /// Returns the machine name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display name exactly as stored.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the archive time, `0` while active.
    #[must_use]
    pub const fn delete_at(&self) -> i64 {
        self.delete_at
    }

    /// Returns the server-reported last post time.
    ///
    /// This is not kept current on the client; loaded posts are more accurate.
    #[must_use]
    pub const fn last_post_at(&self) -> i64 {
        self.last_post_at
    }

    /// Returns the total message count.
    #[must_use]
    pub const fn total_msg_count(&self) -> i64 {
        self.total_msg_count
    }

    /// Returns true once the channel has been archived.
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.delete_at != 0
    }

    /// Returns true for direct and group message channels.
    #[must_use]
    pub const fn is_direct_or_group(&self) -> bool {
        self.channel_type.is_direct_or_group()
    }

    /// Returns true if this channel lives in the given team or is team-less.
    #[must_use]
    pub fn is_visible_in_team(&self, team_id: Option<&TeamId>) -> bool {
        match (&self.team_id, team_id) {
            (None, _) => true,
            (Some(own), Some(team)) => own == team,
            (Some(_), None) => false,
        }
    }

    /// Resolves the channel type against the viewing user.
    #[must_use]
    pub fn kind(&self, current_user_id: &UserId) -> ChannelKind<'_> {
        match self.channel_type {
            ChannelType::Open => ChannelKind::Public,
            ChannelType::Private => ChannelKind::Private,
            ChannelType::Direct => ChannelKind::Direct {
                teammate_id: teammate_id_from_channel_name(current_user_id, &self.name),
            },
            ChannelType::Group => ChannelKind::Group {
                participant_usernames: self
                    .display_name
                    .split(GROUP_DISPLAY_NAME_SEPARATOR)
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .collect(),
            },
        }
    }
}

/// Builds the canonical direct channel name for two users.
#[must_use]
pub fn direct_channel_name(user_a: &UserId, user_b: &UserId) -> String {
    if user_a <= user_b {
        format!("{user_a}{DIRECT_NAME_SEPARATOR}{user_b}")
    } else {
        format!("{user_b}{DIRECT_NAME_SEPARATOR}{user_a}")
    }
}

/// Extracts the other participant's id from a direct channel name.
#[must_use]
pub fn teammate_id_from_channel_name(current_user_id: &UserId, name: &str) -> UserId {
    let mut ids = name.splitn(2, DIRECT_NAME_SEPARATOR);
    let first = ids.next().unwrap_or_default();
    let second = ids.next().unwrap_or_default();

    if first == current_user_id.as_str() {
        UserId::from(second)
    } else {
        UserId::from(first)
    }
}
