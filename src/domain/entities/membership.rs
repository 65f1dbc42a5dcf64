//! Channel membership entity.

use serde::{Deserialize, Serialize};

use super::{Channel, ChannelId, UserId};

/// Controls which messages make a channel unread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkUnread {
    /// Every new message marks the channel unread.
    #[default]
    All,
    /// Only mentions mark the channel unread. Such channels are treated as muted.
    Mention,
}

/// Per-membership notification settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyProps {
    /// Mark-unread mode.
    #[serde(default)]
    pub mark_unread: MarkUnread,
}

/// The current user's membership in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMembership {
    /// Channel id.
    pub channel_id: ChannelId,
    /// Member user id.
    pub user_id: UserId,
    /// Number of messages the member has read.
    #[serde(default)]
    pub msg_count: i64,
    /// Number of unread mentions.
    #[serde(default)]
    pub mention_count: i64,
    /// Notification settings.
    #[serde(default)]
    pub notify_props: NotifyProps,
    /// Last time the member viewed the channel.
    #[serde(default)]
    pub last_viewed_at: i64,
    /// Space-separated role names.
    #[serde(default)]
    pub roles: String,
}

impl ChannelMembership {
    /// Creates an empty membership.
    #[must_use]
    pub fn new(channel_id: impl Into<ChannelId>, user_id: impl Into<UserId>) -> Self {
        Self {
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            msg_count: 0,
            mention_count: 0,
            notify_props: NotifyProps::default(),
            last_viewed_at: 0,
            roles: String::new(),
        }
    }

    /// Sets the read message count.
    #[must_use]
    pub const fn with_msg_count(mut self, count: i64) -> Self {
        self.msg_count = count;
        self
    }

    /// Sets the mention count.
    #[must_use]
    pub const fn with_mention_count(mut self, count: i64) -> Self {
        self.mention_count = count;
        self
    }

    /// Sets the mark-unread mode.
    #[must_use]
    pub const fn with_mark_unread(mut self, mark_unread: MarkUnread) -> Self {
        self.notify_props.mark_unread = mark_unread;
        self
    }

    /// Sets the last viewed time.
    #[must_use]
    pub const fn with_last_viewed_at(mut self, last_viewed_at: i64) -> Self {
        self.last_viewed_at = last_viewed_at;
        self
    }

    /// Sets the role string.
    #[must_use]
    pub fn with_roles(mut self, roles: impl Into<String>) -> Self {
        self.roles = roles.into();
        self
    }

    /// Returns true if the member only wants to hear about mentions.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.notify_props.mark_unread == MarkUnread::Mention
    }

    /// Returns how many messages in `channel` the member has not read.
    #[must_use]
    pub const fn unread_messages(&self, channel: &Channel) -> i64 {
        channel.total_msg_count() - self.msg_count
    }

    /// Returns true if the role string contains `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.split_whitespace().any(|r| r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ChannelType;

    #[test]
    fn test_unread_messages() {
        let channel = Channel::new("c1", "c1", ChannelType::Open).with_total_msg_count(10);
        let member = ChannelMembership::new("c1", "u1").with_msg_count(7);
        assert_eq!(member.unread_messages(&channel), 3);
    }

    #[test]
    fn test_muted_from_mark_unread() {
        let member = ChannelMembership::new("c1", "u1").with_mark_unread(MarkUnread::Mention);
        assert!(member.is_muted());
        assert!(!ChannelMembership::new("c1", "u1").is_muted());
    }

    #[test]
    fn test_notify_props_deserialize() {
        let json = r#"{"channel_id": "c1", "user_id": "u1", "notify_props": {"mark_unread": "mention"}}"#;
        let member: ChannelMembership = serde_json::from_str(json).unwrap();
        assert!(member.is_muted());
    }

    #[test]
    fn test_has_role() {
        let member = ChannelMembership::new("c1", "u1").with_roles("channel_user channel_admin");
        assert!(member.has_role("channel_admin"));
        assert!(!member.has_role("channel"));
    }
}
