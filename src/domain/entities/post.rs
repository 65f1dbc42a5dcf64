//! Post entity and per-channel post order blocks.

use serde::{Deserialize, Serialize};

use super::{ChannelId, PostId, UserId};
use crate::domain::serde_utils::empty_string_as_none;

/// A single message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Post id.
    pub id: PostId,
    /// Channel the post belongs to.
    pub channel_id: ChannelId,
    /// Author.
    #[serde(default)]
    pub user_id: UserId,
    /// Thread root, `None` for root posts.
    #[serde(default, with = "empty_string_as_none")]
    pub root_id: Option<PostId>,
    /// Creation time in milliseconds.
    #[serde(default)]
    pub create_at: i64,
    /// Deletion time, `0` while present.
    #[serde(default)]
    pub delete_at: i64,
    /// Message text.
    #[serde(default)]
    pub message: String,
}

impl Post {
    /// Creates a root post.
    #[must_use]
    pub fn new(id: impl Into<PostId>, channel_id: impl Into<ChannelId>, create_at: i64) -> Self {
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
            user_id: UserId::default(),
            root_id: None,
            create_at,
            delete_at: 0,
            message: String::new(),
        }
    }

    /// Makes this post a reply in the given thread.
    #[must_use]
    pub fn in_thread(mut self, root_id: impl Into<PostId>) -> Self {
        self.root_id = Some(root_id.into());
        self
    }

    /// Returns true if the post was deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.delete_at != 0
    }
}

/// A contiguous run of loaded post ids for one channel, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostOrderBlock {
    /// Post ids, newest first.
    pub order: Vec<PostId>,
    /// The block reaches the newest post in the channel.
    #[serde(default)]
    pub recent: bool,
    /// The block reaches the first post in the channel.
    #[serde(default)]
    pub oldest: bool,
}

impl PostOrderBlock {
    /// Creates a block that reaches the newest post.
    #[must_use]
    pub fn recent<I, T>(order: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PostId>,
    {
        Self {
            order: order.into_iter().map(Into::into).collect(),
            recent: true,
            oldest: false,
        }
    }

    /// Returns the newest post id in the block.
    #[must_use]
    pub fn newest(&self) -> Option<&PostId> {
        self.order.first()
    }
}
