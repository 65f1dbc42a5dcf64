//! Post lookups used for recency ordering and thread views.

use std::collections::HashMap;
use std::sync::Arc;

use super::memo::{IdsMemo, Memo, Selector};
use crate::domain::entities::{Channel, ChannelId, Post, PostId};
use crate::domain::state::{GlobalState, PostMap, PostsInChannelMap};

/// Newest loaded post of a channel, read from its recent block.
#[must_use]
pub fn get_last_loaded_post<'a>(
    posts_in_channel: &PostsInChannelMap,
    posts: &'a PostMap,
    channel_id: &ChannelId,
) -> Option<&'a Arc<Post>> {
    posts_in_channel
        .get(channel_id)?
        .iter()
        .find(|block| block.recent)?
        .newest()
        .and_then(|post_id| posts.get(post_id))
}

/// Latest activity in a channel.
///
/// `last_post_at` is not kept live on the client, so a loaded post that is
/// newer wins.
#[must_use]
pub fn get_channel_last_post_time(
    channel: &Channel,
    posts_in_channel: &PostsInChannelMap,
    posts: &PostMap,
) -> i64 {
    get_last_loaded_post(posts_in_channel, posts, channel.id())
        .map_or(channel.last_post_at(), |post| {
            post.create_at.max(channel.last_post_at())
        })
}

pub type LastPostMap = Arc<HashMap<ChannelId, Arc<Post>>>;

/// Newest loaded post of every channel that has a recent block.
#[derive(Debug)]
pub struct LastPostPerChannel {
    memo: Memo<(Arc<PostsInChannelMap>, Arc<PostMap>), LastPostMap>,
}

impl Default for LastPostPerChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl LastPostPerChannel {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: Memo::new("last_post_per_channel"),
        }
    }
}

impl Selector for LastPostPerChannel {
    type Output = LastPostMap;

    fn select(&mut self, state: &GlobalState, (): ()) -> LastPostMap {
        let inputs = (
            Arc::clone(&state.entities.posts.posts_in_channel),
            Arc::clone(&state.entities.posts.posts),
        );
        self.memo.get_or_compute(inputs, |(blocks, posts)| {
            Arc::new(
                blocks
                    .keys()
                    .filter_map(|channel_id| {
                        get_last_loaded_post(blocks, posts, channel_id)
                            .map(|post| (channel_id.clone(), Arc::clone(post)))
                    })
                    .collect(),
            )
        })
    }
}

/// Root post and its replies, newest first.
#[derive(Debug)]
pub struct PostsInThread {
    memo: IdsMemo<(Arc<PostMap>, PostId), Arc<Post>>,
}

impl Default for PostsInThread {
    fn default() -> Self {
        Self::new()
    }
}

impl PostsInThread {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: IdsMemo::new("posts_in_thread"),
        }
    }
}

impl Selector<&PostId> for PostsInThread {
    type Output = Arc<Vec<Arc<Post>>>;

    fn select(&mut self, state: &GlobalState, root_id: &PostId) -> Self::Output {
        let inputs = (Arc::clone(&state.entities.posts.posts), root_id.clone());
        self.memo.get_or_compute(inputs, |(posts, root_id)| {
            let mut thread: Vec<Arc<Post>> = posts
                .values()
                .filter(|post| &post.id == root_id || post.root_id.as_ref() == Some(root_id))
                .cloned()
                .collect();
            thread.sort_by(|a, b| b.create_at.cmp(&a.create_at).then_with(|| a.id.cmp(&b.id)));
            thread
        })
    }
}
