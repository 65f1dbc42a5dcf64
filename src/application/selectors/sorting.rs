//! Channel ordering.
//!
//! Names compare case-insensitively with digit runs compared by value, so
//! "Channel 2" sorts before "Channel 10". Muted channels always sort after
//! unmuted ones. Recency uses the newest known post of each channel.

use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::Arc;

use super::ChannelList;
use super::channels::is_channel_muted;
use super::display_name::{DisplayNameContext, channel_display_name};
use super::memo::{Memo, Selector};
use super::posts::get_channel_last_post_time;
use super::preferences::get_teammate_name_display_setting;
use super::users::ProfilesByUsername;
use crate::domain::entities::{CategorySorting, Channel, NameFormat, UserId, UserProfile};
use crate::domain::state::{GlobalState, MembershipMap, PostMap, PostsInChannelMap, UserMap};

fn fold_char(c: char) -> char {
    match c {
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => c,
    }
}

fn fold(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).map(fold_char).collect()
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn cmp_folded(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let ord = cmp_digit_runs(&take_digits(&mut a), &take_digits(&mut b));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

/// Case and accent insensitive, numeric-aware comparison.
///
/// Names that only differ by case or accents fall back to a plain comparison
/// so the order stays total.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    cmp_folded(&fold(a), &fold(b)).then_with(|| a.cmp(b))
}

/// Precomputed sort key for [`natural_cmp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalKey {
    folded: String,
    raw: String,
}

impl NaturalKey {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            folded: fold(&raw),
            raw,
        }
    }
}

impl Ord for NaturalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_folded(&self.folded, &other.folded).then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for NaturalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns `channels` itself when `sorted` has the same order.
pub(super) fn same_or_new(channels: &ChannelList, sorted: Vec<Arc<Channel>>) -> ChannelList {
    let unchanged = channels
        .iter()
        .zip(&sorted)
        .all(|(a, b)| Arc::ptr_eq(a, b));
    if unchanged {
        Arc::clone(channels)
    } else {
        Arc::new(sorted)
    }
}

fn sort_by_name(
    channels: &ChannelList,
    members: &MembershipMap,
    name_of: impl Fn(&Channel) -> String,
) -> ChannelList {
    let mut sorted = channels.to_vec();
    sorted.sort_by_cached_key(|channel| {
        (
            is_channel_muted(members.get(channel.id()).map(Arc::as_ref)),
            NaturalKey::new(name_of(channel)),
        )
    });
    same_or_new(channels, sorted)
}

/// Sorts by stored display name, muted channels last.
#[derive(Debug)]
pub struct SortChannelsByName {
    memo: Memo<(ChannelList, Arc<MembershipMap>), ChannelList>,
}

impl Default for SortChannelsByName {
    fn default() -> Self {
        Self::new()
    }
}

impl SortChannelsByName {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: Memo::new("sort_channels_by_name"),
        }
    }
}

impl Selector<ChannelList> for SortChannelsByName {
    type Output = ChannelList;

    fn select(&mut self, state: &GlobalState, channels: ChannelList) -> ChannelList {
        let members = Arc::clone(&state.entities.channels.my_members);
        self.memo.get_or_compute((channels, members), |(channels, members)| {
            sort_by_name(channels, members, |channel| channel.display_name().to_owned())
        })
    }
}

type NameWithDmsInputs = (
    ChannelList,
    Arc<MembershipMap>,
    Arc<UserMap>,
    Arc<HashMap<String, Arc<UserProfile>>>,
    Option<UserId>,
    NameFormat,
);

/// Sorts by display name, resolving direct and group channel names from the
/// participants' current profiles. Muted channels last.
#[derive(Debug)]
pub struct SortChannelsByNameWithDms {
    profiles_by_username: ProfilesByUsername,
    memo: Memo<NameWithDmsInputs, ChannelList>,
}

impl Default for SortChannelsByNameWithDms {
    fn default() -> Self {
        Self::new()
    }
}

impl SortChannelsByNameWithDms {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            profiles_by_username: ProfilesByUsername::new(),
            memo: Memo::new("sort_channels_by_name_with_dms"),
        }
    }
}

impl Selector<ChannelList> for SortChannelsByNameWithDms {
    type Output = ChannelList;

    fn select(&mut self, state: &GlobalState, channels: ChannelList) -> ChannelList {
        let inputs = (
            channels,
            Arc::clone(&state.entities.channels.my_members),
            Arc::clone(&state.entities.users.profiles),
            self.profiles_by_username.select(state, ()),
            state.entities.users.current_user_id.clone(),
            get_teammate_name_display_setting(state),
        );
        self.memo.get_or_compute(
            inputs,
            |(channels, members, users, by_username, current_user_id, name_format)| {
                let ctx = DisplayNameContext {
                    current_user_id: current_user_id.as_ref(),
                    users,
                    users_by_username: by_username,
                    name_format: *name_format,
                };
                sort_by_name(channels, members, |channel| channel_display_name(channel, &ctx))
            },
        )
    }
}

/// Sorts by latest activity, newest first. Ties keep their input order.
#[derive(Debug)]
pub struct SortChannelsByRecency {
    memo: Memo<(ChannelList, Arc<PostsInChannelMap>, Arc<PostMap>), ChannelList>,
}

impl Default for SortChannelsByRecency {
    fn default() -> Self {
        Self::new()
    }
}

impl SortChannelsByRecency {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: Memo::new("sort_channels_by_recency"),
        }
    }
}

impl Selector<ChannelList> for SortChannelsByRecency {
    type Output = ChannelList;

    fn select(&mut self, state: &GlobalState, channels: ChannelList) -> ChannelList {
        let inputs = (
            channels,
            Arc::clone(&state.entities.posts.posts_in_channel),
            Arc::clone(&state.entities.posts.posts),
        );
        self.memo.get_or_compute(inputs, |(channels, blocks, posts)| {
            let mut sorted = channels.to_vec();
            sorted.sort_by_cached_key(|channel| {
                Reverse(get_channel_last_post_time(channel, blocks, posts))
            });
            same_or_new(channels, sorted)
        })
    }
}

/// Orders a category's channels according to its sorting mode.
#[derive(Debug, Default)]
pub struct SortChannels {
    by_name: SortChannelsByName,
    by_name_with_dms: SortChannelsByNameWithDms,
    by_recency: SortChannelsByRecency,
}

impl SortChannels {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            by_name: SortChannelsByName::new(),
            by_name_with_dms: SortChannelsByNameWithDms::new(),
            by_recency: SortChannelsByRecency::new(),
        }
    }
}

impl Selector<(ChannelList, CategorySorting)> for SortChannels {
    type Output = ChannelList;

    fn select(
        &mut self,
        state: &GlobalState,
        (channels, sorting): (ChannelList, CategorySorting),
    ) -> ChannelList {
        match sorting {
            CategorySorting::Manual => channels,
            CategorySorting::Recency => self.by_recency.select(state, channels),
            CategorySorting::Default | CategorySorting::Alphabetical => {
                if channels.iter().any(|channel| channel.is_direct_or_group()) {
                    self.by_name_with_dms.select(state, channels)
                } else {
                    self.by_name.select(state, channels)
                }
            }
        }
    }
}
