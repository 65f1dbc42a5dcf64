//! Single-slot memoization.
//!
//! A selector keeps the inputs and output of its last computation. When every
//! input is *identical* to last time (pointer identity for shared
//! collections, value equality for ids and flags) the cached output is
//! returned as is, so downstream consumers can skip work by comparing `Arc`
//! pointers.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tracing::trace;

use crate::domain::entities::{
    CategoryId, CategorySorting, CategoryType, ChannelGrouping, ChannelId, LegacySorting,
    NameFormat, PostId, TeamId, UserId,
};
use crate::domain::state::GlobalState;

/// Identity comparison for selector inputs.
pub trait Identity {
    /// Returns true if `other` is the same input as `self`.
    fn same(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Identity for Arc<T> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: Identity> Identity for Option<T> {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same(b),
            (None, None) => true,
            _ => false,
        }
    }
}

macro_rules! value_identity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identity for $ty {
                fn same(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

value_identity!(
    bool,
    i64,
    u32,
    usize,
    String,
    &'static str,
    ChannelId,
    UserId,
    TeamId,
    CategoryId,
    PostId,
    CategoryType,
    CategorySorting,
    NameFormat,
    ChannelGrouping,
    LegacySorting,
);

impl Identity for () {
    fn same(&self, _other: &Self) -> bool {
        true
    }
}

macro_rules! tuple_identity {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Identity),+> Identity for ($($name,)+) {
            fn same(&self, other: &Self) -> bool {
                $(self.$idx.same(&other.$idx))&&+
            }
        }
    };
}

tuple_identity!(A: 0);
tuple_identity!(A: 0, B: 1);
tuple_identity!(A: 0, B: 1, C: 2);
tuple_identity!(A: 0, B: 1, C: 2, D: 3);
tuple_identity!(A: 0, B: 1, C: 2, D: 3, E: 4);
tuple_identity!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
tuple_identity!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
tuple_identity!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
tuple_identity!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8);
tuple_identity!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9);

/// Element-wise identity of two collections.
pub trait ShallowEq {
    /// Returns true if both hold identical elements in the same order.
    fn shallow_eq(&self, other: &Self) -> bool;
}

impl<T: Identity> ShallowEq for [T] {
    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.same(b))
    }
}

impl<T: Identity> ShallowEq for Vec<T> {
    fn shallow_eq(&self, other: &Self) -> bool {
        self.as_slice().shallow_eq(other.as_slice())
    }
}

impl<K: Eq + Hash, V: Identity> ShallowEq for HashMap<K, V> {
    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|o| value.same(o)))
    }
}

impl<T: ShallowEq + ?Sized> ShallowEq for Arc<T> {
    fn shallow_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other) || (**self).shallow_eq(other)
    }
}

/// A selector evaluated against a state snapshot and extra arguments.
///
/// Every instance owns its own cache. Two call sites that want independent
/// memoization need two instances.
pub trait Selector<A = ()> {
    /// Value produced by the selector.
    type Output;

    /// Evaluates the selector.
    fn select(&mut self, state: &GlobalState, args: A) -> Self::Output;
}

/// Single-slot cache of the last inputs and output.
#[derive(Debug)]
pub struct Memo<I, O> {
    name: &'static str,
    last: Option<(I, O)>,
    recomputations: usize,
}

impl<I: Identity, O: Clone> Memo<I, O> {
    /// Creates an empty cache. The name shows up in trace logs.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            last: None,
            recomputations: 0,
        }
    }

    /// Returns the cached output if `inputs` are identical to the last call,
    /// otherwise computes, caches, and returns a new output.
    pub fn get_or_compute(&mut self, inputs: I, compute: impl FnOnce(&I) -> O) -> O {
        if let Some((last_inputs, last_output)) = &self.last
            && last_inputs.same(&inputs)
        {
            return last_output.clone();
        }

        self.recomputations += 1;
        trace!(
            selector = self.name,
            recomputations = self.recomputations,
            "recomputing"
        );
        let output = compute(&inputs);
        self.last = Some((inputs, output.clone()));
        output
    }

    /// Returns the last output, if any.
    #[must_use]
    pub fn last_output(&self) -> Option<&O> {
        self.last.as_ref().map(|(_, output)| output)
    }

    /// Returns how many times the output was computed.
    #[must_use]
    pub const fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// Returns the selector name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Drops the cached entry.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Memo for selectors that build a fresh list on every computation.
///
/// When a recomputed list holds the same elements as the previous output, the
/// previous `Arc` is returned instead.
#[derive(Debug)]
pub struct IdsMemo<I, T> {
    memo: Memo<I, Arc<Vec<T>>>,
}

impl<I: Identity, T: Identity> IdsMemo<I, T> {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            memo: Memo::new(name),
        }
    }

    /// Like [`Memo::get_or_compute`], with a shallow check on the new list.
    pub fn get_or_compute(&mut self, inputs: I, compute: impl FnOnce(&I) -> Vec<T>) -> Arc<Vec<T>> {
        let previous = self.memo.last_output().cloned();
        self.memo.get_or_compute(inputs, |inputs| {
            let next = compute(inputs);
            match previous {
                Some(previous) if previous.as_slice().shallow_eq(&next) => previous,
                _ => Arc::new(next),
            }
        })
    }

    /// Returns how many times the list was rebuilt.
    #[must_use]
    pub const fn recomputations(&self) -> usize {
        self.memo.recomputations()
    }
}

/// Keeps the previous value while new values are shallow-equal to it.
#[derive(Debug)]
pub struct Stable<T> {
    last: Option<T>,
}

impl<T> Default for Stable<T> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<T: ShallowEq + Clone> Stable<T> {
    /// Creates an empty holder.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Returns the previous value if `next` is shallow-equal to it, else `next`.
    pub fn settle(&mut self, next: T) -> T {
        if let Some(last) = &self.last
            && last.shallow_eq(&next)
        {
            return last.clone();
        }
        self.last = Some(next.clone());
        next
    }
}

type InputFn<A, I> = Box<dyn Fn(&GlobalState, &A) -> I>;
type ComputeFn<I, O> = Box<dyn Fn(&I) -> O>;

/// Selector assembled from an input function and a compute function.
///
/// The input function projects everything the computation depends on out of
/// the state; the compute function only runs when that projection changes.
pub struct MemoSelector<A, I, O> {
    inputs: InputFn<A, I>,
    compute: ComputeFn<I, O>,
    memo: Memo<I, O>,
}

impl<A, I: Identity, O: Clone> MemoSelector<A, I, O> {
    /// Creates a named selector.
    pub fn new(
        name: &'static str,
        inputs: impl Fn(&GlobalState, &A) -> I + 'static,
        compute: impl Fn(&I) -> O + 'static,
    ) -> Self {
        Self {
            inputs: Box::new(inputs),
            compute: Box::new(compute),
            memo: Memo::new(name),
        }
    }

    /// Returns how many times the output was computed.
    #[must_use]
    pub const fn recomputations(&self) -> usize {
        self.memo.recomputations()
    }
}

impl<A, I: Identity, O: Clone> Selector<A> for MemoSelector<A, I, O> {
    type Output = O;

    fn select(&mut self, state: &GlobalState, args: A) -> O {
        let inputs = (self.inputs)(state, &args);
        let compute = &self.compute;
        self.memo.get_or_compute(inputs, |inputs| compute(inputs))
    }
}

impl<A, I, O> std::fmt::Debug for MemoSelector<A, I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoSelector")
            .field("name", &self.memo.name)
            .field("recomputations", &self.memo.recomputations)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Channel, ChannelType};

    #[test]
    fn test_memo_returns_cached_output_for_identical_inputs() {
        let mut memo: Memo<(Arc<Vec<i64>>, bool), Arc<Vec<i64>>> = Memo::new("double");
        let input = Arc::new(vec![1, 2, 3]);

        let first = memo.get_or_compute((Arc::clone(&input), true), |(v, _)| {
            Arc::new(v.iter().map(|x| x * 2).collect())
        });
        let second = memo.get_or_compute((Arc::clone(&input), true), |_| unreachable!());

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(memo.recomputations(), 1);
    }

    #[test]
    fn test_memo_recomputes_on_new_arc_with_same_content() {
        let mut memo: Memo<(Arc<Vec<i64>>,), usize> = Memo::new("len");
        memo.get_or_compute((Arc::new(vec![1]),), |(v,)| v.len());
        memo.get_or_compute((Arc::new(vec![1]),), |(v,)| v.len());
        assert_eq!(memo.recomputations(), 2);
    }

    #[test]
    fn test_memo_single_slot_evicts_previous() {
        let mut memo: Memo<(i64,), i64> = Memo::new("square");
        memo.get_or_compute((2,), |(x,)| x * x);
        memo.get_or_compute((3,), |(x,)| x * x);
        memo.get_or_compute((2,), |(x,)| x * x);
        assert_eq!(memo.recomputations(), 3);
    }

    #[test]
    fn test_ids_memo_keeps_previous_list_when_elements_match() {
        let mut memo: IdsMemo<(Arc<Vec<ChannelId>>,), ChannelId> = IdsMemo::new("ids");
        let first = memo.get_or_compute((Arc::new(vec![ChannelId::from("a")]),), |(v,)| {
            v.iter().cloned().collect()
        });
        let second = memo.get_or_compute((Arc::new(vec![ChannelId::from("a")]),), |(v,)| {
            v.iter().cloned().collect()
        });

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(memo.recomputations(), 2);
    }

    #[test]
    fn test_ids_memo_compares_arc_elements_by_pointer() {
        let channel = Arc::new(Channel::new("c1", "c1", ChannelType::Open));
        let copy = Arc::new(Channel::new("c1", "c1", ChannelType::Open));
        let mut memo: IdsMemo<(usize,), Arc<Channel>> = IdsMemo::new("channels");

        let first = memo.get_or_compute((1,), |_| vec![Arc::clone(&channel)]);
        let second = memo.get_or_compute((2,), |_| vec![Arc::clone(&channel)]);
        let third = memo.get_or_compute((3,), |_| vec![Arc::clone(&copy)]);

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&second, &third));
    }

    #[test]
    fn test_stable_settles_on_shallow_equal_maps() {
        let list = Arc::new(vec![ChannelId::from("a")]);
        let mut stable: Stable<Arc<HashMap<CategoryId, Arc<Vec<ChannelId>>>>> = Stable::new();

        let first = stable.settle(Arc::new(HashMap::from([(
            CategoryId::from("cat"),
            Arc::clone(&list),
        )])));
        let second = stable.settle(Arc::new(HashMap::from([(
            CategoryId::from("cat"),
            Arc::clone(&list),
        )])));

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_memo_selector_tracks_input_projection() {
        let mut selector = MemoSelector::new(
            "channel_count",
            |state: &GlobalState, _args: &()| Arc::clone(&state.entities.channels.channels),
            |channels| channels.len(),
        );
        let state =
            GlobalState::default().with_channels([Channel::new("c1", "c1", ChannelType::Open)]);
        let unrelated = state.clone().with_current_channel("c1");

        assert_eq!(selector.select(&state, ()), 1);
        assert_eq!(selector.select(&unrelated, ()), 1);
        assert_eq!(selector.recomputations(), 1);
    }
}
