//! Profile indexes and profile search.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::memo::{IdsMemo, Memo, Selector};
use super::sorting::NaturalKey;
use crate::domain::entities::UserProfile;
use crate::domain::state::{GlobalState, UserMap};

pub type UsernameMap = Arc<HashMap<String, Arc<UserProfile>>>;

static USERNAME_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.\-_]+").expect("Invalid regex"));

/// Profiles keyed by username.
#[derive(Debug)]
pub struct ProfilesByUsername {
    memo: Memo<(Arc<UserMap>,), UsernameMap>,
}

impl Default for ProfilesByUsername {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfilesByUsername {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: Memo::new("profiles_by_username"),
        }
    }
}

impl Selector for ProfilesByUsername {
    type Output = UsernameMap;

    fn select(&mut self, state: &GlobalState, (): ()) -> UsernameMap {
        let users = Arc::clone(&state.entities.users.profiles);
        self.memo.get_or_compute((users,), |(users,)| {
            Arc::new(
                users
                    .values()
                    .map(|user| (user.username().to_owned(), Arc::clone(user)))
                    .collect(),
            )
        })
    }
}

fn searchable_terms(user: &UserProfile) -> Vec<String> {
    let username = user.username().to_lowercase();
    let mut terms: Vec<String> = USERNAME_SEPARATORS
        .split(&username)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect();
    terms.push(username.clone());
    let full_name = user.full_name();
    terms.extend(
        [
            user.first_name(),
            user.last_name(),
            full_name.as_str(),
            user.nickname(),
            user.email(),
        ]
        .into_iter()
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase),
    );
    terms
}

/// Profiles where every whitespace-separated word of `term` prefixes one of
/// the profile's names. Sorted by username.
#[must_use]
pub fn search_profiles(
    profiles: &UserMap,
    term: &str,
    exclude_deactivated: bool,
) -> Vec<Arc<UserProfile>> {
    let term = term.trim().to_lowercase();
    let words: Vec<&str> = term.split_whitespace().collect();

    let mut matches: Vec<Arc<UserProfile>> = profiles
        .values()
        .filter(|user| !exclude_deactivated || user.is_active())
        .filter(|user| {
            let terms = searchable_terms(user);
            words
                .iter()
                .all(|word| terms.iter().any(|t| t.starts_with(*word)))
        })
        .cloned()
        .collect();
    matches.sort_by_cached_key(|user| NaturalKey::new(user.username()));
    matches
}

/// Memoized [`search_profiles`].
#[derive(Debug)]
pub struct SearchProfiles {
    memo: IdsMemo<(Arc<UserMap>, String, bool), Arc<UserProfile>>,
}

impl Default for SearchProfiles {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchProfiles {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo: IdsMemo::new("search_profiles"),
        }
    }
}

impl Selector<(&str, bool)> for SearchProfiles {
    type Output = Arc<Vec<Arc<UserProfile>>>;

    fn select(
        &mut self,
        state: &GlobalState,
        (term, exclude_deactivated): (&str, bool),
    ) -> Self::Output {
        let inputs = (
            Arc::clone(&state.entities.users.profiles),
            term.to_owned(),
            exclude_deactivated,
        );
        self.memo
            .get_or_compute(inputs, |(users, term, exclude)| search_profiles(users, term, *exclude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn users() -> GlobalState {
        GlobalState::default().with_profiles([
            UserProfile::new("u1", "john.smith").with_name("John", "Smith"),
            UserProfile::new("u2", "jane_doe").with_nickname("JD"),
            UserProfile::new("u3", "bob").with_email("bob@example.com").with_delete_at(10),
            UserProfile::new("u4", "user10"),
            UserProfile::new("u5", "user2"),
        ])
    }

    fn usernames(found: &[Arc<UserProfile>]) -> Vec<&str> {
        found.iter().map(|u| u.username()).collect()
    }

    #[test_case("smith", &["john.smith"] ; "username part")]
    #[test_case("john sm", &["john.smith"] ; "every word must match")]
    #[test_case("doe", &["jane_doe"] ; "underscore part")]
    #[test_case("jd", &["jane_doe"] ; "nickname")]
    #[test_case("bob@", &["bob"] ; "email")]
    #[test_case("user", &["user2", "user10"] ; "natural username order")]
    #[test_case("zzz", &[] ; "no match")]
    fn test_search(term: &str, expected: &[&str]) {
        let state = users();
        let found = search_profiles(&state.entities.users.profiles, term, false);
        assert_eq!(usernames(&found), expected);
    }

    #[test]
    fn test_search_excludes_deactivated() {
        let state = users();
        assert!(search_profiles(&state.entities.users.profiles, "bob", true).is_empty());
    }

    #[test]
    fn test_search_memoized() {
        let state = users();
        let mut search = SearchProfiles::new();
        let first = search.select(&state, ("jane", false));
        let second = search.select(&state, ("jane", false));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(search.memo.recomputations(), 1);
    }

    #[test]
    fn test_profiles_by_username() {
        let state = users();
        let mut index = ProfilesByUsername::new();
        let map = index.select(&state, ());
        assert_eq!(map["jane_doe"].id().as_str(), "u2");
        assert!(Arc::ptr_eq(&map, &index.select(&state, ())));
    }
}
