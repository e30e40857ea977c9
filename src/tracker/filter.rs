//! Tracked-function filter policy.
//!
//! The filter decides, once per enter event, whether an invocation gets a
//! call frame at all. The untracked path must stay O(1) with no allocation
//! so instrumenting a hot interpreter loop stays cheap.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Which function identities the tracker records.
///
/// **Public** - configuration input, replaceable at runtime
///
/// Clones are cheap so every per-thread tracker can carry the same policy.
#[derive(Clone)]
pub enum FilterPolicy {
    /// Track every function observed
    All,

    /// Track exactly the named functions. An empty set tracks nothing.
    Names(HashSet<String>),

    /// Track functions the predicate accepts
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl FilterPolicy {
    /// Build a name-set policy from an iterator of names
    ///
    /// **Public** - convenience constructor used by the CLI
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    /// Check whether an identity is tracked
    pub fn is_tracked(&self, identity: &str) -> bool {
        match self {
            Self::All => true,
            Self::Names(names) => names.contains(identity),
            Self::Predicate(pred) => pred(identity),
        }
    }
}

impl fmt::Debug for FilterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "FilterPolicy::All"),
            Self::Names(names) => f.debug_tuple("FilterPolicy::Names").field(names).finish(),
            Self::Predicate(_) => write!(f, "FilterPolicy::Predicate(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tracks_everything() {
        let policy = FilterPolicy::All;
        assert!(policy.is_tracked("fib"));
        assert!(policy.is_tracked(""));
    }

    #[test]
    fn test_names_tracks_only_members() {
        let policy = FilterPolicy::names(["fib", "main"]);
        assert!(policy.is_tracked("fib"));
        assert!(policy.is_tracked("main"));
        assert!(!policy.is_tracked("helper"));
    }

    #[test]
    fn test_empty_name_set_tracks_nothing() {
        let policy = FilterPolicy::names(Vec::<String>::new());
        assert!(!policy.is_tracked("fib"));
    }

    #[test]
    fn test_predicate_policy() {
        let policy = FilterPolicy::Predicate(Arc::new(|name| name.starts_with("fib")));
        assert!(policy.is_tracked("fib"));
        assert!(policy.is_tracked("fib_helper"));
        assert!(!policy.is_tracked("main"));
    }
}
