#![forbid(unsafe_code)]

//! Winner selection for a registry snapshot.
//!
//! Several page regions may want the same dock slot. The policy is
//! deterministic: among enabled entries, the highest `priority` wins and
//! ties go to the most recent upsert.

use crate::entry::Candidate;

/// Pick the active entry, or `None` if nothing is enabled.
///
/// Disabled entries never win, even when they are the only entries.
#[must_use]
pub fn select_active<'a, E, I>(entries: I) -> Option<&'a E>
where
    E: Candidate + 'a,
    I: IntoIterator<Item = &'a E>,
{
    entries
        .into_iter()
        .filter(|entry| entry.enabled())
        .max_by_key(|entry| (entry.priority(), entry.updated_at()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Stub {
        name: &'static str,
        enabled: bool,
        priority: i32,
        updated_at: u64,
    }

    impl Candidate for Stub {
        fn enabled(&self) -> bool {
            self.enabled
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn updated_at(&self) -> u64 {
            self.updated_at
        }
    }

    fn stub(name: &'static str, enabled: bool, priority: i32, updated_at: u64) -> Stub {
        Stub {
            name,
            enabled,
            priority,
            updated_at,
        }
    }

    #[test]
    fn empty_registry_selects_nothing() {
        let entries: Vec<Stub> = Vec::new();
        assert_eq!(select_active(&entries), None);
    }

    #[test]
    fn disabled_entries_never_win() {
        let entries = vec![stub("a", false, 10, 5), stub("b", false, 0, 6)];
        assert_eq!(select_active(&entries), None);
    }

    #[test]
    fn priority_beats_recency() {
        let entries = vec![stub("old-high", true, 5, 1), stub("new-low", true, 1, 9)];
        assert_eq!(select_active(&entries).map(|e| e.name), Some("old-high"));
    }

    #[test]
    fn recency_breaks_priority_ties() {
        let entries = vec![
            stub("first", true, 2, 3),
            stub("second", true, 2, 7),
            stub("disabled-newest", false, 2, 11),
        ];
        assert_eq!(select_active(&entries).map(|e| e.name), Some("second"));
    }

    #[test]
    fn negative_priorities_are_ranked() {
        let entries = vec![stub("low", true, -3, 9), stub("lower", true, -10, 10)];
        assert_eq!(select_active(&entries).map(|e| e.name), Some("low"));
    }
}
