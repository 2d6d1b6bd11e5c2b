//! Victim set: the processes targeted for termination.

use std::collections::BTreeSet;

use serde::Serialize;

/// Non-empty, de-duplicated set of PIDs to terminate.
///
/// The only constructor returns `None` for an empty input, so a terminator
/// taking a `&VictimSet` can never be handed zero arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VictimSet(BTreeSet<u32>);

impl VictimSet {
    /// Build a victim set, skipping PID 0 and `exclude`.
    ///
    /// Returns `None` when nothing is left to kill.
    pub fn from_pids<I>(pids: I, exclude: u32) -> Option<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        let set: BTreeSet<u32> = pids
            .into_iter()
            .filter(|&pid| pid != 0 && pid != exclude)
            .collect();

        if set.is_empty() {
            None
        } else {
            Some(Self(set))
        }
    }

    /// Number of victims (always at least one).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.0.contains(&pid)
    }

    /// PIDs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl<'a> IntoIterator for &'a VictimSet {
    type Item = u32;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, u32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_has_no_victims() {
        assert!(VictimSet::from_pids(Vec::new(), 42).is_none());
    }

    #[test]
    fn test_excluded_and_zero_pids_dropped() {
        assert!(VictimSet::from_pids([0, 42], 42).is_none());

        let victims = VictimSet::from_pids([1234, 0, 42, 1234, 99], 42).unwrap();
        assert_eq!(victims.len(), 2);
        assert_eq!(victims.iter().collect::<Vec<_>>(), vec![99, 1234]);
        assert!(!victims.contains(42));
    }
}
