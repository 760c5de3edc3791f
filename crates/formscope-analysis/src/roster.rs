//! Jersey-number sets with a stable dense ordering.
//!
//! A [`Roster`] keeps jersey numbers sorted and unique so that every player
//! owns a fixed index. Graph tables are sized from the roster and addressed
//! by those indices, which makes "every pair has an entry" a property of the
//! layout rather than something checked at runtime.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("jersey number {number} appears more than once")]
pub struct DuplicateJersey {
    pub number: u32,
}

/// Sorted, duplicate-free set of jersey numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[display("{numbers:?}")]
#[serde(transparent)]
pub struct Roster {
    numbers: Vec<u32>,
}

impl Roster {
    /// Builds a roster from jersey numbers in any order.
    ///
    /// Fails if a number occurs twice, since two players cannot share an
    /// identity within one frame.
    pub fn new<I>(numbers: I) -> Result<Self, DuplicateJersey>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut numbers = numbers.into_iter().collect::<Vec<_>>();
        numbers.sort_unstable();
        if let Some(w) = numbers.windows(2).find(|w| w[0] == w[1]) {
            return Err(DuplicateJersey { number: w[0] });
        }
        Ok(Self { numbers })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Jersey numbers in ascending order.
    #[must_use]
    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }

    /// Dense index of `number`, if it is on this roster.
    #[must_use]
    pub fn index_of(&self, number: u32) -> Option<usize> {
        self.numbers.binary_search(&number).ok()
    }

    #[must_use]
    pub fn number_at(&self, index: usize) -> u32 {
        self.numbers[index]
    }

    #[must_use]
    pub fn to_set(&self) -> BTreeSet<u32> {
        self.numbers.iter().copied().collect()
    }
}

/// Jersey numbers left out of formation measurement, normally goalkeepers.
///
/// A list rather than a single number because a team may change goalkeeper
/// during the window being measured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExcludedRoles(BTreeSet<u32>);

impl ExcludedRoles {
    #[must_use]
    pub fn new<I>(numbers: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self(numbers.into_iter().collect())
    }

    #[must_use]
    pub fn contains(&self, number: u32) -> bool {
        self.0.contains(&number)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_sorts_numbers() {
        let roster = Roster::new([9, 2, 14, 5]).unwrap();
        assert_eq!(roster.numbers(), &[2, 5, 9, 14]);
        assert_eq!(roster.index_of(9), Some(2));
        assert_eq!(roster.index_of(3), None);
        assert_eq!(roster.number_at(3), 14);
        assert_eq!(roster.to_string(), "[2, 5, 9, 14]");
    }

    #[test]
    fn test_roster_rejects_duplicates() {
        let err = Roster::new([4, 8, 4]).unwrap_err();
        assert_eq!(err, DuplicateJersey { number: 4 });
    }

    #[test]
    fn test_roster_equality_ignores_input_order() {
        assert_eq!(Roster::new([3, 1, 2]), Roster::new([2, 3, 1]));
    }

    #[test]
    fn test_excluded_roles() {
        let excluded = ExcludedRoles::new([1, 13]);
        assert!(excluded.contains(13));
        assert!(!excluded.contains(7));
        assert_eq!(excluded.iter().collect::<Vec<_>>(), vec![1, 13]);
    }
}
