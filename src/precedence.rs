use bitvec::prelude::*;

use crate::priority::TeamPriority;
use crate::TeamId;

/// `get(k, i, j)` is true when team `k` wants to meet `i` strictly before `j`.
///
/// Stored as a dense `N x N x N` bit array, so every triple of team ids has an explicit value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecedenceArray {
    num_teams: usize,
    bits: BitVec,
}

impl PrecedenceArray {
    pub fn from_team_priority(team_priority: &TeamPriority) -> Self {
        let num_teams = team_priority.num_teams();
        let mut array = PrecedenceArray {
            num_teams,
            bits: bitvec![0; num_teams * num_teams * num_teams],
        };
        for (team_k, seq) in team_priority.iter() {
            for (pos, team_i) in seq.iter().copied().enumerate() {
                for team_j in seq[pos + 1..].iter().copied() {
                    let idx = array.index(team_k, team_i, team_j);
                    array.bits.set(idx, true);
                }
            }
        }
        array
    }

    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    fn index(&self, k: TeamId, i: TeamId, j: TeamId) -> usize {
        let n = self.num_teams;
        let team_ids = 1..=n;
        assert!(
            team_ids.contains(&k) && team_ids.contains(&i) && team_ids.contains(&j),
            "team ids ({}, {}, {}) outside 1..={}",
            k,
            i,
            j,
            n
        );
        ((k - 1) * n + (i - 1)) * n + (j - 1)
    }

    /// Team ids are 1-based.
    ///
    /// # Panics
    ///
    /// If any of `k`, `i`, `j` is outside `1..=N`.
    pub fn get(&self, k: TeamId, i: TeamId, j: TeamId) -> bool {
        self.bits[self.index(k, i, j)]
    }

    /// Number of entries, always `N^3`.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// How many opponents team `k` wants to meet before `j`.
    ///
    /// # Panics
    ///
    /// If `k` or `j` is outside `1..=N`.
    pub fn predecessors(&self, k: TeamId, j: TeamId) -> usize {
        (1..=self.num_teams).filter(|i| self.get(k, *i, j)).count()
    }

    /// Number of set entries for team `k`.
    ///
    /// # Panics
    ///
    /// If `k` is outside `1..=N`.
    pub fn count_for_team(&self, k: TeamId) -> usize {
        let n = self.num_teams;
        assert!(k >= 1 && k <= n, "team id {} outside 1..={}", k, n);
        let start = (k - 1) * n * n;
        self.bits[start..start + n * n].count_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::priority::generate_team_priorities;

    #[test]
    fn marks_every_later_opponent() {
        let tp = fixtures::five_rounds();
        let array = PrecedenceArray::from_team_priority(&tp);

        // team 3: (2, 1, 4)
        assert!(array.get(3, 2, 1));
        assert!(array.get(3, 2, 4));
        assert!(array.get(3, 1, 4));
        assert!(!array.get(3, 1, 2));
        assert!(!array.get(3, 4, 2));
        assert!(!array.get(3, 3, 3));
        assert!(!array.get(3, 3, 1));

        assert_eq!(array.predecessors(3, 2), 0);
        assert_eq!(array.predecessors(3, 1), 1);
        assert_eq!(array.predecessors(3, 4), 2);
    }

    #[test]
    #[should_panic(expected = "outside 1..=4")]
    fn team_zero_is_out_of_range() {
        PrecedenceArray::from_team_priority(&fixtures::five_rounds()).get(0, 1, 2);
    }

    #[test]
    #[should_panic(expected = "outside 1..=4")]
    fn team_past_the_end_is_out_of_range() {
        // Without the check (1, 1, 5) would alias the entry (1, 2, 1).
        PrecedenceArray::from_team_priority(&fixtures::five_rounds()).predecessors(1, 5);
    }

    #[test]
    fn size_and_density() {
        for n in 2..=4 {
            for tp in generate_team_priorities(n, n.saturating_sub(2)).unwrap() {
                let array = PrecedenceArray::from_team_priority(&tp);
                assert_eq!(array.len(), n * n * n);
                for k in tp.team_ids() {
                    assert_eq!(array.count_for_team(k), (n - 1) * (n - 2) / 2);
                }
            }
        }
    }
}
