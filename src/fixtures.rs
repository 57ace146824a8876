use crate::priority::TeamPriority;
use crate::TeamId;

pub fn priority(seqs: &[&[TeamId]]) -> TeamPriority {
    TeamPriority::from_sequences(seqs.iter().map(|s| s.to_vec()).collect()).unwrap()
}

/// Needs five rounds, eight byes.
pub fn five_rounds() -> TeamPriority {
    priority(&[&[2, 3, 4], &[1, 3, 4], &[2, 1, 4], &[2, 3, 1]])
}

/// Needs six rounds, twelve byes.
pub fn six_rounds() -> TeamPriority {
    priority(&[&[2, 3, 4], &[1, 4, 3], &[2, 1, 4], &[2, 3, 1]])
}

/// Fully compatible: three rounds, no byes.
pub fn three_rounds() -> TeamPriority {
    priority(&[&[2, 3, 4], &[1, 4, 3], &[4, 1, 2], &[3, 2, 1]])
}

/// The precedence graph has the cycle (2,3) -> (2,4) -> (3,4) -> (2,3).
pub fn cyclic() -> TeamPriority {
    priority(&[&[2, 3, 4], &[1, 3, 4], &[1, 4, 2], &[1, 2, 3]])
}
