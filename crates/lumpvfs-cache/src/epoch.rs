//! Buffer lifetime groups

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifetime group a cached buffer belongs to
///
/// Variants are ordered from shortest to longest lived, so `max` of two
/// epochs is the one that keeps a buffer alive longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Epoch {
    /// May be evicted at any time to stay within a budget
    Discardable,
    /// Freed when the current level is unloaded
    Level,
    /// Freed when the game session ends
    Session,
    /// Only freed when the whole arena is torn down
    Permanent,
}

impl Epoch {
    /// All epochs, shortest lived first
    pub const ALL: [Self; 4] = [Self::Discardable, Self::Level, Self::Session, Self::Permanent];

    /// Dense index for per-epoch tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether buffers in this epoch outlive buffers in `other`
    pub fn outlives(self, other: Self) -> bool {
        self > other
    }

    /// Lowercase name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Discardable => "discardable",
            Self::Level => "level",
            Self::Session => "session",
            Self::Permanent => "permanent",
        }
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Epoch::Permanent.outlives(Epoch::Session));
        assert!(Epoch::Session.outlives(Epoch::Level));
        assert!(Epoch::Level.outlives(Epoch::Discardable));
        assert!(!Epoch::Level.outlives(Epoch::Level));
        assert_eq!(Epoch::Level.max(Epoch::Session), Epoch::Session);
    }

    #[test]
    fn test_indices_are_dense() {
        for (i, epoch) in Epoch::ALL.iter().enumerate() {
            assert_eq!(epoch.index(), i);
        }
    }
}
