//! Core runtime types
//!
//! Identifiers shared by the execution units and their diagnostics.

use std::fmt;

/// Unique identifier for an execution unit
///
/// Numbered in creation order per interpreter; the top-level unit is `BF-0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub usize);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BF-{}", self.0)
    }
}

impl From<usize> for UnitId {
    fn from(n: usize) -> Self {
        Self(n)
    }
}

/// Index of a tape cell
pub type CellIndex = usize;
