//! Stable cell identities

use std::fmt;

/// Stable identity of a cell.
///
/// Assigned once when the cell is created and never reused, so references
/// survive renames of the cell's display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellId(u64);

impl CellId {
    /// Create an id from its raw number
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw number of this id
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
