//! Rectangular range references ("A1:B10") and their geometry.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::cell_ref::CellRef;

/// An inclusive rectangle of cells. `start` is always the top-left corner.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct RangeRef {
    pub start: CellRef,
    pub end: CellRef,
}

impl RangeRef {
    /// Create a range from two corners, normalizing so `start` is top-left.
    pub fn new(a: CellRef, b: CellRef) -> RangeRef {
        RangeRef {
            start: CellRef::new(a.col.min(b.col), a.row.min(b.row)),
            end: CellRef::new(a.col.max(b.col), a.row.max(b.row)),
        }
    }

    /// A degenerate 1x1 range covering a single cell.
    pub fn cell(at: CellRef) -> RangeRef {
        RangeRef { start: at, end: at }
    }

    /// A range anchored at `anchor` spanning `rows` x `cols` cells.
    /// Zero dimensions are clamped to 1.
    pub fn with_dims(anchor: CellRef, rows: usize, cols: usize) -> RangeRef {
        let rows = rows.max(1);
        let cols = cols.max(1);
        RangeRef {
            start: anchor,
            end: CellRef::new(anchor.col + cols - 1, anchor.row + rows - 1),
        }
    }

    /// Parse "A1:B10" or a bare cell "A1" (a 1x1 range).
    /// Returns None if the input is invalid.
    pub fn parse(text: &str) -> Option<RangeRef> {
        let trimmed = text.trim();
        match trimmed.split_once(':') {
            Some((a, b)) => {
                let start = CellRef::from_str(a)?;
                let end = CellRef::from_str(b)?;
                Some(RangeRef::new(start, end))
            }
            None => CellRef::from_str(trimmed).map(RangeRef::cell),
        }
    }

    /// The top-left cell.
    pub fn anchor(&self) -> CellRef {
        self.start
    }

    pub fn rows(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    pub fn cols(&self) -> usize {
        self.end.col - self.start.col + 1
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        cell.col >= self.start.col
            && cell.col <= self.end.col
            && cell.row >= self.start.row
            && cell.row <= self.end.row
    }

    /// Iterate all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        let (start, end) = (self.start, self.end);
        (start.row..=end.row)
            .flat_map(move |row| (start.col..=end.col).map(move |col| CellRef::new(col, row)))
    }
}

impl std::str::FromStr for RangeRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid range reference: {}", s))
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}
