//! Selection handling over linear offsets.
//!
//! ## Learning: Range Types
//!
//! A `Range` is a pair of caret offsets with `start <= end`. An empty
//! range (start == end) is a collapsed caret, and the atoms it covers are
//! those at offsets `start + 1 ..= end`.

use serde::{Deserialize, Serialize};

/// A caret position in the linear flattening of the tree.
pub type Offset = usize;

/// Horizontal direction, used by the selection primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// `+1` forward, `-1` backward.
    pub fn sign(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// A normalized range of offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Start offset (inclusive)
    pub start: Offset,
    /// End offset
    pub end: Offset,
}

impl Range {
    /// Creates a new range.
    ///
    /// Automatically normalizes so start <= end.
    pub fn new(a: Offset, b: Offset) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Creates a zero-width range (caret position).
    pub fn collapsed(offset: Offset) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Number of atoms covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Returns true if `offset` lies within the range, ends included.
    pub fn contains(&self, offset: Offset) -> bool {
        offset >= self.start && offset <= self.end
    }

    /// Returns true if this range overlaps with another.
    pub fn overlaps(&self, other: &Range) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns true if this range is adjacent to another.
    pub fn is_adjacent(&self, other: &Range) -> bool {
        self.end == other.start || self.start == other.end
    }

    /// Merges this range with another (if they overlap or are adjacent).
    pub fn merge(&self, other: &Range) -> Option<Range> {
        if self.overlaps(other) || self.is_adjacent(other) {
            Some(Range {
                start: self.start.min(other.start),
                end: self.end.max(other.end),
            })
        } else {
            None
        }
    }

    /// Clamps both ends to `[0, last_offset]`.
    pub fn clamp(&self, last_offset: Offset) -> Range {
        Range::new(self.start.min(last_offset), self.end.min(last_offset))
    }
}

/// Which end of a selection is the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionDirection {
    /// Caret at the end
    Forward,
    /// Caret at the start
    Backward,
    /// Collapsed or programmatic selection
    #[default]
    None,
}

/// A set of non-overlapping ranges plus a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub ranges: Vec<Range>,
    pub direction: SelectionDirection,
}

impl Selection {
    /// A collapsed selection at `offset`.
    pub fn collapsed(offset: Offset) -> Self {
        Self {
            ranges: vec![Range::collapsed(offset)],
            direction: SelectionDirection::None,
        }
    }

    /// A selection with a single range.
    pub fn single(start: Offset, end: Offset, direction: SelectionDirection) -> Self {
        Self {
            ranges: vec![Range::new(start, end)],
            direction,
        }
    }

    /// Returns true if the selection is a single caret.
    pub fn is_collapsed(&self) -> bool {
        self.ranges.iter().all(Range::is_collapsed)
    }

    /// The first range. Selections always hold at least one.
    pub fn primary(&self) -> Range {
        self.ranges.first().copied().unwrap_or(Range::collapsed(0))
    }

    /// Smallest start over all ranges.
    pub fn start(&self) -> Offset {
        self.ranges.iter().map(|r| r.start).min().unwrap_or(0)
    }

    /// Largest end over all ranges.
    pub fn end(&self) -> Offset {
        self.ranges.iter().map(|r| r.end).max().unwrap_or(0)
    }

    /// Clamps, sorts and merges the ranges so they don't overlap.
    pub fn normalize(&mut self, last_offset: Offset) {
        let mut ranges: Vec<Range> = self.ranges.iter().map(|r| r.clamp(last_offset)).collect();
        if ranges.is_empty() {
            ranges.push(Range::collapsed(0));
        }

        // Sort by start position
        ranges.sort_by_key(|r| (r.start, r.end));

        // Merge overlapping ranges
        let mut merged: Vec<Range> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) => match last.merge(&range) {
                    Some(joined) => *last = joined,
                    None => merged.push(range),
                },
                None => merged.push(range),
            }
        }

        // Stray carets next to real ranges are dropped; several carets
        // reduce to the first one
        if merged.iter().any(|r| !r.is_collapsed()) {
            merged.retain(|r| !r.is_collapsed());
        } else {
            merged.truncate(1);
        }

        self.ranges = merged;
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::collapsed(0)
    }
}
