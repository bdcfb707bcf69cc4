//! Ranges and directional selections.

use crate::Position;
use std::fmt;

/// An ordered span `[start, end]` of positions. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Construct a range, ordering the endpoints so that start <= end.
    pub fn new(a: Position, b: Position) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn collapsed(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest range covering both `self` and `other`.
    pub fn plus_range(&self, other: &Range) -> Range {
        Range {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// True when the ranges share at least one position (touching counts).
    pub fn intersects_or_touches(&self, other: &Range) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// True when the ranges share more than a single boundary position.
    pub fn strictly_overlaps(&self, other: &Range) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} -> {}]", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionDirection {
    /// Anchor at the start, active end at the end.
    Ltr,
    /// Anchor at the end, active end at the start.
    Rtl,
}

/// A directional selection: the anchor stays put while the active end moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    pub fn from_positions(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    pub fn caret(pos: Position) -> Self {
        Self {
            anchor: pos,
            active: pos,
        }
    }

    /// Build a selection covering `range` whose anchor sits on the side given by `direction`.
    pub fn from_range(range: Range, direction: SelectionDirection) -> Self {
        match direction {
            SelectionDirection::Ltr => Self::from_positions(range.start, range.end),
            SelectionDirection::Rtl => Self::from_positions(range.end, range.start),
        }
    }

    pub fn start(&self) -> Position {
        self.anchor.min(self.active)
    }

    pub fn end(&self) -> Position {
        self.anchor.max(self.active)
    }

    pub fn range(&self) -> Range {
        Range::new(self.anchor, self.active)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    /// Empty selections report `Ltr`.
    pub fn direction(&self) -> SelectionDirection {
        if self.anchor == self.start() {
            SelectionDirection::Ltr
        } else {
            SelectionDirection::Rtl
        }
    }

    /// Same anchor and same active end.
    pub fn equals_selection(&self, other: &Selection) -> bool {
        self.anchor == other.anchor && self.active == other.active
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} -> {}]", self.anchor, self.active)
    }
}
