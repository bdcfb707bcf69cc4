//! Tracked ranges: document-anchored markers that follow text edits.

use core_text::{Position, Range};
use std::collections::HashMap;
use tracing::trace;

/// Opaque handle for a tracked range owned by a [`crate::Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackedRangeId(u64);

/// How a tracked range reacts to text inserted exactly at one of its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackedRangeStickiness {
    #[default]
    AlwaysGrowsWhenTypingAtEdges,
    NeverGrowsWhenTypingAtEdges,
    GrowsOnlyWhenTypingBefore,
    GrowsOnlyWhenTypingAfter,
}

impl TrackedRangeStickiness {
    /// Start edge is pushed right by text inserted at it.
    fn start_moves_on_insert(self) -> bool {
        matches!(
            self,
            Self::NeverGrowsWhenTypingAtEdges | Self::GrowsOnlyWhenTypingAfter
        )
    }

    /// End edge is pushed right by text inserted at it.
    fn end_moves_on_insert(self) -> bool {
        matches!(
            self,
            Self::AlwaysGrowsWhenTypingAtEdges | Self::GrowsOnlyWhenTypingAfter
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Tracked {
    range: Range,
    stickiness: TrackedRangeStickiness,
}

#[derive(Debug, Default)]
pub struct TrackedRanges {
    next_id: u64,
    ranges: HashMap<TrackedRangeId, Tracked>,
}

impl TrackedRanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn get(&self, id: TrackedRangeId) -> Option<Range> {
        self.ranges.get(&id).map(|t| t.range)
    }

    /// Acquire, move or release a tracked range depending on which arguments are present.
    pub fn set(
        &mut self,
        id: Option<TrackedRangeId>,
        range: Option<Range>,
        stickiness: TrackedRangeStickiness,
    ) -> Option<TrackedRangeId> {
        match (id, range) {
            (None, None) => None,
            (Some(id), None) => {
                if self.ranges.remove(&id).is_some() {
                    trace!(
                        target: "document",
                        id = id.0,
                        live = self.ranges.len(),
                        "tracked_range_release"
                    );
                }
                None
            }
            (Some(id), Some(range)) if self.ranges.contains_key(&id) => {
                self.ranges.insert(id, Tracked { range, stickiness });
                Some(id)
            }
            (_, Some(range)) => {
                let id = TrackedRangeId(self.next_id);
                self.next_id += 1;
                self.ranges.insert(id, Tracked { range, stickiness });
                trace!(
                    target: "document",
                    id = id.0,
                    live = self.ranges.len(),
                    "tracked_range_acquire"
                );
                Some(id)
            }
        }
    }

    /// Re-anchor every tracked range after `[edit_start, edit_end]` was replaced by
    /// text ending at `new_end`.
    pub fn on_edit(&mut self, edit_start: Position, edit_end: Position, new_end: Position) {
        for tracked in self.ranges.values_mut() {
            let sticky = tracked.stickiness;
            let start = adjust_position(
                tracked.range.start,
                edit_start,
                edit_end,
                new_end,
                sticky.start_moves_on_insert(),
            );
            let mut end = adjust_position(
                tracked.range.end,
                edit_start,
                edit_end,
                new_end,
                sticky.end_moves_on_insert(),
            );
            if end < start {
                end = start;
            }
            tracked.range = Range { start, end };
        }
    }
}

/// Map a position through a single replace edit.
///
/// Positions touching or inside the replaced region resolve to the edit start
/// or to `new_end` according to `move_right`; a position sitting exactly at the
/// end of a non-empty replaced region always lands on `new_end`.
pub fn adjust_position(
    pos: Position,
    edit_start: Position,
    edit_end: Position,
    new_end: Position,
    move_right: bool,
) -> Position {
    if pos < edit_start {
        return pos;
    }
    if pos > edit_end {
        if pos.line == edit_end.line {
            return Position::new(new_end.line, new_end.byte + (pos.byte - edit_end.byte));
        }
        return Position::new(pos.line - edit_end.line + new_end.line, pos.byte);
    }
    if pos == edit_end && edit_end > edit_start {
        return new_end;
    }
    if move_right { new_end } else { edit_start }
}
