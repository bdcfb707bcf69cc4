//! Primary plus secondary cursors and the overlap-merge pass.
//!
//! Combined order is `[primary, secondaries..]`; callers address cursors by
//! their position in that order (index 0 is the primary). Internally cursors
//! live in a [`CursorArena`] so merges can remove a cursor without shifting
//! the identity of any other.

use crate::arena::{CursorArena, CursorId};
use crate::cursor::Cursor;
use crate::state::{CursorState, PartialCursorState};
use crate::tracer::Tracer;
use crate::CursorContext;
use core_text::{Position, Selection, SelectionDirection};
use tracing::debug;

#[derive(Debug)]
pub struct CursorCollection {
    arena: CursorArena<Cursor>,
    primary: CursorId,
    secondaries: Vec<CursorId>,
    /// Cursor most recently added or merged into (think Ctrl+drag).
    last_added: Option<CursorId>,
}

#[derive(Debug, Clone, Copy)]
struct SortedCursor {
    id: CursorId,
    /// Position in combined order when the pass started. Removals never
    /// reorder survivors so comparing ranks stays valid for the whole pass.
    rank: usize,
    selection: Selection,
}

/// Carets merge with anything they touch; two ranges only when they overlap.
/// `current` must not start after `next`.
fn should_merge(current: &Selection, next: &Selection) -> bool {
    let (current, next) = (current.range(), next.range());
    if current.is_empty() || next.is_empty() {
        current.intersects_or_touches(&next)
    } else {
        current.strictly_overlaps(&next)
    }
}

impl CursorCollection {
    pub fn new(ctx: &mut CursorContext<'_>) -> Self {
        let mut arena = CursorArena::new();
        let primary = arena.insert(Cursor::new(ctx));
        Self {
            arena,
            primary,
            secondaries: Vec::new(),
            last_added: None,
        }
    }

    /// Number of cursors including the primary; never zero.
    pub fn len(&self) -> usize {
        1 + self.secondaries.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    fn ids(&self) -> impl Iterator<Item = CursorId> + '_ {
        std::iter::once(self.primary).chain(self.secondaries.iter().copied())
    }

    fn cursors(&self) -> impl Iterator<Item = &Cursor> + '_ {
        self.ids().map(|id| &self.arena[id])
    }

    pub fn get_all(&self) -> Vec<CursorState> {
        self.cursors().map(Cursor::as_cursor_state).collect()
    }

    pub fn get_view_positions(&self) -> Vec<Position> {
        self.cursors().map(|c| c.view_state().position).collect()
    }

    pub fn get_selections(&self) -> Vec<Selection> {
        self.cursors().map(|c| c.model_state().selection).collect()
    }

    pub fn get_view_selections(&self) -> Vec<Selection> {
        self.cursors().map(|c| c.view_state().selection).collect()
    }

    pub fn get_primary_cursor(&self) -> CursorState {
        self.arena[self.primary].as_cursor_state()
    }

    /// Combined index of the last added cursor; 0 when there are no
    /// secondaries or nothing is marked.
    pub fn get_last_added_cursor_index(&self) -> usize {
        if self.secondaries.is_empty() {
            return 0;
        }
        self.last_added
            .and_then(|id| self.secondaries.iter().position(|&s| s == id))
            .map_or(0, |pos| pos + 1)
    }

    /// Replace all cursor state; selection 0 goes to the primary.
    /// `selections` must not be empty.
    pub fn set_selections(&mut self, ctx: &mut CursorContext<'_>, selections: &[Selection]) {
        self.set_states(ctx, Some(CursorState::from_model_selections(selections)));
    }

    /// `None` leaves everything untouched. A non-empty vector must be given
    /// otherwise; element 0 goes to the primary.
    pub fn set_states(
        &mut self,
        ctx: &mut CursorContext<'_>,
        states: Option<Vec<PartialCursorState>>,
    ) {
        let Some(states) = states else {
            return;
        };
        debug_assert!(!states.is_empty(), "primary cursor needs a state");
        let Some((first, rest)) = states.split_first() else {
            return;
        };
        let trace = Tracer::begin(|| self.get_all());
        self.arena[self.primary].set_state(ctx, first.model_state, first.view_state);
        self.set_secondary_states(ctx, rest);
        trace.finish(ctx, || self.get_all());
    }

    /// Create or dispose secondaries until their count matches `states`.
    fn set_secondary_states(&mut self, ctx: &mut CursorContext<'_>, states: &[PartialCursorState]) {
        while self.secondaries.len() < states.len() {
            self.add_secondary_cursor(ctx);
        }
        while self.secondaries.len() > states.len() {
            self.remove_secondary_at(ctx, self.secondaries.len() - 1);
        }
        for (&id, state) in self.secondaries.iter().zip(states) {
            self.arena[id].set_state(ctx, state.model_state, state.view_state);
        }
    }

    fn add_secondary_cursor(&mut self, ctx: &mut CursorContext<'_>) {
        let id = self.arena.insert(Cursor::new(ctx));
        self.secondaries.push(id);
        self.last_added = Some(id);
    }

    fn remove_secondary_at(&mut self, ctx: &mut CursorContext<'_>, pos: usize) {
        let id = self.secondaries.remove(pos);
        if self.last_added == Some(id) {
            // Mark falls back to the cursor before it in combined order.
            self.last_added = Some(match pos {
                0 => self.primary,
                _ => self.secondaries[pos - 1],
            });
        }
        if let Some(cursor) = self.arena.remove(id) {
            cursor.dispose(ctx);
        }
    }

    pub fn kill_secondary_cursors(&mut self, ctx: &mut CursorContext<'_>) {
        let trace = Tracer::begin(|| self.get_all());
        self.set_secondary_states(ctx, &[]);
        trace.finish(ctx, || self.get_all());
    }

    pub fn ensure_valid_state(&mut self, ctx: &mut CursorContext<'_>) {
        let trace = Tracer::begin(|| self.get_all());
        let ids: Vec<CursorId> = self.ids().collect();
        for id in ids {
            self.arena[id].ensure_valid_state(ctx);
        }
        trace.finish(ctx, || self.get_all());
    }

    /// Selections recovered from each cursor's tracked range, in combined order.
    pub fn read_selection_from_markers(&self, ctx: &CursorContext<'_>) -> Vec<Selection> {
        let trace = Tracer::begin(|| self.get_all());
        let result = self
            .cursors()
            .map(|c| c.read_selection_from_markers(ctx))
            .collect();
        trace.finish(ctx, || self.get_all());
        result
    }

    pub fn start_tracking_selections(&mut self, ctx: &mut CursorContext<'_>) {
        let ids: Vec<CursorId> = self.ids().collect();
        for id in ids {
            self.arena[id].start_tracking_selection(ctx);
        }
    }

    pub fn stop_tracking_selections(&mut self, ctx: &mut CursorContext<'_>) {
        let ids: Vec<CursorId> = self.ids().collect();
        for id in ids {
            self.arena[id].stop_tracking_selection(ctx);
        }
    }

    /// Merge cursors whose model selections overlap (or touch, when one of
    /// them is a caret). The primary always survives; the lower combined
    /// index wins, but the last added cursor keeps its direction when it
    /// loses.
    pub fn normalize(&mut self, ctx: &mut CursorContext<'_>) {
        if self.secondaries.is_empty() || !ctx.config.multi_cursor_merge_overlapping {
            return;
        }
        let trace = Tracer::begin(|| self.get_all());

        let mut sorted: Vec<SortedCursor> = self
            .ids()
            .enumerate()
            .map(|(rank, id)| SortedCursor {
                id,
                rank,
                selection: self.arena[id].model_state().selection,
            })
            .collect();
        // Stable: equal starts keep combined order.
        sorted.sort_by_key(|c| c.selection.start());

        let mut at = 0;
        while at + 1 < sorted.len() {
            let (current, next) = (sorted[at], sorted[at + 1]);
            if !should_merge(&current.selection, &next.selection) {
                at += 1;
                continue;
            }
            let (winner_at, loser_at) = if current.rank < next.rank {
                (at, at + 1)
            } else {
                (at + 1, at)
            };
            let winner = sorted[winner_at];
            let loser = sorted[loser_at];
            debug_assert_ne!(loser.id, self.primary);

            if !loser.selection.equals_selection(&winner.selection) {
                let range = loser.selection.range().plus_range(&winner.selection.range());
                let direction: SelectionDirection = if self.last_added == Some(loser.id) {
                    self.last_added = Some(winner.id);
                    loser.selection.direction()
                } else {
                    winner.selection.direction()
                };
                let merged = Selection::from_range(range, direction);
                sorted[winner_at].selection = merged;
                let state = CursorState::from_model_selection(merged);
                self.arena[winner.id].set_state(ctx, state.model_state, state.view_state);
            }
            debug!(
                target: "cursor.collection",
                winner = winner.rank,
                loser = loser.rank,
                selection = %sorted[winner_at].selection,
                "cursors_merged"
            );

            sorted.remove(loser_at);
            if let Some(pos) = self.secondaries.iter().position(|&s| s == loser.id) {
                self.remove_secondary_at(ctx, pos);
            }
            // Stay on this slot: the survivor may now reach the next cursor.
        }

        trace.finish(ctx, || self.get_all());
    }

    /// Release every cursor's tracked range.
    pub fn dispose(mut self, ctx: &mut CursorContext<'_>) {
        self.set_secondary_states(ctx, &[]);
        if let Some(primary) = self.arena.remove(self.primary) {
            primary.dispose(ctx);
        }
    }
}
