use crate::CursorContext;
use crate::state::{CursorState, SingleCursorState};
use core_document::{TrackedRangeId, TrackedRangeStickiness};
use core_text::{Position, Range, Selection};

/// One insertion point plus its selection, kept in model and view space.
///
/// While tracking is on the model selection is mirrored into a tracked range
/// of the document so it follows edits made by anyone. The tracked range is a
/// document resource: it must be released through [`Cursor::dispose`], which
/// consumes the cursor so it cannot be released twice.
#[derive(Debug)]
pub struct Cursor {
    model_state: SingleCursorState,
    view_state: SingleCursorState,
    track_selection: bool,
    sel_tracked_range: Option<TrackedRangeId>,
}

impl Cursor {
    pub fn new(ctx: &mut CursorContext<'_>) -> Self {
        let origin = SingleCursorState::caret(Position::origin());
        let mut cursor = Self {
            model_state: origin,
            view_state: origin,
            track_selection: true,
            sel_tracked_range: None,
        };
        cursor.set_state(ctx, Some(origin), Some(origin));
        cursor
    }

    pub fn model_state(&self) -> &SingleCursorState {
        &self.model_state
    }

    pub fn view_state(&self) -> &SingleCursorState {
        &self.view_state
    }

    pub fn as_cursor_state(&self) -> CursorState {
        CursorState::new(self.model_state, self.view_state)
    }

    pub fn is_tracking(&self) -> bool {
        self.track_selection
    }

    pub fn dispose(mut self, ctx: &mut CursorContext<'_>) {
        self.remove_tracked_range(ctx);
    }

    pub fn start_tracking_selection(&mut self, ctx: &mut CursorContext<'_>) {
        self.track_selection = true;
        self.update_tracked_range(ctx);
    }

    pub fn stop_tracking_selection(&mut self, ctx: &mut CursorContext<'_>) {
        self.track_selection = false;
        self.remove_tracked_range(ctx);
    }

    fn update_tracked_range(&mut self, ctx: &mut CursorContext<'_>) {
        if !self.track_selection {
            return;
        }
        self.sel_tracked_range = ctx.model.set_tracked_range(
            self.sel_tracked_range,
            Some(self.model_state.selection.range()),
            TrackedRangeStickiness::AlwaysGrowsWhenTypingAtEdges,
        );
    }

    fn remove_tracked_range(&mut self, ctx: &mut CursorContext<'_>) {
        if let Some(id) = self.sel_tracked_range.take() {
            ctx.model.set_tracked_range(
                Some(id),
                None,
                TrackedRangeStickiness::AlwaysGrowsWhenTypingAtEdges,
            );
        }
    }

    /// Re-run validation of the current states against the current document.
    pub fn ensure_valid_state(&mut self, ctx: &mut CursorContext<'_>) {
        let (model, view) = (self.model_state, self.view_state);
        self.set_state(ctx, Some(model), Some(view));
    }

    /// Selection recovered from the tracked range, keeping the current direction.
    /// Without a tracked range the current model selection is returned.
    pub fn read_selection_from_markers(&self, ctx: &CursorContext<'_>) -> Selection {
        match self
            .sel_tracked_range
            .and_then(|id| ctx.model.tracked_range(id))
        {
            Some(range) => Selection::from_range(range, self.model_state.selection.direction()),
            None => self.model_state.selection,
        }
    }

    /// Apply new states. A missing side is derived from the present one; a
    /// present side is validated. Both missing leaves the cursor untouched.
    pub fn set_state(
        &mut self,
        ctx: &mut CursorContext<'_>,
        model_state: Option<SingleCursorState>,
        view_state: Option<SingleCursorState>,
    ) {
        let model_state = match (model_state, view_state) {
            (None, None) => return,
            (None, Some(view)) => {
                let selection_start = ctx
                    .model
                    .validate_range(ctx.convert_view_range_to_model(view.selection_start));
                let position = ctx
                    .model
                    .validate_position(ctx.convert_view_position_to_model(view.position));
                SingleCursorState::new(
                    selection_start,
                    view.selection_start_leftover_visible_columns,
                    position,
                    view.leftover_visible_columns,
                )
            }
            (Some(model), _) => {
                let selection_start = ctx.model.validate_range(model.selection_start);
                let selection_start_leftover = if selection_start == model.selection_start {
                    model.selection_start_leftover_visible_columns
                } else {
                    0
                };
                let position = ctx.model.validate_position(model.position);
                let leftover = if position == model.position {
                    model.leftover_visible_columns
                } else {
                    0
                };
                SingleCursorState::new(
                    selection_start,
                    selection_start_leftover,
                    position,
                    leftover,
                )
            }
        };

        let view_state = match view_state {
            None => {
                let start = ctx.convert_model_position_to_view(model_state.selection_start.start);
                let end = ctx.convert_model_position_to_view(model_state.selection_start.end);
                SingleCursorState::new(
                    Range::new(start, end),
                    model_state.selection_start_leftover_visible_columns,
                    ctx.convert_model_position_to_view(model_state.position),
                    model_state.leftover_visible_columns,
                )
            }
            Some(view) => SingleCursorState::new(
                ctx.validate_view_range(view.selection_start, model_state.selection_start),
                model_state.selection_start_leftover_visible_columns,
                ctx.validate_view_position(view.position, model_state.position),
                model_state.leftover_visible_columns,
            ),
        };

        self.model_state = model_state;
        self.view_state = view_state;
        self.update_tracked_range(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CursorConfig;
    use core_document::Document;
    use core_model::ViewModel;

    fn p(line: usize, byte: usize) -> Position {
        Position::new(line, byte)
    }

    #[test]
    fn new_cursor_sits_at_origin_and_tracks() {
        let mut doc = Document::from_str("t", "abc\ndef").unwrap();
        let vm = ViewModel::new();
        let cfg = CursorConfig::default();
        let mut ctx = CursorContext::new(&mut doc, &vm, &cfg);
        let c = Cursor::new(&mut ctx);
        assert_eq!(c.model_state().position, Position::origin());
        assert!(c.is_tracking());
        drop(ctx);
        assert_eq!(doc.tracked_range_count(), 1);
    }

    #[test]
    fn model_state_is_validated_and_view_derived() {
        let mut doc = Document::from_str("t", "abc\ndef\nghi\njkl").unwrap();
        let mut vm = ViewModel::new();
        vm.fold(0, 2);
        let cfg = CursorConfig::default();
        let mut ctx = CursorContext::new(&mut doc, &vm, &cfg);
        let mut c = Cursor::new(&mut ctx);
        let st = CursorState::from_model_selection(Selection::from_positions(p(3, 1), p(3, 99)));
        c.set_state(&mut ctx, st.model_state, st.view_state);
        assert_eq!(c.model_state().selection, Selection::from_positions(p(3, 1), p(3, 3)));
        // lines 1 and 2 are folded away, model line 3 is view line 1
        assert_eq!(c.view_state().selection, Selection::from_positions(p(1, 1), p(1, 3)));
        c.dispose(&mut ctx);
        drop(ctx);
        assert_eq!(doc.tracked_range_count(), 0);
    }

    #[test]
    fn view_only_state_derives_model_state() {
        let mut doc = Document::from_str("t", "abc\ndef\nghi\njkl").unwrap();
        let mut vm = ViewModel::new();
        vm.fold(0, 2);
        let cfg = CursorConfig::default();
        let mut ctx = CursorContext::new(&mut doc, &vm, &cfg);
        let mut c = Cursor::new(&mut ctx);
        let partial = crate::PartialCursorState::from_view_selection(Selection::caret(p(1, 2)));
        c.set_state(&mut ctx, partial.model_state, partial.view_state);
        assert_eq!(c.model_state().position, p(3, 2));
        assert_eq!(c.view_state().position, p(1, 2));
    }

    #[test]
    fn stop_tracking_releases_and_read_falls_back() {
        let mut doc = Document::from_str("t", "hello").unwrap();
        let vm = ViewModel::new();
        let cfg = CursorConfig::default();
        let mut ctx = CursorContext::new(&mut doc, &vm, &cfg);
        let mut c = Cursor::new(&mut ctx);
        let st = CursorState::from_model_selection(Selection::from_positions(p(0, 4), p(0, 1)));
        c.set_state(&mut ctx, st.model_state, st.view_state);
        c.stop_tracking_selection(&mut ctx);
        assert!(!c.is_tracking());
        assert_eq!(
            c.read_selection_from_markers(&ctx),
            Selection::from_positions(p(0, 4), p(0, 1))
        );
        drop(ctx);
        assert_eq!(doc.tracked_range_count(), 0);
    }

    #[test]
    fn markers_follow_edits_and_keep_direction() {
        let mut doc = Document::from_str("t", "hello world").unwrap();
        let vm = ViewModel::new();
        let cfg = CursorConfig::default();
        let mut c = {
            let mut ctx = CursorContext::new(&mut doc, &vm, &cfg);
            let mut c = Cursor::new(&mut ctx);
            let st =
                CursorState::from_model_selection(Selection::from_positions(p(0, 11), p(0, 6)));
            c.set_state(&mut ctx, st.model_state, st.view_state);
            c
        };
        doc.apply_edit(Range::collapsed(p(0, 0)), ">> ").unwrap();
        let mut ctx = CursorContext::new(&mut doc, &vm, &cfg);
        assert_eq!(
            c.read_selection_from_markers(&ctx),
            Selection::from_positions(p(0, 14), p(0, 9))
        );
        c.stop_tracking_selection(&mut ctx);
        assert_eq!(ctx.model.line_count(), 1);
    }
}
