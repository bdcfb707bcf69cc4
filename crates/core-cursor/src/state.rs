use core_text::{Position, Range, Selection};

/// State of one cursor in a single coordinate space.
///
/// `selection_start` is a range so word / line selection modes can keep the
/// whole initially selected unit anchored while `position` moves. The
/// resulting `selection` is derived and cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleCursorState {
    pub selection_start: Range,
    pub selection_start_leftover_visible_columns: usize,
    pub position: Position,
    pub leftover_visible_columns: usize,
    pub selection: Selection,
}

impl SingleCursorState {
    pub fn new(
        selection_start: Range,
        selection_start_leftover_visible_columns: usize,
        position: Position,
        leftover_visible_columns: usize,
    ) -> Self {
        Self {
            selection_start,
            selection_start_leftover_visible_columns,
            position,
            leftover_visible_columns,
            selection: compute_selection(selection_start, position),
        }
    }

    pub fn caret(pos: Position) -> Self {
        Self::new(Range::collapsed(pos), 0, pos, 0)
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }
}

fn compute_selection(selection_start: Range, position: Position) -> Selection {
    if selection_start.is_empty() || !position.is_before_or_equal(&selection_start.start) {
        Selection::from_positions(selection_start.start, position)
    } else {
        Selection::from_positions(selection_start.end, position)
    }
}

/// Model and view state of one cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    pub model_state: SingleCursorState,
    pub view_state: SingleCursorState,
}

impl CursorState {
    pub fn new(model_state: SingleCursorState, view_state: SingleCursorState) -> Self {
        Self {
            model_state,
            view_state,
        }
    }

    /// Model-only partial state anchored at the selection's anchor.
    pub fn from_model_selection(selection: Selection) -> PartialCursorState {
        PartialCursorState {
            model_state: Some(SingleCursorState::new(
                Range::collapsed(selection.anchor),
                0,
                selection.active,
                0,
            )),
            view_state: None,
        }
    }

    pub fn from_model_selections(selections: &[Selection]) -> Vec<PartialCursorState> {
        selections
            .iter()
            .copied()
            .map(CursorState::from_model_selection)
            .collect()
    }
}

/// A state where either side may be missing; the cursor derives the missing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartialCursorState {
    pub model_state: Option<SingleCursorState>,
    pub view_state: Option<SingleCursorState>,
}

impl PartialCursorState {
    pub fn from_view_selection(selection: Selection) -> Self {
        Self {
            model_state: None,
            view_state: Some(SingleCursorState::new(
                Range::collapsed(selection.anchor),
                0,
                selection.active,
                0,
            )),
        }
    }
}

impl From<CursorState> for PartialCursorState {
    fn from(state: CursorState) -> Self {
        Self {
            model_state: Some(state.model_state),
            view_state: Some(state.view_state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::SelectionDirection;

    fn p(line: usize, byte: usize) -> Position {
        Position::new(line, byte)
    }

    #[test]
    fn selection_from_empty_start_runs_to_position() {
        let s = SingleCursorState::new(Range::collapsed(p(1, 4)), 0, p(0, 2), 0);
        assert_eq!(s.selection, Selection::from_positions(p(1, 4), p(0, 2)));
        assert_eq!(s.selection.direction(), SelectionDirection::Rtl);
    }

    #[test]
    fn word_anchor_flips_to_far_edge_when_moving_backwards() {
        // word [2,5] selected, then dragged before it: anchor becomes the word end
        let word = Range::new(p(0, 2), p(0, 5));
        let back = SingleCursorState::new(word, 0, p(0, 0), 0);
        assert_eq!(back.selection, Selection::from_positions(p(0, 5), p(0, 0)));
        let fwd = SingleCursorState::new(word, 0, p(0, 9), 0);
        assert_eq!(fwd.selection, Selection::from_positions(p(0, 2), p(0, 9)));
    }

    #[test]
    fn from_model_selection_has_no_view_state() {
        let st = CursorState::from_model_selection(Selection::from_positions(p(0, 3), p(0, 1)));
        assert!(st.view_state.is_none());
        let model = st.model_state.unwrap();
        assert_eq!(model.selection_start, Range::collapsed(p(0, 3)));
        assert_eq!(model.position, p(0, 1));
        assert!(model.has_selection());
    }
}
