//! View model: maps between model space (document lines) and view space
//! (the lines actually shown once folded regions are collapsed).
//!
//! Why a separate coordinate space?
//! --------------------------------
//! Cursors keep two states, one per space. Commands that move by rendered
//! line (page down, add cursor below) reason in view space while edits and
//! markers live in model space. The mapping is owned here so the cursor
//! crate only depends on the [`CoordinatesConverter`] trait.
//!
//! Invariants (must hold after every public call):
//! * Folded regions are sorted by header line and never overlap; folding a
//!   region that touches an existing one merges them.
//! * A fold header is always visible; only `header + 1 ..= last` are hidden.
//! * Regions may reach past the end of the document after edits; every
//!   conversion clamps them against the current line count instead of
//!   rewriting the stored regions.
//! * With no folds the mapping is the identity on validated positions.

use core_document::TextModel;
use core_text::{Position, Range, grapheme};
use tracing::debug;

mod fold;
pub use fold::FoldRegion;

/// Model <-> view coordinate mapping consumed by cursors.
pub trait CoordinatesConverter {
    fn view_line_count(&self, model: &dyn TextModel) -> usize;
    fn view_line_content(&self, model: &dyn TextModel, view_line: usize) -> String;
    fn model_to_view_position(&self, model: &dyn TextModel, pos: Position) -> Position;
    fn view_to_model_position(&self, model: &dyn TextModel, pos: Position) -> Position;

    fn model_to_view_range(&self, model: &dyn TextModel, range: Range) -> Range {
        Range::new(
            self.model_to_view_position(model, range.start),
            self.model_to_view_position(model, range.end),
        )
    }

    fn view_to_model_range(&self, model: &dyn TextModel, range: Range) -> Range {
        Range::new(
            self.view_to_model_position(model, range.start),
            self.view_to_model_position(model, range.end),
        )
    }

    /// Clamp `view_pos` into view space. Keep it when it still maps onto
    /// `expected_model`, otherwise derive the view position from the model.
    fn validate_view_position(
        &self,
        model: &dyn TextModel,
        view_pos: Position,
        expected_model: Position,
    ) -> Position {
        let line_count = self.view_line_count(model).max(1);
        let line = view_pos.line.min(line_count - 1);
        let content = self.view_line_content(model, line);
        let clamped = Position::new(line, grapheme::floor_boundary(&content, view_pos.byte));
        if self.view_to_model_position(model, clamped) == expected_model {
            clamped
        } else {
            self.model_to_view_position(model, expected_model)
        }
    }

    fn validate_view_range(
        &self,
        model: &dyn TextModel,
        view_range: Range,
        expected_model: Range,
    ) -> Range {
        Range::new(
            self.validate_view_position(model, view_range.start, expected_model.start),
            self.validate_view_position(model, view_range.end, expected_model.end),
        )
    }
}

/// Folding view model.
#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    folds: Vec<FoldRegion>,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folded_regions(&self) -> &[FoldRegion] {
        &self.folds
    }

    /// Collapse `header + 1 ..= last`. Returns false when nothing would be hidden.
    pub fn fold(&mut self, header: usize, last: usize) -> bool {
        if last <= header {
            return false;
        }
        let mut merged = FoldRegion::new(header, last);
        self.folds.retain(|f| {
            if f.touches(&merged) {
                merged = merged.union(f);
                false
            } else {
                true
            }
        });
        let at = self.folds.partition_point(|f| f.header < merged.header);
        self.folds.insert(at, merged);
        debug!(
            target: "view_model",
            header = merged.header,
            last = merged.last,
            folds = self.folds.len(),
            "fold"
        );
        true
    }

    /// Expand the region whose header is `header`.
    pub fn unfold(&mut self, header: usize) -> bool {
        let before = self.folds.len();
        self.folds.retain(|f| f.header != header);
        let changed = self.folds.len() != before;
        if changed {
            debug!(target: "view_model", header, folds = self.folds.len(), "unfold");
        }
        changed
    }

    /// Hidden spans clamped against a document of `line_count` lines.
    fn hidden_spans(&self, line_count: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let last_line = line_count.saturating_sub(1);
        self.folds.iter().filter_map(move |f| {
            let first_hidden = f.header + 1;
            let last_hidden = f.last.min(last_line);
            (first_hidden <= last_hidden).then_some((first_hidden, last_hidden))
        })
    }

    /// Header owning `line` when `line` is hidden.
    fn hiding_header(&self, line: usize, line_count: usize) -> Option<usize> {
        self.hidden_spans(line_count)
            .find(|&(first, last)| first <= line && line <= last)
            .map(|(first, _)| first - 1)
    }

    pub fn is_line_hidden(&self, line: usize, line_count: usize) -> bool {
        self.hiding_header(line, line_count).is_some()
    }

    /// View line of a visible model line.
    fn view_line_of(&self, model_line: usize, line_count: usize) -> usize {
        let hidden_before: usize = self
            .hidden_spans(line_count)
            .take_while(|&(first, _)| first <= model_line)
            .map(|(first, last)| last.min(model_line.saturating_sub(1)) + 1 - first)
            .sum();
        model_line - hidden_before
    }

    fn model_line_of(&self, view_line: usize, line_count: usize) -> usize {
        let mut model_line = view_line;
        for (first, last) in self.hidden_spans(line_count) {
            if first <= model_line {
                model_line += last + 1 - first;
            } else {
                break;
            }
        }
        model_line.min(line_count.saturating_sub(1))
    }
}

impl CoordinatesConverter for ViewModel {
    fn view_line_count(&self, model: &dyn TextModel) -> usize {
        let line_count = model.line_count();
        let hidden: usize = self
            .hidden_spans(line_count)
            .map(|(first, last)| last + 1 - first)
            .sum();
        line_count - hidden
    }

    fn view_line_content(&self, model: &dyn TextModel, view_line: usize) -> String {
        model.line_content(self.model_line_of(view_line, model.line_count()))
    }

    fn model_to_view_position(&self, model: &dyn TextModel, pos: Position) -> Position {
        let pos = model.validate_position(pos);
        let line_count = model.line_count();
        match self.hiding_header(pos.line, line_count) {
            Some(header) => Position::new(
                self.view_line_of(header, line_count),
                model.line_max_byte(header),
            ),
            None => Position::new(self.view_line_of(pos.line, line_count), pos.byte),
        }
    }

    fn view_to_model_position(&self, model: &dyn TextModel, pos: Position) -> Position {
        let line_count = model.line_count();
        let view_lines = self.view_line_count(model).max(1);
        let model_line = self.model_line_of(pos.line.min(view_lines - 1), line_count);
        model.validate_position(Position::new(model_line, pos.byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_document::Document;

    fn doc(lines: usize) -> Document {
        let text: Vec<String> = (0..lines).map(|i| format!("line{i}")).collect();
        Document::from_str("test", &text.join("\n")).unwrap()
    }

    fn p(line: usize, byte: usize) -> Position {
        Position::new(line, byte)
    }

    #[test]
    fn identity_without_folds() {
        let d = doc(5);
        let vm = ViewModel::new();
        assert_eq!(vm.view_line_count(&d), 5);
        assert_eq!(vm.model_to_view_position(&d, p(3, 2)), p(3, 2));
        assert_eq!(vm.view_to_model_position(&d, p(3, 2)), p(3, 2));
    }

    #[test]
    fn folded_lines_collapse_onto_header_end() {
        let d = doc(10);
        let mut vm = ViewModel::new();
        assert!(vm.fold(2, 5));
        assert_eq!(vm.view_line_count(&d), 7);
        // hidden line maps to end of header line
        assert_eq!(vm.model_to_view_position(&d, p(4, 1)), p(2, 5));
        // line after the fold shifts up by three
        assert_eq!(vm.model_to_view_position(&d, p(6, 1)), p(3, 1));
        assert_eq!(vm.view_to_model_position(&d, p(3, 1)), p(6, 1));
        assert_eq!(vm.view_line_content(&d, 3), "line6");
    }

    #[test]
    fn multiple_folds_round_trip_visible_lines() {
        let d = doc(12);
        let mut vm = ViewModel::new();
        vm.fold(7, 8);
        vm.fold(2, 5);
        assert_eq!(vm.folded_regions().len(), 2);
        for line in 0..12 {
            if vm.is_line_hidden(line, 12) {
                continue;
            }
            let view = vm.model_to_view_position(&d, p(line, 0));
            assert_eq!(vm.view_to_model_position(&d, view), p(line, 0), "line {line}");
        }
        assert_eq!(vm.view_to_model_position(&d, p(5, 0)), p(9, 0));
    }

    #[test]
    fn touching_folds_merge() {
        let mut vm = ViewModel::new();
        vm.fold(2, 4);
        vm.fold(4, 6);
        assert_eq!(vm.folded_regions(), &[FoldRegion::new(2, 6)]);
        assert!(vm.unfold(2));
        assert!(vm.folded_regions().is_empty());
        assert!(!vm.fold(3, 3));
    }

    #[test]
    fn folds_past_document_end_are_clamped() {
        let d = doc(4);
        let mut vm = ViewModel::new();
        vm.fold(2, 50);
        assert_eq!(vm.view_line_count(&d), 3);
        assert_eq!(vm.view_to_model_position(&d, p(9, 0)), p(2, 0));
    }

    #[test]
    fn validate_view_position_prefers_model_truth() {
        let d = doc(10);
        let mut vm = ViewModel::new();
        vm.fold(2, 5);
        // view (3,1) maps to model (6,1): kept
        assert_eq!(vm.validate_view_position(&d, p(3, 1), p(6, 1)), p(3, 1));
        // stale view position pointing elsewhere is recomputed from the model
        assert_eq!(vm.validate_view_position(&d, p(0, 0), p(6, 1)), p(3, 1));
    }
}
