//! Multi-cursor core: per-cursor state in model and view space, the cursor
//! collection that owns one primary plus any number of secondary cursors, and
//! the overlap-merge normalization run after operations that may leave
//! selections overlapping.
//!
//! Nothing in this crate stores the document or the view model. Every
//! operation that needs them receives a [`CursorContext`] built by the caller
//! (normally [`CursorController`]) for the duration of that call.
//!
//! Invariants (must hold after every public call on `CursorCollection`):
//! * The primary cursor exists and is never removed by merges.
//! * Combined order is `[primary, secondary_0, secondary_1, ..]` where
//!   secondaries keep their insertion order.
//! * The last-added mark names a live cursor or nothing.

use core_config::Config;
use core_document::TextModel;
use core_model::CoordinatesConverter;
use core_text::{Position, Range};

mod arena;
mod collection;
mod controller;
mod cursor;
mod state;
mod tracer;

pub use arena::{CursorArena, CursorId};
pub use collection::CursorCollection;
pub use controller::CursorController;
pub use cursor::Cursor;
pub use state::{CursorState, PartialCursorState, SingleCursorState};

/// Target used for collection level logging and the diagnostic state dump.
pub const TRACE_TARGET: &str = "cursor.collection";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorConfig {
    pub multi_cursor_merge_overlapping: bool,
    pub multi_cursor_limit: usize,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            multi_cursor_merge_overlapping: true,
            multi_cursor_limit: 10_000,
        }
    }
}

impl CursorConfig {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            multi_cursor_merge_overlapping: cfg.merge_overlapping(),
            multi_cursor_limit: cfg.effective_cursor_limit(),
        }
    }
}

/// Borrowed view of everything a cursor operation may consult.
pub struct CursorContext<'a> {
    pub model: &'a mut dyn TextModel,
    pub view: &'a dyn CoordinatesConverter,
    pub config: &'a CursorConfig,
}

impl<'a> CursorContext<'a> {
    pub fn new(
        model: &'a mut dyn TextModel,
        view: &'a dyn CoordinatesConverter,
        config: &'a CursorConfig,
    ) -> Self {
        Self {
            model,
            view,
            config,
        }
    }

    pub fn convert_model_position_to_view(&self, pos: Position) -> Position {
        self.view.model_to_view_position(&*self.model, pos)
    }

    pub fn convert_view_position_to_model(&self, pos: Position) -> Position {
        self.view.view_to_model_position(&*self.model, pos)
    }

    pub fn convert_view_range_to_model(&self, range: Range) -> Range {
        self.view.view_to_model_range(&*self.model, range)
    }

    pub fn validate_view_position(&self, view_pos: Position, model_pos: Position) -> Position {
        self.view
            .validate_view_position(&*self.model, view_pos, model_pos)
    }

    pub fn validate_view_range(&self, view_range: Range, model_range: Range) -> Range {
        self.view
            .validate_view_range(&*self.model, view_range, model_range)
    }

    pub fn model_line_content(&self, line: usize) -> String {
        self.model.line_content(line)
    }

    pub fn view_line_content(&self, view_line: usize) -> String {
        self.view.view_line_content(&*self.model, view_line)
    }
}
