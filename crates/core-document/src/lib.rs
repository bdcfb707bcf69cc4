//! Document state: the text buffer, its edit version and the tracked ranges
//! that cursors anchor into it.
//!
//! Cursors never talk to `Document` directly. They see it through the
//! [`TextModel`] trait, which is the narrow surface they need: line access,
//! position validation and tracked range bookkeeping. Tests substitute their
//! own `TextModel` to observe marker acquire / release traffic.

use core_text::{Buffer, Position, Range, grapheme};
use thiserror::Error;
use tracing::debug;

pub mod tracked;
pub use tracked::{TrackedRangeId, TrackedRangeStickiness, TrackedRanges};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("range {start}..{end} is outside the document")]
    InvalidRange { start: Position, end: Position },
    #[error("edits overlap at {at}")]
    OverlappingEdits { at: Position },
}

/// Read / marker surface of a text document as consumed by cursors.
pub trait TextModel {
    /// Identity rendered in diagnostics.
    fn name(&self) -> &str;
    fn line_count(&self) -> usize;
    /// Line text without its terminator; empty for out of range lines.
    fn line_content(&self, line: usize) -> String;

    fn line_max_byte(&self, line: usize) -> usize {
        self.line_content(line).len()
    }

    /// Clamp into the document and snap down to a grapheme boundary.
    fn validate_position(&self, mut pos: Position) -> Position {
        pos.clamp_to(self.line_count(), |line| self.line_max_byte(line));
        let content = self.line_content(pos.line);
        Position::new(pos.line, grapheme::floor_boundary(&content, pos.byte))
    }

    fn validate_range(&self, range: Range) -> Range {
        Range::new(
            self.validate_position(range.start),
            self.validate_position(range.end),
        )
    }

    /// `(None, Some)` acquires, `(Some, Some)` moves, `(Some, None)` releases.
    fn set_tracked_range(
        &mut self,
        id: Option<TrackedRangeId>,
        range: Option<Range>,
        stickiness: TrackedRangeStickiness,
    ) -> Option<TrackedRangeId>;

    fn tracked_range(&self, id: TrackedRangeId) -> Option<Range>;
}

/// A single replace operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range,
    pub text: String,
}

impl Edit {
    pub fn new(range: Range, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn insert(at: Position, text: impl Into<String>) -> Self {
        Self::new(Range::collapsed(at), text)
    }

    pub fn delete(range: Range) -> Self {
        Self::new(range, String::new())
    }
}

pub struct Document {
    buffer: Buffer,
    version: u64,
    tracked: TrackedRanges,
}

impl Document {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            version: 1,
            tracked: TrackedRanges::new(),
        }
    }

    pub fn from_str(name: impl Into<String>, content: &str) -> anyhow::Result<Self> {
        Ok(Self::new(Buffer::from_str(name, content)?))
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Number of live tracked ranges.
    pub fn tracked_range_count(&self) -> usize {
        self.tracked.len()
    }

    fn is_valid_position(&self, pos: Position) -> bool {
        if pos.line >= self.buffer.line_count() {
            return false;
        }
        let content = self.buffer.line_content(pos.line);
        pos.byte <= content.len() && content.is_char_boundary(pos.byte)
    }

    fn check_range(&self, range: Range) -> Result<(), DocumentError> {
        if self.is_valid_position(range.start) && self.is_valid_position(range.end) {
            Ok(())
        } else {
            Err(DocumentError::InvalidRange {
                start: range.start,
                end: range.end,
            })
        }
    }

    /// Replace `range` with `text`, re-anchor tracked ranges and return the range
    /// now covered by the inserted text.
    pub fn apply_edit(&mut self, range: Range, text: &str) -> Result<Range, DocumentError> {
        self.check_range(range)?;
        let new_end = self.buffer.replace(range, text);
        self.tracked.on_edit(range.start, range.end, new_end);
        self.version += 1;
        debug!(
            target: "document",
            version = self.version,
            start = %range.start,
            end = %range.end,
            inserted = text.len(),
            lines = self.buffer.line_count(),
            "edit_applied"
        );
        Ok(Range::new(range.start, new_end))
    }

    /// Apply a batch of non-overlapping edits expressed against the current text.
    /// Either every edit applies or none does.
    pub fn apply_edits(&mut self, edits: &[Edit]) -> Result<(), DocumentError> {
        let mut ordered: Vec<&Edit> = edits.iter().collect();
        ordered.sort_by_key(|e| (e.range.start, e.range.end));
        for edit in &ordered {
            self.check_range(edit.range)?;
        }
        for pair in ordered.windows(2) {
            if pair[1].range.start < pair[0].range.end {
                return Err(DocumentError::OverlappingEdits {
                    at: pair[1].range.start,
                });
            }
        }
        // Back to front so earlier offsets stay valid.
        for edit in ordered.iter().rev() {
            self.apply_edit(edit.range, &edit.text)?;
        }
        Ok(())
    }
}

impl TextModel for Document {
    fn name(&self) -> &str {
        &self.buffer.name
    }

    fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    fn line_content(&self, line: usize) -> String {
        self.buffer.line_content(line)
    }

    fn line_max_byte(&self, line: usize) -> usize {
        self.buffer.line_byte_len(line)
    }

    fn set_tracked_range(
        &mut self,
        id: Option<TrackedRangeId>,
        range: Option<Range>,
        stickiness: TrackedRangeStickiness,
    ) -> Option<TrackedRangeId> {
        let range = range.map(|r| self.validate_range(r));
        self.tracked.set(id, range, stickiness)
    }

    fn tracked_range(&self, id: TrackedRangeId) -> Option<Range> {
        self.tracked.get(id)
    }
}
