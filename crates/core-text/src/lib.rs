//! Rope-based text buffer abstraction plus the position / range / selection
//! vocabulary shared by the document, view-model and cursor crates.

use anyhow::Result;
use ropey::Rope;

pub mod selection;

pub use selection::{Range, Selection, SelectionDirection};

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
}

/// A position inside a buffer expressed as (line index, byte offset within that line).
/// Ordering is line first, then byte. Validated positions always sit on a
/// grapheme boundary; unvalidated ones may point anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub byte: usize,
}

impl Position {
    pub fn new(line: usize, byte: usize) -> Self {
        Self { line, byte }
    }
    pub fn origin() -> Self {
        Self { line: 0, byte: 0 }
    }
    pub fn is_before(&self, other: &Position) -> bool {
        self < other
    }
    pub fn is_before_or_equal(&self, other: &Position) -> bool {
        self <= other
    }
    pub fn clamp_to<F>(&mut self, line_count: usize, mut line_len_fn: F)
    where
        F: FnMut(usize) -> usize,
    {
        if line_count == 0 {
            self.line = 0;
            self.byte = 0;
            return;
        }
        if self.line >= line_count {
            self.line = line_count - 1;
        }
        let max_len = line_len_fn(self.line);
        if self.byte > max_len {
            self.byte = max_len;
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.line, self.byte)
    }
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
        })
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Return the requested line as an owned `String` (including trailing newline if present).
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx < self.rope.len_lines() {
            Some(self.rope.line(idx).to_string())
        } else {
            None
        }
    }

    /// Line text without its line terminator. Out of range lines are empty.
    pub fn line_content(&self, idx: usize) -> String {
        let Some(mut s) = self.line(idx) else {
            return String::new();
        };
        if s.ends_with('\n') {
            s.pop();
        }
        if s.ends_with('\r') {
            s.pop();
        }
        s
    }

    /// Byte length of a line (excluding any newline) for clamping purposes.
    pub fn line_byte_len(&self, idx: usize) -> usize {
        if idx >= self.rope.len_lines() {
            return 0;
        }
        self.line_content(idx).len()
    }

    /// Absolute byte offset of a position. Caller guarantees the position is valid.
    pub fn offset_of(&self, pos: Position) -> usize {
        self.rope.line_to_byte(pos.line) + pos.byte
    }

    /// Inverse of [`Buffer::offset_of`]; offsets past the end clamp to the end.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_bytes());
        let line = self.rope.byte_to_line(offset);
        Position::new(line, offset - self.rope.line_to_byte(line))
    }

    /// Replace the text covered by `range` with `text` and return the position
    /// just after the inserted text. Caller guarantees a valid range.
    pub fn replace(&mut self, range: Range, text: &str) -> Position {
        let s = self.offset_of(range.start);
        let e = self.offset_of(range.end);
        let start_char = self.rope.byte_to_char(s);
        if e > s {
            let end_char = self.rope.byte_to_char(e);
            self.rope.remove(start_char..end_char);
        }
        if !text.is_empty() {
            self.rope.insert(start_char, text);
        }
        self.position_at(s + text.len())
    }

    /// Full buffer contents.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }
}

/// Grapheme helpers operating on a single line.
pub mod grapheme {
    use unicode_segmentation::UnicodeSegmentation;

    /// Largest grapheme boundary `<= byte` (clamped to the line length).
    pub fn floor_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        let mut last = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                break;
            }
            last = idx;
        }
        last
    }
}
