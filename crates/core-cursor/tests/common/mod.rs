#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_cursor::{CursorCollection, CursorConfig, CursorContext};
use core_document::{Document, TextModel, TrackedRangeId, TrackedRangeStickiness};
use core_model::ViewModel;
use core_text::{Position, Range, Selection};
use std::collections::HashSet;

/// `TextModel` wrapper recording tracked range traffic.
pub struct CountingModel {
    inner: Document,
    live: HashSet<TrackedRangeId>,
    pub acquired: usize,
    pub released: usize,
    /// Releases of ids that were not live (double release or unknown id).
    pub bad_releases: usize,
}

impl CountingModel {
    pub fn new(text: &str) -> Self {
        Self {
            inner: Document::from_str("counting", text).unwrap(),
            live: HashSet::new(),
            acquired: 0,
            released: 0,
            bad_releases: 0,
        }
    }

    pub fn live(&self) -> usize {
        self.live.len()
    }
}

impl TextModel for CountingModel {
    fn name(&self) -> &str {
        "counting"
    }

    fn line_count(&self) -> usize {
        self.inner.line_count()
    }

    fn line_content(&self, line: usize) -> String {
        self.inner.line_content(line)
    }

    fn set_tracked_range(
        &mut self,
        id: Option<TrackedRangeId>,
        range: Option<Range>,
        stickiness: TrackedRangeStickiness,
    ) -> Option<TrackedRangeId> {
        match (id, range) {
            (Some(old), None) => {
                if self.live.remove(&old) {
                    self.released += 1;
                } else {
                    self.bad_releases += 1;
                }
            }
            (None, Some(_)) => self.acquired += 1,
            _ => {}
        }
        let result = self.inner.set_tracked_range(id, range, stickiness);
        if let Some(new) = result {
            self.live.insert(new);
        }
        result
    }

    fn tracked_range(&self, id: TrackedRangeId) -> Option<Range> {
        self.inner.tracked_range(id)
    }
}

pub fn p(line: usize, byte: usize) -> Position {
    Position::new(line, byte)
}

pub fn sel(anchor_line: usize, anchor_byte: usize, line: usize, byte: usize) -> Selection {
    Selection::from_positions(p(anchor_line, anchor_byte), p(line, byte))
}

/// Ten lines of forty ASCII bytes each.
pub fn wide_text() -> String {
    (0..10).map(|_| "x".repeat(40)).collect::<Vec<_>>().join("\n")
}

/// Run `f` against a fresh collection over `text` with default config.
pub fn with_collection<R>(
    text: &str,
    config: CursorConfig,
    f: impl FnOnce(&mut CursorContext<'_>, &mut CursorCollection) -> R,
) -> R {
    let mut doc = Document::from_str("test", text).unwrap();
    let vm = ViewModel::new();
    let mut ctx = CursorContext::new(&mut doc, &vm, &config);
    let mut cursors = CursorCollection::new(&mut ctx);
    let out = f(&mut ctx, &mut cursors);
    cursors.dispose(&mut ctx);
    out
}
