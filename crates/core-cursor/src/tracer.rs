//! Diagnostic dump of cursor states around collection mutations.
//!
//! Only active when TRACE is enabled for `cursor.collection`; otherwise the
//! before-snapshot is never taken and `finish` is a no-op.

use crate::CursorContext;
use crate::state::CursorState;
use std::backtrace::Backtrace;
use std::fmt::Write as _;
use tracing::{Level, trace};

pub(crate) struct Tracer {
    before: Option<Vec<CursorState>>,
}

impl Tracer {
    pub(crate) fn begin(snapshot: impl FnOnce() -> Vec<CursorState>) -> Self {
        let before = tracing::enabled!(target: "cursor.collection", Level::TRACE).then(snapshot);
        Self { before }
    }

    pub(crate) fn finish(
        self,
        ctx: &CursorContext<'_>,
        snapshot: impl FnOnce() -> Vec<CursorState>,
    ) {
        let Some(before) = self.before else {
            return;
        };
        let after = snapshot();
        if before == after {
            return;
        }
        trace!(target: "cursor.collection", "{}", render(ctx, &after));
    }
}

fn render(ctx: &CursorContext<'_>, states: &[CursorState]) -> String {
    let mut msg = String::from("----------------------------\n");
    let _ = writeln!(msg, "textModel: {}", ctx.model.name());
    let _ = writeln!(msg, "stack: {}", Backtrace::force_capture());
    let len = states.len();
    for (i, state) in states.iter().enumerate() {
        let id = format!("{}/{}", i + 1, len);
        let view = &state.view_state;
        let model = &state.model_state;
        let _ = writeln!(
            msg,
            "{id}: view state: {} --->>>{}",
            view.selection,
            render_line(&ctx.view_line_content(view.position.line), view.position.byte)
        );
        let _ = writeln!(
            msg,
            "{id}: model state: {} ---->>>{}",
            model.selection,
            render_line(&ctx.model_line_content(model.position.line), model.position.byte)
        );
    }
    msg
}

/// Line text with `|` inserted at `byte` (clamped to a char boundary).
fn render_line(line: &str, byte: usize) -> String {
    let mut at = byte.min(line.len());
    while !line.is_char_boundary(at) {
        at -= 1;
    }
    format!("{}|{}", &line[..at], &line[at..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_line_marks_caret() {
        assert_eq!(render_line("hello", 2), "he|llo");
        assert_eq!(render_line("hello", 99), "hello|");
        assert_eq!(render_line("", 0), "|");
        // inside a multi-byte char snaps back
        assert_eq!(render_line("aé", 2), "a|é");
    }
}
