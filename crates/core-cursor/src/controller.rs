//! Owner of the document, view model and cursors.
//!
//! The collection never stores its context; the controller lends it one per
//! call from its own disjoint fields. Edits go through [`CursorController::execute_edits`]
//! which keeps cursors anchored via tracked ranges for the duration of the
//! edit and re-reads them afterwards.

use crate::collection::CursorCollection;
use crate::state::{CursorState, PartialCursorState};
use crate::{CursorConfig, CursorContext};
use core_document::{Document, DocumentError, Edit};
use core_model::ViewModel;
use core_text::Selection;
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

pub struct CursorController {
    document: Document,
    view_model: ViewModel,
    config: CursorConfig,
    cursors: CursorCollection,
}

impl CursorController {
    pub fn new(mut document: Document, view_model: ViewModel, config: CursorConfig) -> Self {
        let cursors = {
            let mut ctx = CursorContext::new(&mut document, &view_model, &config);
            CursorCollection::new(&mut ctx)
        };
        Self {
            document,
            view_model,
            config,
            cursors,
        }
    }

    fn with_context<R>(
        &mut self,
        f: impl FnOnce(&mut CursorCollection, &mut CursorContext<'_>) -> R,
    ) -> R {
        let mut ctx = CursorContext::new(&mut self.document, &self.view_model, &self.config);
        f(&mut self.cursors, &mut ctx)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn view_model(&self) -> &ViewModel {
        &self.view_model
    }

    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    pub fn cursors(&self) -> &CursorCollection {
        &self.cursors
    }

    pub fn selections(&self) -> Vec<Selection> {
        self.cursors.get_selections()
    }

    pub fn view_selections(&self) -> Vec<Selection> {
        self.cursors.get_view_selections()
    }

    pub fn fold(&mut self, header: usize, last: usize) -> bool {
        let changed = self.view_model.fold(header, last);
        if changed {
            self.with_context(|cursors, ctx| cursors.ensure_valid_state(ctx));
        }
        changed
    }

    pub fn unfold(&mut self, header: usize) -> bool {
        let changed = self.view_model.unfold(header);
        if changed {
            self.with_context(|cursors, ctx| cursors.ensure_valid_state(ctx));
        }
        changed
    }

    /// Replace every cursor, keeping at most `multi_cursor_limit` of them, then
    /// merge overlaps. An empty slice is ignored.
    pub fn set_selections(&mut self, selections: &[Selection]) {
        if selections.is_empty() {
            return;
        }
        let limit = self.config.multi_cursor_limit.max(1);
        let kept = if selections.len() > limit {
            warn!(
                target: "cursor.controller",
                requested = selections.len(),
                limit,
                "cursor_limit_reached"
            );
            &selections[..limit]
        } else {
            selections
        };
        self.with_context(|cursors, ctx| {
            cursors.set_selections(ctx, kept);
            cursors.normalize(ctx);
        });
    }

    /// Add one more cursor after the existing ones (Ctrl+click). It becomes
    /// the last added cursor. Returns false when the limit is reached.
    pub fn add_secondary_selection(&mut self, selection: Selection) -> bool {
        if self.cursors.len() >= self.config.multi_cursor_limit.max(1) {
            warn!(
                target: "cursor.controller",
                limit = self.config.multi_cursor_limit,
                "cursor_limit_reached"
            );
            return false;
        }
        let mut states: Vec<PartialCursorState> = self
            .cursors
            .get_all()
            .into_iter()
            .map(PartialCursorState::from)
            .collect();
        states.push(CursorState::from_model_selection(selection));
        self.with_context(|cursors, ctx| {
            cursors.set_states(ctx, Some(states));
            cursors.normalize(ctx);
        });
        true
    }

    pub fn kill_secondary_cursors(&mut self) {
        self.with_context(|cursors, ctx| cursors.kill_secondary_cursors(ctx));
    }

    /// Apply `edits` and move every cursor along with the text it sat on.
    pub fn execute_edits(&mut self, edits: &[Edit]) -> Result<Vec<Selection>, DocumentError> {
        let mut scope = TrackingScope::start(self);
        scope.document.apply_edits(edits)?;
        let selections = scope.with_context(|cursors, ctx| {
            let selections = cursors.read_selection_from_markers(ctx);
            cursors.set_selections(ctx, &selections);
            cursors.normalize(ctx);
            cursors.get_selections()
        });
        debug!(
            target: "cursor.controller",
            edits = edits.len(),
            cursors = selections.len(),
            version = scope.document.version(),
            "edits_executed"
        );
        Ok(selections)
    }

    /// Release every cursor marker and hand the document back.
    pub fn dispose(self) -> Document {
        let Self {
            mut document,
            view_model,
            config,
            cursors,
        } = self;
        let mut ctx = CursorContext::new(&mut document, &view_model, &config);
        cursors.dispose(&mut ctx);
        document
    }
}

/// Cursors track their selections while this is alive.
struct TrackingScope<'c> {
    controller: &'c mut CursorController,
}

impl<'c> TrackingScope<'c> {
    fn start(controller: &'c mut CursorController) -> Self {
        controller.with_context(|cursors, ctx| cursors.start_tracking_selections(ctx));
        Self { controller }
    }
}

impl Drop for TrackingScope<'_> {
    fn drop(&mut self) {
        self.controller
            .with_context(|cursors, ctx| cursors.stop_tracking_selections(ctx));
    }
}

impl Deref for TrackingScope<'_> {
    type Target = CursorController;

    fn deref(&self) -> &CursorController {
        self.controller
    }
}

impl DerefMut for TrackingScope<'_> {
    fn deref_mut(&mut self) -> &mut CursorController {
        self.controller
    }
}
