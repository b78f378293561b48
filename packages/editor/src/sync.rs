//! # Sync Controller
//!
//! Keeps an editable surface in step with its segment model without
//! fighting the user.
//!
//! A user edit is parsed into the model, and the host then echoes the new
//! model back as a model-change notification. Re-rendering at that point
//! would rebuild the surface from scratch and throw away the caret, so the
//! user-input path raises a one-shot flag that swallows exactly the next
//! notification.

use composer_rich::{serialize_with, ChipStyle, EditableTree, Segment, TokenRegistry};
use tracing::debug;

/// What a model-change notification did to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Swallowed by a preceding user edit
    Suppressed,
    /// Surface already showed this markup
    Unchanged,
    /// Surface content was replaced
    Overwritten,
}

#[derive(Debug, Clone, Default)]
pub struct SyncController {
    suppress_next: bool,
}

impl SyncController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called on the user-input path, before the model is updated
    pub fn mark_user_edit(&mut self) {
        self.suppress_next = true;
    }

    pub fn is_suppressing(&self) -> bool {
        self.suppress_next
    }

    /// Drop a pending suppression (hard resets)
    pub fn reset(&mut self) {
        self.suppress_next = false;
    }

    pub fn on_model_change<T: EditableTree + ?Sized>(
        &mut self,
        tree: &mut T,
        root: &T::Node,
        segments: &[Segment],
        registry: &TokenRegistry,
        style: &ChipStyle,
    ) -> SyncOutcome {
        if self.suppress_next {
            self.suppress_next = false;
            debug!("Model change follows a user edit, surface left alone");
            return SyncOutcome::Suppressed;
        }

        let markup = serialize_with(segments, registry, style);
        if tree.inner_markup(root) == markup {
            return SyncOutcome::Unchanged;
        }

        tree.set_inner_markup(root, &markup);
        debug!(segments = segments.len(), "Surface re-rendered from model");
        SyncOutcome::Overwritten
    }
}
