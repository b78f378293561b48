//! # Rich Field
//!
//! One mounted editable surface bound to a segment model: the unit a host
//! drives with model changes, user input and token insert requests.
//!
//! ## Flows
//!
//! ```text
//! set_segments ──► SyncController ──► surface (unless suppressed)
//!
//! handle_input ──► parse surface ──► segments ──► on_change
//!                      └─► mark_user_edit (next set_segments is swallowed)
//!
//! insert_token ──► chip + space at the caret ──► handle_input
//! ```

use composer_rich::{
    parse_with, ChipStyle, EditableTree, ParseOptions, Segment, Selection, TokenRegistry,
};
use tracing::debug;

use crate::insertion::{insert_token, Insertion};
use crate::sync::{SyncController, SyncOutcome};

type ChangeCallback = Box<dyn FnMut(&[Segment])>;

pub struct RichField<T: EditableTree> {
    tree: T,
    root: T::Node,
    segments: Vec<Segment>,
    sync: SyncController,
    selection: Option<Selection<T::Node>>,
    style: ChipStyle,
    options: ParseOptions,
    on_change: Option<ChangeCallback>,
}

impl<T: EditableTree> RichField<T> {
    /// Bind a field to the surface `root` inside `tree`
    pub fn mount(tree: T, root: T::Node) -> Self {
        Self {
            tree,
            root,
            segments: Vec::new(),
            sync: SyncController::new(),
            selection: None,
            style: ChipStyle::default(),
            options: ParseOptions::default(),
            on_change: None,
        }
    }

    pub fn with_style(mut self, style: ChipStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Register the callback fired with the new segments after every user edit
    pub fn on_change(&mut self, callback: impl FnMut(&[Segment]) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Direct access to the surface, for applying host edits before
    /// [`RichField::handle_input`]
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn root(&self) -> &T::Node {
        &self.root
    }

    pub fn sync(&self) -> &SyncController {
        &self.sync
    }

    pub fn style(&self) -> &ChipStyle {
        &self.style
    }

    pub fn selection(&self) -> Option<&Selection<T::Node>> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Selection<T::Node>>) {
        self.selection = selection;
    }

    /// Model-change notification
    pub fn set_segments(
        &mut self,
        segments: Vec<Segment>,
        registry: &TokenRegistry,
    ) -> SyncOutcome {
        self.segments = segments;
        self.sync.on_model_change(
            &mut self.tree,
            &self.root,
            &self.segments,
            registry,
            &self.style,
        )
    }

    /// Replace the model and render it, ignoring any pending suppression
    pub fn load(&mut self, segments: Vec<Segment>, registry: &TokenRegistry) -> SyncOutcome {
        self.sync.reset();
        self.set_segments(segments, registry)
    }

    /// Re-render the current model, e.g. after token names or colors changed
    ///
    /// Like [`RichField::load`], a pending suppression is dropped first.
    pub fn refresh(&mut self, registry: &TokenRegistry) -> SyncOutcome {
        self.sync.reset();
        let segments = std::mem::take(&mut self.segments);
        self.set_segments(segments, registry)
    }

    /// User-edit path: re-read the surface into the model
    pub fn handle_input(&mut self) -> &[Segment] {
        self.segments = parse_with(&self.tree, &self.root, self.options);
        self.sync.mark_user_edit();
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.segments);
        }
        &self.segments
    }

    /// Insert a chip at the current selection and run the user-edit path
    pub fn insert_token(&mut self, token_id: &str, registry: &TokenRegistry) -> &[Segment] {
        let Insertion { caret, .. } = insert_token(
            &mut self.tree,
            &self.root,
            self.selection.as_ref(),
            token_id,
            registry,
            &self.style,
        );
        self.selection = Some(Selection::collapsed(caret));
        self.handle_input()
    }

    /// Empty the surface and the model, dropping any pending suppression
    pub fn clear(&mut self) {
        self.tree.set_inner_markup(&self.root, "");
        self.segments.clear();
        self.sync.reset();
        self.selection = None;
        debug!("Field cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composer_rich::{MemoryTree, NodeId, Position, TokenDescriptor};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn registry() -> TokenRegistry {
        TokenRegistry::from_tokens([TokenDescriptor::new("eos", "EOS", "</s>")])
    }

    fn field(markup: &str) -> RichField<MemoryTree> {
        let tree = MemoryTree::from_markup(markup);
        let root = tree.root();
        RichField::mount(tree, root)
    }

    /// Simulate typing by appending to the first text node
    fn type_text(field: &mut RichField<MemoryTree>, text: &str) {
        let root = *field.root();
        let tree = field.tree_mut();
        let node: NodeId = match tree.child_at(&root, 0) {
            Some(node) => node,
            None => {
                let node = tree.create_text("");
                tree.append_child(&root, &node);
                node
            }
        };
        let current = tree.text(&node).unwrap_or_default();
        let replacement = tree.create_text(&format!("{current}{text}"));
        tree.insert_before(&root, &replacement, Some(&node));
        tree.remove(&node);
    }

    #[test]
    fn test_set_segments_renders_surface() {
        let mut field = field("");
        let outcome = field.set_segments(vec![Segment::text("hi")], &registry());

        assert_eq!(outcome, SyncOutcome::Overwritten);
        assert_eq!(field.tree().inner_markup(field.root()), "hi");
    }

    #[test]
    fn test_user_edit_is_not_overwritten_by_echo() {
        let mut field = field("");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        field.on_change(move |segments| sink.borrow_mut().push(segments.to_vec()));

        type_text(&mut field, "hey");
        let segments = field.handle_input().to_vec();
        assert_eq!(segments, vec![Segment::text("hey")]);
        assert_eq!(seen.borrow().len(), 1);

        // the host echoes the model back
        let outcome = field.set_segments(segments, &registry());
        assert_eq!(outcome, SyncOutcome::Suppressed);

        // a real external change afterwards goes through
        let outcome = field.set_segments(vec![Segment::text("reset")], &registry());
        assert_eq!(outcome, SyncOutcome::Overwritten);
        assert_eq!(field.tree().inner_markup(field.root()), "reset");
    }

    #[test]
    fn test_insert_token_without_selection() {
        let mut field = field("hello");
        let segments = field.insert_token("eos", &registry()).to_vec();

        assert_eq!(
            segments,
            vec![Segment::text("hello"), Segment::token("eos"), Segment::text(" ")]
        );
        assert!(field.sync().is_suppressing());

        let caret = &field.selection().unwrap().focus;
        assert_eq!(caret.offset, 1);
        assert_eq!(field.tree().text(&caret.node).as_deref(), Some(" "));
    }

    #[test]
    fn test_consecutive_inserts_follow_the_caret() {
        let mut field = field("a");
        let root = *field.root();
        let text = field.tree().child_at(&root, 0).unwrap();
        field.set_selection(Some(Selection::collapsed(Position::new(text, 0))));

        field.insert_token("eos", &registry());
        let segments = field.insert_token("eos", &registry()).to_vec();

        assert_eq!(
            segments,
            vec![
                Segment::token("eos"),
                Segment::text(" "),
                Segment::token("eos"),
                Segment::text(" a"),
            ]
        );
    }

    #[test]
    fn test_load_ignores_pending_suppression() {
        let mut field = field("typed");
        field.handle_input();

        let outcome = field.load(vec![Segment::text("loaded")], &registry());

        assert_eq!(outcome, SyncOutcome::Overwritten);
        assert_eq!(field.tree().inner_markup(field.root()), "loaded");
    }

    #[test]
    fn test_refresh_picks_up_renamed_tokens() {
        let mut field = field("");
        field.set_segments(vec![Segment::token("eos")], &registry());

        let renamed = TokenRegistry::from_tokens([TokenDescriptor::new("eos", "END", "</s>")]);
        assert_eq!(field.refresh(&renamed), SyncOutcome::Overwritten);
        assert!(field.tree().inner_markup(field.root()).contains(">END</span>"));
    }

    #[test]
    fn test_refresh_after_unechoed_insert_renders() {
        let mut field = field("hi ");
        field.insert_token("eos", &registry());
        assert!(field.sync().is_suppressing());

        let renamed = TokenRegistry::from_tokens([TokenDescriptor::new("eos", "END", "</s>")]);
        assert_eq!(field.refresh(&renamed), SyncOutcome::Overwritten);
        assert!(!field.sync().is_suppressing());
        assert!(field.tree().inner_markup(field.root()).contains(">END</span>"));
        assert_eq!(field.segments()[1], Segment::token("eos"));
    }

    #[test]
    fn test_clear_resets_surface_and_flag() {
        let mut field = field("x");
        field.handle_input();
        field.clear();

        assert!(field.segments().is_empty());
        assert!(!field.sync().is_suppressing());
        assert_eq!(field.tree().inner_markup(field.root()), "");
    }
}
