//! # Editable Tree
//!
//! Abstraction over the live, user-editable surface the engine renders into
//! and reads back from.
//!
//! The engine only needs a handful of DOM-like operations: walking children,
//! reading text and attributes, replacing the content wholesale and a few
//! surgical inserts. [`MemoryTree`] implements them in memory; a browser host
//! wraps its `contenteditable` element behind the same trait.
//!
//! Text offsets (in [`Position`] and [`EditableTree::split_text`]) use the
//! host's native text units: chars for [`MemoryTree`], UTF-16 code units for
//! a browser DOM. The engine never converts between them.

mod memory;

pub use memory::{MemoryTree, NodeId};

use std::fmt::Debug;

/// Kind of a node in an editable tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    /// Anything else the host exposes (processing instructions, ...)
    Other,
}

/// DOM-like view of an editable surface
///
/// Operations are infallible from the engine's point of view. Hosts whose
/// primitives can fail (a browser DOM) log and skip the failed step.
pub trait EditableTree {
    type Node: Clone + PartialEq + Debug;

    fn kind(&self, node: &Self::Node) -> NodeKind;

    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Data of a text node (None for other kinds)
    fn text(&self, node: &Self::Node) -> Option<String>;

    /// Length of a text node in host text units (0 for other kinds)
    fn text_len(&self, node: &Self::Node) -> usize;

    /// Lowercase tag name of an element
    fn tag_name(&self, node: &Self::Node) -> Option<String>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Markup of the node's children (`innerHTML`)
    fn inner_markup(&self, node: &Self::Node) -> String;

    /// Replace all children of `node` with the content described by `markup`
    fn set_inner_markup(&mut self, node: &Self::Node, markup: &str);

    /// Create a detached text node
    fn create_text(&mut self, text: &str) -> Self::Node;

    /// Create a detached, empty element
    fn create_element(&mut self, tag: &str, attributes: &[(&str, &str)]) -> Self::Node;

    /// Insert `child` into `parent` before `reference` (append when None)
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: Option<&Self::Node>,
    );

    /// Detach `node` from its parent
    fn remove(&mut self, node: &Self::Node);

    /// Split a text node at `offset`; returns the new node holding the tail,
    /// inserted right after the original
    fn split_text(&mut self, node: &Self::Node, offset: usize) -> Self::Node;

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) {
        self.insert_before(parent, child, None);
    }

    fn child_at(&self, parent: &Self::Node, index: usize) -> Option<Self::Node> {
        self.children(parent).into_iter().nth(index)
    }

    fn child_count(&self, node: &Self::Node) -> usize {
        self.children(node).len()
    }

    fn index_in_parent(&self, node: &Self::Node) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(&parent).iter().position(|child| child == node)
    }

    /// True when `node` is `ancestor` or one of its descendants
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if &n == ancestor {
                return true;
            }
            current = self.parent(&n);
        }
        false
    }
}

/// A boundary point inside an editable tree
///
/// In a text node `offset` counts text units; in an element it is a child
/// index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> Position<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Caret or ranged selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<N> {
    pub anchor: Position<N>,
    pub focus: Position<N>,
}

impl<N: Clone + PartialEq> Selection<N> {
    pub fn collapsed(position: Position<N>) -> Self {
        Self {
            anchor: position.clone(),
            focus: position,
        }
    }

    pub fn range(anchor: Position<N>, focus: Position<N>) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}
