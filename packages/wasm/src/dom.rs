//! # DOM Surface
//!
//! [`EditableTree`] over a live browser DOM, so the engine can render into
//! and read back from a `contenteditable` element.
//!
//! Text offsets are UTF-16 code units, as the DOM reports them in
//! selections. DOM calls that throw are logged and the step is skipped.

use composer_rich::{EditableTree, NodeKind, Position, Selection};
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Node, Text};

use crate::errors::DomError;

pub struct DomTree {
    document: Document,
}

impl DomTree {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Tree over the document of the current window
    pub fn from_window() -> Result<Self, DomError> {
        let window = web_sys::window().ok_or(DomError::NoWindow)?;
        let document = window.document().ok_or(DomError::NoDocument)?;
        Ok(Self::new(document))
    }
}

fn log_failure(step: &str, result: Result<impl Sized, wasm_bindgen::JsValue>) {
    if let Err(err) = result {
        warn!(step, error = %DomError::from(err), "DOM step skipped");
    }
}

impl EditableTree for DomTree {
    type Node = Node;

    fn kind(&self, node: &Node) -> NodeKind {
        match node.node_type() {
            Node::ELEMENT_NODE => NodeKind::Element,
            Node::TEXT_NODE => NodeKind::Text,
            Node::COMMENT_NODE => NodeKind::Comment,
            _ => NodeKind::Other,
        }
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn text(&self, node: &Node) -> Option<String> {
        match node.node_type() {
            Node::TEXT_NODE => node.node_value(),
            _ => None,
        }
    }

    fn text_len(&self, node: &Node) -> usize {
        node.dyn_ref::<Text>()
            .map(|text| text.length() as usize)
            .unwrap_or(0)
    }

    fn tag_name(&self, node: &Node) -> Option<String> {
        node.dyn_ref::<Element>()
            .map(|element| element.tag_name().to_ascii_lowercase())
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn inner_markup(&self, node: &Node) -> String {
        node.dyn_ref::<Element>()
            .map(|element| element.inner_html())
            .unwrap_or_default()
    }

    fn set_inner_markup(&mut self, node: &Node, markup: &str) {
        if let Some(element) = node.dyn_ref::<Element>() {
            element.set_inner_html(markup);
        }
    }

    fn create_text(&mut self, text: &str) -> Node {
        self.document.create_text_node(text).into()
    }

    fn create_element(&mut self, tag: &str, attributes: &[(&str, &str)]) -> Node {
        match self.document.create_element(tag) {
            Ok(element) => {
                for (name, value) in attributes {
                    log_failure("set_attribute", element.set_attribute(name, value));
                }
                element.into()
            }
            Err(err) => {
                warn!(tag, error = %DomError::from(err), "Element creation failed");
                // stand-in so callers still get a node
                self.document.create_text_node("").into()
            }
        }
    }

    fn insert_before(&mut self, parent: &Node, child: &Node, reference: Option<&Node>) {
        log_failure("insert_before", parent.insert_before(child, reference));
    }

    fn remove(&mut self, node: &Node) {
        if let Some(parent) = node.parent_node() {
            log_failure("remove_child", parent.remove_child(node));
        }
    }

    fn split_text(&mut self, node: &Node, offset: usize) -> Node {
        let split = node
            .dyn_ref::<Text>()
            .map(|text| text.split_text(offset as u32));
        match split {
            Some(Ok(tail)) => tail.into(),
            Some(Err(err)) => {
                warn!(offset, error = %DomError::from(err), "Text split failed");
                self.document.create_text_node("").into()
            }
            None => self.document.create_text_node("").into(),
        }
    }

    fn contains(&self, ancestor: &Node, node: &Node) -> bool {
        ancestor.contains(Some(node))
    }
}

/// Current window selection as a [`Selection`]
pub fn read_selection() -> Option<Selection<Node>> {
    let selection = web_sys::window()?.get_selection().ok()??;
    if selection.range_count() == 0 {
        return None;
    }
    let anchor = selection.anchor_node()?;
    let focus = selection.focus_node()?;
    Some(Selection::range(
        Position::new(anchor, selection.anchor_offset() as usize),
        Position::new(focus, selection.focus_offset() as usize),
    ))
}

/// Collapse the window selection onto `caret`
pub fn place_caret(caret: &Position<Node>) -> Result<(), DomError> {
    let window = web_sys::window().ok_or(DomError::NoWindow)?;
    let selection = window.get_selection()?.ok_or(DomError::NoSelection)?;
    selection.collapse_with_offset(Some(&caret.node), caret.offset as u32)?;
    Ok(())
}
