//! In-memory editable tree
//!
//! Arena of nodes addressed by [`NodeId`]. Detached nodes stay in the arena
//! until [`MemoryTree::compact`] drops them.

use super::{EditableTree, NodeKind};
use crate::markup;

/// Handle of a node inside a [`MemoryTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeEntry {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Editable tree held in memory, rooted at a `div` surface element
#[derive(Debug, Clone)]
pub struct MemoryTree {
    nodes: Vec<NodeEntry>,
    root: NodeId,
}

impl MemoryTree {
    /// Empty surface
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.alloc(NodeData::Element {
            tag: "div".to_string(),
            attributes: vec![("contenteditable".to_string(), "true".to_string())],
        });
        tree
    }

    /// Surface whose content is `markup`
    pub fn from_markup(markup: &str) -> Self {
        let mut tree = Self::new();
        let root = tree.root;
        tree.set_inner_markup(&root, markup);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every node not attached under the root and renumber the rest
    ///
    /// Returns how many nodes were dropped. The root keeps its id; every
    /// other [`NodeId`] taken before the call is invalid afterwards.
    pub fn compact(&mut self) -> usize {
        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut order = vec![self.root];
        let mut next = 0;
        while let Some(&node) = order.get(next) {
            remap[node.0] = Some(NodeId(next));
            order.extend(self.nodes[node.0].children.iter().copied());
            next += 1;
        }

        let dropped = self.nodes.len() - order.len();
        let nodes = order
            .iter()
            .map(|old| {
                let entry = &self.nodes[old.0];
                NodeEntry {
                    data: entry.data.clone(),
                    parent: entry.parent.and_then(|parent| remap[parent.0]),
                    children: entry.children.iter().filter_map(|c| remap[c.0]).collect(),
                }
            })
            .collect();
        self.nodes = nodes;
        self.root = NodeId(0);
        dropped
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Comment(text.to_string()))
    }

    /// Comment data (None for other kinds)
    pub fn comment(&self, node: NodeId) -> Option<&str> {
        match &self.entry(node).data {
            NodeData::Comment(text) => Some(text),
            _ => None,
        }
    }

    /// Ordered attributes of an element
    pub fn attributes(&self, node: NodeId) -> &[(String, String)] {
        match &self.entry(node).data {
            NodeData::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Append to a text node's data
    pub(crate) fn append_text(&mut self, node: NodeId, text: &str) {
        if let NodeData::Text(data) = &mut self.nodes[node.0].data {
            data.push_str(text);
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.entry(node).data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element { .. } => {
                for &child in &self.entry(node).children {
                    self.collect_text(child, out);
                }
            }
            NodeData::Comment(_) => {}
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn entry(&self, node: NodeId) -> &NodeEntry {
        &self.nodes[node.0]
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != node);
        }
    }
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl EditableTree for MemoryTree {
    type Node = NodeId;

    fn kind(&self, node: &NodeId) -> NodeKind {
        match self.entry(*node).data {
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
        }
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.entry(*node).children.clone()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.entry(*node).parent
    }

    fn text(&self, node: &NodeId) -> Option<String> {
        match &self.entry(*node).data {
            NodeData::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    fn text_len(&self, node: &NodeId) -> usize {
        match &self.entry(*node).data {
            NodeData::Text(text) => text.chars().count(),
            _ => 0,
        }
    }

    fn tag_name(&self, node: &NodeId) -> Option<String> {
        match &self.entry(*node).data {
            NodeData::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.attributes(*node)
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    }

    fn inner_markup(&self, node: &NodeId) -> String {
        let mut out = String::new();
        for child in &self.entry(*node).children {
            write_node(self, *child, &mut out);
        }
        out
    }

    fn set_inner_markup(&mut self, node: &NodeId, source: &str) {
        for child in self.children(node) {
            self.detach(child);
        }
        markup::read_into(self, *node, source);
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    fn create_element(&mut self, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        self.alloc(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: attributes
                .iter()
                .map(|(key, value)| (key.to_ascii_lowercase(), value.to_string()))
                .collect(),
        })
    }

    fn insert_before(&mut self, parent: &NodeId, child: &NodeId, reference: Option<&NodeId>) {
        if self.contains(child, parent) {
            // inserting a node into its own subtree
            return;
        }
        self.detach(*child);
        let siblings = &mut self.nodes[parent.0].children;
        let index = reference
            .and_then(|reference| siblings.iter().position(|sibling| sibling == reference))
            .unwrap_or(siblings.len());
        siblings.insert(index, *child);
        self.nodes[child.0].parent = Some(*parent);
    }

    fn remove(&mut self, node: &NodeId) {
        self.detach(*node);
    }

    fn split_text(&mut self, node: &NodeId, offset: usize) -> NodeId {
        let tail = match &mut self.nodes[node.0].data {
            NodeData::Text(text) => {
                let at = text
                    .char_indices()
                    .nth(offset)
                    .map(|(index, _)| index)
                    .unwrap_or(text.len());
                text.split_off(at)
            }
            _ => String::new(),
        };
        let new_node = self.create_text(&tail);
        if let Some(parent) = self.parent(node) {
            let next = self
                .index_in_parent(node)
                .and_then(|index| self.child_at(&parent, index + 1));
            self.insert_before(&parent, &new_node, next.as_ref());
        }
        new_node
    }
}

fn write_node(tree: &MemoryTree, node: NodeId, out: &mut String) {
    let entry = tree.entry(node);
    match &entry.data {
        NodeData::Text(text) => out.push_str(&markup::escape_text(text)),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Element { tag, attributes } => {
            out.push('<');
            out.push_str(tag);
            for (key, value) in attributes {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&markup::escape_attribute(value));
                out.push('"');
            }
            out.push('>');
            if markup::is_void_tag(tag) {
                return;
            }
            for &child in &entry.children {
                write_node(tree, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}
