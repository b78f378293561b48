//! # Parser (editable tree → segments)
//!
//! Walks the live surface after a user edit and rebuilds the segment
//! sequence.
//!
//! ## Rules
//!
//! - Text node: its data, non-breaking spaces turned into plain spaces
//! - Element with a `data-token-id`: one token segment, label not re-read
//! - `<br>`: a line break
//! - Any other element: children walked; block elements (classified by tag
//!   name) start their own line according to [`BlockNewline`]
//! - Comments and unknown node kinds contribute nothing
//!
//! Adjacent text is merged as it is produced and `\r` is stripped at the
//! end. Parsing never fails.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::segment::{Segment, SegmentBuilder};
use crate::serializer::TOKEN_ID_ATTRIBUTE;
use crate::tree::{EditableTree, MemoryTree};
use crate::visitor::{walk_children, TreeVisitor};

/// How block elements map to line breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockNewline {
    /// Blocks are lines: a single `\n` separates a block from whatever
    /// content precedes or follows it, no trailing newline.
    /// `<div>a</div><div>b</div>` reads as `"a\nb"`.
    #[default]
    Separator,

    /// Every block appends `\n` after its children.
    /// `<div>a</div><div>b</div>` reads as `"a\nb\n"`.
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOptions {
    #[serde(default)]
    pub block_newline: BlockNewline,
}

/// Elements that occupy their own line on an editable surface
pub fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "dd"
            | "details"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "summary"
            | "table"
            | "tr"
            | "ul"
    )
}

struct SegmentParser {
    options: ParseOptions,
    builder: SegmentBuilder,
    /// A block just closed; the next content starts a new line
    pending_break: bool,
    /// Something (content or an empty block line) has been emitted
    started: bool,
    /// Number of block elements currently being walked
    block_depth: usize,
}

impl SegmentParser {
    fn new(options: ParseOptions) -> Self {
        Self {
            options,
            builder: SegmentBuilder::new(),
            pending_break: false,
            started: false,
            block_depth: 0,
        }
    }

    fn separator(&self) -> bool {
        self.options.block_newline == BlockNewline::Separator
    }

    fn flush_break(&mut self) {
        if self.pending_break {
            self.pending_break = false;
            self.builder.push_text("\n");
        }
        self.started = true;
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.flush_break();
        self.builder.push_text(text);
    }

    fn push_token(&mut self, token_id: String) {
        self.flush_break();
        self.builder.push_token(token_id);
    }

    fn visit_break<T: EditableTree + ?Sized>(&mut self, tree: &T, node: &T::Node) {
        if self.separator() && self.block_depth > 0 && is_placeholder_break(tree, node) {
            // keeps an otherwise empty line open, adds no text of its own
            self.flush_break();
            return;
        }
        self.push_text("\n");
    }

    fn visit_block<T: EditableTree + ?Sized>(&mut self, tree: &T, node: &T::Node) {
        self.block_depth += 1;
        if self.separator() {
            if self.started && !self.builder.at_line_start() {
                self.pending_break = true;
            }
            walk_children(self, tree, node);
            self.pending_break = true;
        } else {
            walk_children(self, tree, node);
            self.push_text("\n");
        }
        self.block_depth -= 1;
    }

    fn finish(self) -> Vec<Segment> {
        self.builder.finish()
    }
}

impl<T: EditableTree + ?Sized> TreeVisitor<T> for SegmentParser {
    fn visit_element(&mut self, tree: &T, node: &T::Node) {
        if let Some(token_id) = tree.attribute(node, TOKEN_ID_ATTRIBUTE) {
            if !token_id.is_empty() {
                self.push_token(token_id);
                return;
            }
        }

        let tag = tree.tag_name(node).unwrap_or_default();
        if tag == "br" {
            self.visit_break(tree, node);
        } else if is_block_tag(&tag) {
            self.visit_block(tree, node);
        } else {
            walk_children(self, tree, node);
        }
    }

    fn visit_text(&mut self, tree: &T, node: &T::Node) {
        if let Some(text) = tree.text(node) {
            self.push_text(&text.replace('\u{00A0}', " "));
        }
    }
}

/// A `<br>` closing a block element only props the line open
fn is_placeholder_break<T: EditableTree + ?Sized>(tree: &T, node: &T::Node) -> bool {
    let Some(parent) = tree.parent(node) else {
        return false;
    };
    let is_block_parent = tree
        .tag_name(&parent)
        .map(|tag| is_block_tag(&tag))
        .unwrap_or(false);
    is_block_parent && tree.children(&parent).last() == Some(node)
}

/// Parse the children of `root` with default options
pub fn parse<T: EditableTree + ?Sized>(tree: &T, root: &T::Node) -> Vec<Segment> {
    parse_with(tree, root, ParseOptions::default())
}

pub fn parse_with<T: EditableTree + ?Sized>(
    tree: &T,
    root: &T::Node,
    options: ParseOptions,
) -> Vec<Segment> {
    let mut parser = SegmentParser::new(options);
    walk_children(&mut parser, tree, root);
    let segments = parser.finish();
    debug!(segments = segments.len(), "Parsed editable tree");
    segments
}

/// Parse surface markup (an `innerHTML` snapshot)
pub fn parse_markup(markup: &str) -> Vec<Segment> {
    parse_markup_with(markup, ParseOptions::default())
}

pub fn parse_markup_with(markup: &str, options: ParseOptions) -> Vec<Segment> {
    let tree = MemoryTree::from_markup(markup);
    parse_with(&tree, &tree.root(), options)
}
