//! # Serializer (segments → editable markup)
//!
//! Renders a segment sequence into markup for an editable surface: escaped
//! text runs and atomic, non-editable chip elements.
//!
//! A chip looks like:
//!
//! ```html
//! <span contenteditable="false" data-token-id="tok-1" class="... bg-amber-100">EOS</span>
//! ```
//!
//! Serialization is pure: the same segments, registry and style always
//! produce the same markup.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::markup::{escape_attribute, escape_text};
use crate::registry::TokenRegistry;
use crate::segment::Segment;
use crate::tree::EditableTree;

/// Attribute carrying the token id on a chip element
pub const TOKEN_ID_ATTRIBUTE: &str = "data-token-id";

/// How chips are rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChipStyle {
    /// Classes every chip carries
    #[serde(default = "default_base_class")]
    pub base_class: String,

    /// Color class for tokens without their own color
    #[serde(default = "default_color")]
    pub default_color: String,

    /// Label for ids missing from the registry
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,
}

fn default_base_class() -> String {
    "inline-block align-baseline rounded px-1 py-0.5 text-[10px] font-medium text-slate-800 border border-amber-300 select-none"
        .to_string()
}

fn default_color() -> String {
    "bg-amber-100".to_string()
}

fn default_fallback_label() -> String {
    "TOK".to_string()
}

impl Default for ChipStyle {
    fn default() -> Self {
        Self {
            base_class: default_base_class(),
            default_color: default_color(),
            fallback_label: default_fallback_label(),
        }
    }
}

/// Resolved presentation of one chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub token_id: String,
    pub label: String,
    pub class: String,
}

impl Chip {
    /// Resolve label and color for `token_id`, falling back for unknown ids
    pub fn resolve(token_id: &str, registry: &TokenRegistry, style: &ChipStyle) -> Self {
        let token = registry.get(token_id);
        if token.is_none() {
            debug!(token_id, "Rendering chip for unknown token");
        }
        let label = token
            .map(|t| t.name.clone())
            .unwrap_or_else(|| style.fallback_label.clone());
        let color = token
            .and_then(|t| t.color.as_deref())
            .unwrap_or(&style.default_color);
        let class = if style.base_class.is_empty() {
            color.to_string()
        } else {
            format!("{} {}", style.base_class, color)
        };

        Self {
            token_id: token_id.to_string(),
            label,
            class,
        }
    }

    /// Attributes in rendering order
    pub fn attributes(&self) -> [(&str, &str); 3] {
        [
            ("contenteditable", "false"),
            (TOKEN_ID_ATTRIBUTE, self.token_id.as_str()),
            ("class", self.class.as_str()),
        ]
    }
}

/// Markup writer for segment sequences
pub struct Serializer<'a> {
    registry: &'a TokenRegistry,
    style: &'a ChipStyle,
    buffer: String,
}

impl<'a> Serializer<'a> {
    pub fn new(registry: &'a TokenRegistry, style: &'a ChipStyle) -> Self {
        Self {
            registry,
            style,
            buffer: String::new(),
        }
    }

    pub fn write_segments(&mut self, segments: &[Segment]) {
        for segment in segments {
            match segment {
                Segment::Text { value } => self.write_text(value),
                Segment::Token { token_id } => self.write_chip(token_id),
            }
        }
    }

    fn write_text(&mut self, text: &str) {
        self.buffer.push_str(&escape_text(text));
    }

    fn write_chip(&mut self, token_id: &str) {
        let chip = Chip::resolve(token_id, self.registry, self.style);
        self.buffer.push_str("<span");
        for (name, value) in chip.attributes() {
            self.buffer.push(' ');
            self.buffer.push_str(name);
            self.buffer.push_str("=\"");
            self.buffer.push_str(&escape_attribute(value));
            self.buffer.push('"');
        }
        self.buffer.push('>');
        self.buffer.push_str(&escape_text(&chip.label));
        self.buffer.push_str("</span>");
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

/// Serialize segments with the default chip style
pub fn serialize(segments: &[Segment], registry: &TokenRegistry) -> String {
    serialize_with(segments, registry, &ChipStyle::default())
}

pub fn serialize_with(segments: &[Segment], registry: &TokenRegistry, style: &ChipStyle) -> String {
    let mut serializer = Serializer::new(registry, style);
    serializer.write_segments(segments);
    serializer.finish()
}

/// Create a detached chip element inside `tree`
pub fn build_chip<T: EditableTree + ?Sized>(
    tree: &mut T,
    token_id: &str,
    registry: &TokenRegistry,
    style: &ChipStyle,
) -> T::Node {
    let chip = Chip::resolve(token_id, registry, style);
    let element = tree.create_element("span", &chip.attributes());
    let label = tree.create_text(&chip.label);
    tree.append_child(&element, &label);
    element
}
