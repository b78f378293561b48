//! # Markup Codec
//!
//! Reads and writes the `innerHTML`-style markup of an editable surface.
//!
//! This is not an HTML parser. It understands what an editable surface
//! emits: elements with attributes, text, character references and comments.
//! Anything it cannot make sense of is kept as literal text, so reading never
//! fails. Lexing uses logos, one lexer for the markup stream and one for the
//! attribute list inside a start tag.

use logos::Logos;

use crate::tree::{EditableTree, MemoryTree, NodeId, NodeKind};

/// Tokens of the markup stream
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum MarkupToken<'src> {
    #[regex(r#"<[a-zA-Z][a-zA-Z0-9-]*(\s+[^\s"'>/=]+(\s*=\s*("[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*\s*/?>"#, |lex| lex.slice())]
    StartTag(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*\s*>", |lex| {
        let s = lex.slice();
        s[2..s.len() - 1].trim()
    })]
    EndTag(&'src str),

    #[regex(r"<!--([^-]|-[^-])*-->", |lex| {
        let s = lex.slice();
        &s[4..s.len() - 3]
    })]
    Comment(&'src str),

    /// `<!DOCTYPE ...>` and friends, dropped
    #[regex(r"<![^>-][^>]*>")]
    Declaration,

    #[regex(r"&([a-zA-Z]+|#[0-9]+|#[xX][0-9a-fA-F]+);", |lex| lex.slice())]
    CharRef(&'src str),

    #[regex(r"[^<&]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Tokens inside a start tag, after the tag name
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"\s+")]
enum AttrToken<'src> {
    #[regex(r#"[^\s"'>/=]+"#, |lex| lex.slice())]
    Name(&'src str),

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    Quoted(&'src str),

    #[token("/")]
    Slash,
}

/// A lexed start tag
#[derive(Debug, Clone, PartialEq)]
pub struct StartTag {
    /// Lowercase tag name
    pub name: String,
    /// Attributes in source order, names lowercased, values decoded
    pub attributes: Vec<(String, String)>,
    pub self_closing: bool,
}

/// Elements that never have children or an end tag
pub fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Escape text content: `&` first so later entities are not double-escaped
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape a double-quoted attribute value
pub fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Decode one character reference (`&amp;`, `&#60;`, `&#x3C;`)
///
/// Unknown or invalid references are returned unchanged.
pub fn decode_char_ref(reference: &str) -> String {
    let body = &reference[1..reference.len() - 1];
    let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = body.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        match body {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{00A0}'),
            _ => None,
        }
    };
    match decoded {
        Some(ch) => ch.to_string(),
        None => reference.to_string(),
    }
}

/// Decode every character reference in `text`
pub fn decode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut lexer = MarkupToken::lexer(text);
    while let Some(result) = lexer.next() {
        match result {
            Ok(MarkupToken::CharRef(reference)) => out.push_str(&decode_char_ref(reference)),
            _ => out.push_str(lexer.slice()),
        }
    }
    out
}

/// Split a lexed start tag into name and attributes
pub fn parse_start_tag(slice: &str) -> StartTag {
    let inner = slice.trim_start_matches('<').trim_end_matches('>');
    let name_end = inner
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_ascii_lowercase();
    let rest = &inner[name_end..];

    let mut attributes: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;
    let mut tokens = AttrToken::lexer(rest).filter_map(Result::ok).peekable();

    while let Some(token) = tokens.next() {
        match token {
            AttrToken::Name(key) => {
                self_closing = false;
                let value = if tokens.peek() == Some(&AttrToken::Eq) {
                    tokens.next();
                    match tokens.next() {
                        Some(AttrToken::Quoted(value)) | Some(AttrToken::Name(value)) => {
                            decode_text(value)
                        }
                        _ => String::new(),
                    }
                } else {
                    String::new()
                };
                let key = key.to_ascii_lowercase();
                if !attributes.iter().any(|(existing, _)| *existing == key) {
                    attributes.push((key, value));
                }
            }
            AttrToken::Slash => self_closing = true,
            AttrToken::Eq | AttrToken::Quoted(_) => {}
        }
    }

    StartTag {
        name,
        attributes,
        self_closing,
    }
}

/// Parse `source` and append the resulting nodes under `target`
pub fn read_into(tree: &mut MemoryTree, target: NodeId, source: &str) {
    let mut open: Vec<NodeId> = vec![target];
    let mut lexer = MarkupToken::lexer(source);

    while let Some(result) = lexer.next() {
        let parent = open.last().copied().unwrap_or(target);
        match result {
            Ok(MarkupToken::StartTag(slice)) => {
                let tag = parse_start_tag(slice);
                let attributes: Vec<(&str, &str)> = tag
                    .attributes
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str()))
                    .collect();
                let element = tree.create_element(&tag.name, &attributes);
                tree.append_child(&parent, &element);
                if !tag.self_closing && !is_void_tag(&tag.name) {
                    open.push(element);
                }
            }
            Ok(MarkupToken::EndTag(name)) => {
                let name = name.to_ascii_lowercase();
                // the target itself is never closed by the markup
                let matching = open
                    .iter()
                    .skip(1)
                    .rposition(|node| tree.tag_name(node).as_deref() == Some(name.as_str()));
                if let Some(index) = matching {
                    open.truncate(index + 1);
                }
            }
            Ok(MarkupToken::Comment(text)) => {
                let comment = tree.create_comment(text);
                tree.append_child(&parent, &comment);
            }
            Ok(MarkupToken::Declaration) => {}
            Ok(MarkupToken::CharRef(reference)) => {
                push_text(tree, parent, &decode_char_ref(reference));
            }
            Ok(MarkupToken::Text(text)) => push_text(tree, parent, text),
            Err(()) => push_text(tree, parent, lexer.slice()),
        }
    }
}

/// Append text, extending a trailing text node like a browser does
fn push_text(tree: &mut MemoryTree, parent: NodeId, text: &str) {
    if text.is_empty() {
        return;
    }
    let last = tree.children(&parent).last().copied();
    match last {
        Some(node) if tree.kind(&node) == NodeKind::Text => tree.append_text(node, text),
        _ => {
            let node = tree.create_text(text);
            tree.append_child(&parent, &node);
        }
    }
}
