//! # Segment Model
//!
//! The canonical content of one rich field: an ordered sequence of text runs
//! and token references.
//!
//! ## Invariants
//!
//! - No two adjacent text segments (they are always merged)
//! - Text segments carry `\n` for line breaks, never `\r`
//! - An empty sequence is valid and means empty content
//!
//! The JSON shape matches the stored dataset format:
//!
//! ```json
//! [{ "type": "text", "value": "Hi " }, { "type": "token", "tokenId": "tok-1" }]
//! ```

use serde::{Deserialize, Serialize};

/// One unit of rich content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    /// Plain text run
    Text { value: String },

    /// Reference to a registry token by id (may dangle)
    Token {
        #[serde(rename = "tokenId")]
        token_id: String,
    },
}

impl Segment {
    pub fn text(value: impl Into<String>) -> Self {
        Segment::Text {
            value: value.into(),
        }
    }

    pub fn token(token_id: impl Into<String>) -> Self {
        Segment::Token {
            token_id: token_id.into(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Segment::Text { .. })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Segment::Text { value } => Some(value),
            Segment::Token { .. } => None,
        }
    }

    pub fn token_id(&self) -> Option<&str> {
        match self {
            Segment::Token { token_id } => Some(token_id),
            Segment::Text { .. } => None,
        }
    }
}

/// Accumulates segments while keeping the merge invariant
///
/// Text pushed right after text is appended to the previous run instead of
/// starting a new segment.
#[derive(Debug, Default)]
pub struct SegmentBuilder {
    segments: Vec<Segment>,
}

impl SegmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text, merging with a preceding text run
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text { value }) = self.segments.last_mut() {
            value.push_str(text);
        } else {
            self.segments.push(Segment::text(text));
        }
    }

    pub fn push_token(&mut self, token_id: impl Into<String>) {
        self.segments.push(Segment::token(token_id));
    }

    pub fn push(&mut self, segment: Segment) {
        match segment {
            Segment::Text { value } => self.push_text(&value),
            token => self.segments.push(token),
        }
    }

    /// True when the content so far is empty or ends in a line break.
    ///
    /// A trailing token counts as content on the current line.
    pub fn at_line_start(&self) -> bool {
        match self.segments.last() {
            None => true,
            Some(Segment::Text { value }) => value.ends_with('\n'),
            Some(Segment::Token { .. }) => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Finish with final normalization (`\r` stripped, empty runs dropped)
    pub fn finish(self) -> Vec<Segment> {
        normalize(self.segments)
    }
}

/// Normalize an arbitrary segment list
///
/// Strips carriage returns, drops empty text runs and merges adjacent text.
pub fn normalize(segments: impl IntoIterator<Item = Segment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::new();
    for segment in segments {
        match segment {
            Segment::Text { value } => {
                let value = value.replace('\r', "");
                if value.is_empty() {
                    continue;
                }
                if let Some(Segment::Text { value: prev }) = out.last_mut() {
                    prev.push_str(&value);
                } else {
                    out.push(Segment::Text { value });
                }
            }
            token => out.push(token),
        }
    }
    out
}

/// Segments for a token-free string (legacy plain content)
pub fn from_plain(text: &str) -> Vec<Segment> {
    normalize([Segment::text(text)])
}

/// Check the merge invariant: no two consecutive text segments
pub fn is_merged(segments: &[Segment]) -> bool {
    segments
        .windows(2)
        .all(|pair| !(pair[0].is_text() && pair[1].is_text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_merges_adjacent_text() {
        let mut builder = SegmentBuilder::new();
        builder.push_text("Hello");
        builder.push_text(", ");
        builder.push_token("name");
        builder.push_text("!");
        builder.push_text("\n");

        let segments = builder.finish();
        assert_eq!(
            segments,
            vec![
                Segment::text("Hello, "),
                Segment::token("name"),
                Segment::text("!\n"),
            ]
        );
        assert!(is_merged(&segments));
    }

    #[test]
    fn test_builder_ignores_empty_text() {
        let mut builder = SegmentBuilder::new();
        builder.push_text("");
        assert!(builder.is_empty());
        assert!(builder.at_line_start());
    }

    #[test]
    fn test_at_line_start() {
        let mut builder = SegmentBuilder::new();
        builder.push_text("a\n");
        assert!(builder.at_line_start());
        builder.push_token("t");
        assert!(!builder.at_line_start());
    }

    #[test]
    fn test_normalize_strips_carriage_returns() {
        let segments = normalize(vec![
            Segment::text("a\r\n"),
            Segment::text("\r"),
            Segment::text("b"),
            Segment::token("t"),
            Segment::text(""),
        ]);
        assert_eq!(segments, vec![Segment::text("a\nb"), Segment::token("t")]);
    }

    #[test]
    fn test_from_plain_empty() {
        assert!(from_plain("").is_empty());
        assert_eq!(from_plain("x"), vec![Segment::text("x")]);
    }

    #[test]
    fn test_json_shape() {
        let segments = vec![Segment::text("Hi "), Segment::token("tok-1")];
        let json = serde_json::to_string(&segments).unwrap();
        assert_eq!(
            json,
            r#"[{"type":"text","value":"Hi "},{"type":"token","tokenId":"tok-1"}]"#
        );

        let back: Vec<Segment> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, segments);
    }
}
