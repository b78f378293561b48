//! # Plain-Text Projector
//!
//! Flattens segments into a token-free string by substituting each token's
//! expansion text. Used for the legacy plain `content` field and for dataset
//! export.

use crate::registry::TokenRegistry;
use crate::segment::Segment;

/// Expand `segments` into plain text; unknown tokens expand to nothing
pub fn project_to_plain_text(segments: &[Segment], registry: &TokenRegistry) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text { value } => out.push_str(value),
            Segment::Token { token_id } => out.push_str(registry.expansion(token_id)),
        }
    }
    out
}
