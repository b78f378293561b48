//! # Token Registry
//!
//! Read-only view of the caller's special tokens, indexed by id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A special token as stored by the surrounding application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub id: String,

    /// Label shown on the chip
    pub name: String,

    /// Text substituted for the chip in plain-text projections
    #[serde(rename = "text", default)]
    pub expansion_text: String,

    /// Color class for the chip (falls back to the chip style default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TokenDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        expansion_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            expansion_text: expansion_text.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Lookup table from token id to descriptor
///
/// Keeps the caller's ordering so listings stay stable. When two
/// descriptors share an id the first one wins.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: Vec<TokenDescriptor>,
    by_id: HashMap<String, usize>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: impl IntoIterator<Item = TokenDescriptor>) -> Self {
        let mut registry = Self::new();
        for token in tokens {
            registry.insert(token);
        }
        registry
    }

    /// Add a descriptor; ignored if the id is already registered
    pub fn insert(&mut self, token: TokenDescriptor) {
        if self.by_id.contains_key(&token.id) {
            return;
        }
        self.by_id.insert(token.id.clone(), self.tokens.len());
        self.tokens.push(token);
    }

    pub fn get(&self, id: &str) -> Option<&TokenDescriptor> {
        self.by_id.get(id).map(|&index| &self.tokens[index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Expansion text for an id, empty for unknown ids
    pub fn expansion(&self, id: &str) -> &str {
        self.get(id)
            .map(|token| token.expansion_text.as_str())
            .unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenDescriptor> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromIterator<TokenDescriptor> for TokenRegistry {
    fn from_iter<I: IntoIterator<Item = TokenDescriptor>>(iter: I) -> Self {
        Self::from_tokens(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_expansion() {
        let registry = TokenRegistry::from_tokens([
            TokenDescriptor::new("a", "ALPHA", "<a>"),
            TokenDescriptor::new("b", "BETA", "<b>").with_color("bg-sky-100"),
        ]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("b").unwrap().name, "BETA");
        assert_eq!(registry.expansion("a"), "<a>");
        assert_eq!(registry.expansion("missing"), "");
        assert!(!registry.contains("missing"));
    }

    #[test]
    fn test_first_descriptor_wins() {
        let registry: TokenRegistry = vec![
            TokenDescriptor::new("a", "FIRST", "1"),
            TokenDescriptor::new("a", "SECOND", "2"),
        ]
        .into_iter()
        .collect();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").unwrap().name, "FIRST");
    }

    #[test]
    fn test_stored_json_shape() {
        let json = r#"[
            { "id": "t1", "name": "EOS", "text": "</s>", "color": "bg-rose-100" },
            { "id": "t2", "name": "BOS" }
        ]"#;

        let tokens: Vec<TokenDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(tokens[0].expansion_text, "</s>");
        assert_eq!(tokens[0].color.as_deref(), Some("bg-rose-100"));
        assert_eq!(tokens[1].expansion_text, "");
        assert_eq!(tokens[1].color, None);
    }
}
