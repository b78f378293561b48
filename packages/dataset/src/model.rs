//! # Dataset Model
//!
//! Categories, entries and role-tagged messages, in the JSON shape the
//! composer stores and exports (`camelCase` keys).
//!
//! Messages keep a plain `content` string next to the optional rich
//! segments. Older datasets only have `content`; those messages are edited
//! as a single text segment.

use composer_rich::{from_plain, project_to_plain_text, Segment, TokenDescriptor, TokenRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{DatasetError, DatasetResult};

pub const DEFAULT_CATEGORY_ID: &str = "default-category";
pub const DEFAULT_CATEGORY_NAME: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Model,
}

impl Role {
    /// Role of the next message appended after `messages`
    ///
    /// An empty conversation starts with the system prompt, a user turn is
    /// answered by the model, anything else is followed by the user.
    pub fn next_after(messages: &[Message]) -> Role {
        match messages.last() {
            None => Role::System,
            Some(last) if last.role == Role::User => Role::Model,
            Some(_) => Role::User,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,

    /// Plain projection of `rich`, or the only content for legacy messages
    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_block: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich: Option<Vec<Segment>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_rich: Option<Vec<Segment>>,
}

impl Message {
    /// Plain-text message without rich segments
    pub fn plain(role: Role, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            role,
            rich: Some(from_plain(&content)),
            content,
            thinking_block: None,
            thinking_rich: None,
        }
    }

    /// Message whose plain content is projected from `segments`
    pub fn from_segments(role: Role, segments: Vec<Segment>, registry: &TokenRegistry) -> Self {
        Self {
            role,
            content: project_to_plain_text(&segments, registry),
            thinking_block: None,
            rich: Some(segments),
            thinking_rich: None,
        }
    }

    pub fn with_thinking(mut self, segments: Vec<Segment>, registry: &TokenRegistry) -> Self {
        self.thinking_block = Some(project_to_plain_text(&segments, registry));
        self.thinking_rich = Some(segments);
        self
    }

    /// Segments to edit for the message body
    pub fn content_segments(&self) -> Vec<Segment> {
        match &self.rich {
            Some(segments) => segments.clone(),
            None => from_plain(&self.content),
        }
    }

    /// Segments to edit for the thinking block (empty when there is none)
    pub fn thinking_segments(&self) -> Vec<Segment> {
        match (&self.thinking_rich, &self.thinking_block) {
            (Some(segments), _) => segments.clone(),
            (None, Some(text)) => from_plain(text),
            (None, None) => Vec::new(),
        }
    }

    /// Body text with token expansions from the current registry
    pub fn plain_content(&self, registry: &TokenRegistry) -> String {
        match &self.rich {
            Some(segments) => project_to_plain_text(segments, registry),
            None => self.content.clone(),
        }
    }

    /// Thinking text, None when absent or empty
    pub fn plain_thinking(&self, registry: &TokenRegistry) -> Option<String> {
        let text = match &self.thinking_rich {
            Some(segments) => project_to_plain_text(segments, registry),
            None => self.thinking_block.clone()?,
        };
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,

    #[serde(default = "default_category_id")]
    pub category_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub messages: Vec<Message>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Entry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category_id: default_category_id(),
            title: None,
            messages: Vec::new(),
            created_at: None,
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Replace the message at `index`
    pub fn replace(&mut self, index: usize, message: Message) -> DatasetResult<()> {
        let len = self.messages.len();
        let slot = self
            .messages
            .get_mut(index)
            .ok_or(DatasetError::MessageOutOfRange { index, len })?;
        *slot = message;
        Ok(())
    }

    pub fn next_role(&self) -> Role {
        Role::next_after(&self.messages)
    }
}

fn default_category_id() -> String {
    DEFAULT_CATEGORY_ID.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
}

impl Category {
    pub fn uncategorized() -> Self {
        Self {
            id: DEFAULT_CATEGORY_ID.to_string(),
            name: DEFAULT_CATEGORY_NAME.to_string(),
            collapsed: None,
        }
    }
}

/// Markers written around each turn on TXT export
///
/// Missing keys in stored settings fall back to these defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetSettings {
    pub turn_token: String,
    pub start_token: String,
    pub end_token: String,
    pub reasoning_token: String,
    pub reasoning_end_token: String,
    pub answer_token: String,
    pub answer_end_token: String,
    pub system_token: String,
    pub user_token: String,
    pub model_token: String,
    pub reasoning_enabled: bool,
    pub default_system_message: String,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            turn_token: "<turn>".to_string(),
            start_token: "<start>".to_string(),
            end_token: "<end>".to_string(),
            reasoning_token: "<reason>".to_string(),
            reasoning_end_token: "</reason>".to_string(),
            answer_token: "<answer>".to_string(),
            answer_end_token: "</answer>".to_string(),
            system_token: "instruct".to_string(),
            user_token: "user".to_string(),
            model_token: "model".to_string(),
            reasoning_enabled: true,
            default_system_message: String::new(),
        }
    }
}

impl DatasetSettings {
    pub fn role_token(&self, role: Role) -> &str {
        match role {
            Role::System => &self.system_token,
            Role::User => &self.user_token,
            Role::Model => &self.model_token,
        }
    }
}

/// Whole dataset, as saved, imported and exported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSnapshot {
    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub entries: Vec<Entry>,

    #[serde(default)]
    pub settings: DatasetSettings,

    #[serde(default)]
    pub special_tokens: Vec<TokenDescriptor>,
}

impl Default for DatasetSnapshot {
    fn default() -> Self {
        Self {
            categories: vec![Category::uncategorized()],
            entries: Vec::new(),
            settings: DatasetSettings::default(),
            special_tokens: Vec::new(),
        }
    }
}

impl DatasetSnapshot {
    /// Parse a stored snapshot, filling in the default category if needed
    pub fn from_json(source: &str) -> DatasetResult<Self> {
        let mut snapshot: DatasetSnapshot = serde_json::from_str(source)?;
        if snapshot.categories.is_empty() {
            snapshot.categories.push(Category::uncategorized());
        }
        debug!(
            entries = snapshot.entries.len(),
            tokens = snapshot.special_tokens.len(),
            "Loaded dataset snapshot"
        );
        Ok(snapshot)
    }

    pub fn to_json_pretty(&self) -> DatasetResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> DatasetResult<Self> {
        let source = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json(&source)?;
        info!(path = %path.display(), "Dataset loaded");
        Ok(snapshot)
    }

    pub fn save(&self, path: &Path) -> DatasetResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        info!(path = %path.display(), "Dataset saved");
        Ok(())
    }

    /// Token registry built from the special tokens
    pub fn registry(&self) -> TokenRegistry {
        TokenRegistry::from_tokens(self.special_tokens.iter().cloned())
    }

    pub fn entry(&self, id: &str) -> DatasetResult<&Entry> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| DatasetError::EntryNotFound(id.to_string()))
    }

    pub fn entry_mut(&mut self, id: &str) -> DatasetResult<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| DatasetError::EntryNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TokenRegistry {
        TokenRegistry::from_tokens([TokenDescriptor::new("eos", "EOS", "</s>")])
    }

    #[test]
    fn test_next_role_alternation() {
        let mut messages = Vec::new();
        assert_eq!(Role::next_after(&messages), Role::System);

        messages.push(Message::plain(Role::System, "sys"));
        assert_eq!(Role::next_after(&messages), Role::User);

        messages.push(Message::plain(Role::User, "hi"));
        assert_eq!(Role::next_after(&messages), Role::Model);

        messages.push(Message::plain(Role::Model, "hello"));
        assert_eq!(Role::next_after(&messages), Role::User);
    }

    #[test]
    fn test_legacy_message_segments() {
        let json = r#"{ "role": "user", "content": "old text" }"#;
        let message: Message = serde_json::from_str(json).unwrap();

        assert_eq!(message.rich, None);
        assert_eq!(message.content_segments(), vec![Segment::text("old text")]);
        assert!(message.thinking_segments().is_empty());
        assert_eq!(message.plain_content(&registry()), "old text");
    }

    #[test]
    fn test_rich_message_projects_content() {
        let message = Message::from_segments(
            Role::Model,
            vec![Segment::text("done"), Segment::token("eos")],
            &registry(),
        )
        .with_thinking(vec![Segment::text("hmm")], &registry());

        assert_eq!(message.content, "done</s>");
        assert_eq!(message.thinking_block.as_deref(), Some("hmm"));
        assert_eq!(message.plain_thinking(&registry()).as_deref(), Some("hmm"));

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["thinkingRich"][0]["value"], "hmm");
        assert_eq!(json["rich"][1]["tokenId"], "eos");
    }

    #[test]
    fn test_empty_thinking_is_none() {
        let message = Message::plain(Role::Model, "x").with_thinking(Vec::new(), &registry());
        assert_eq!(message.plain_thinking(&registry()), None);
    }

    #[test]
    fn test_settings_merge_over_defaults() {
        let snapshot = DatasetSnapshot::from_json(
            r#"{ "settings": { "turnToken": "<|turn|>", "reasoningEnabled": false } }"#,
        )
        .unwrap();

        assert_eq!(snapshot.settings.turn_token, "<|turn|>");
        assert!(!snapshot.settings.reasoning_enabled);
        assert_eq!(snapshot.settings.start_token, "<start>");
        assert_eq!(snapshot.categories, vec![Category::uncategorized()]);
    }

    #[test]
    fn test_replace_out_of_range() {
        let mut entry = Entry::new("e1");
        let err = entry.replace(0, Message::plain(Role::User, "x")).unwrap_err();
        assert!(matches!(err, DatasetError::MessageOutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn test_entry_lookup() {
        let mut snapshot = DatasetSnapshot::default();
        snapshot.entries.push(Entry::new("e1"));

        assert!(snapshot.entry("e1").is_ok());
        assert!(matches!(
            snapshot.entry("nope"),
            Err(DatasetError::EntryNotFound(_))
        ));
    }
}
