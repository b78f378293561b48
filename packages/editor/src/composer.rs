//! # Message Composer
//!
//! Draft state for writing the next message of an entry: a content field
//! and a thinking field, each with its own surface and sync state.
//!
//! The composer is either adding a new message (its role follows the
//! conversation: system first, the model after a user turn, the user
//! otherwise) or editing an existing one in place. Submitting writes the
//! draft into the dataset and clears both fields.

use composer_dataset::{DatasetSettings, DatasetSnapshot, Entry, Message, Role};
use composer_rich::{EditableTree, Segment, TokenRegistry};
use tracing::{debug, info};

use crate::errors::{EditorError, EditorResult};
use crate::field::RichField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposerMode {
    #[default]
    Add,
    Edit {
        index: usize,
    },
}

/// Field that receives typing and token inserts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveField {
    #[default]
    Content,
    Thinking,
}

/// Result of [`Composer::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submitted {
    pub index: usize,
    pub role: Role,
    pub replaced: bool,
}

pub struct Composer<T: EditableTree> {
    content: RichField<T>,
    thinking: RichField<T>,
    mode: ComposerMode,
    active: ActiveField,
    reasoning_enabled: bool,
}

impl<T: EditableTree> Composer<T> {
    pub fn new(content: RichField<T>, thinking: RichField<T>) -> Self {
        Self {
            content,
            thinking,
            mode: ComposerMode::Add,
            active: ActiveField::Content,
            reasoning_enabled: true,
        }
    }

    pub fn mode(&self) -> ComposerMode {
        self.mode
    }

    pub fn content(&self) -> &RichField<T> {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut RichField<T> {
        &mut self.content
    }

    pub fn thinking(&self) -> &RichField<T> {
        &self.thinking
    }

    pub fn thinking_mut(&mut self) -> &mut RichField<T> {
        &mut self.thinking
    }

    /// Without reasoning the thinking field is never active
    pub fn active_field(&self) -> ActiveField {
        if self.reasoning_enabled {
            self.active
        } else {
            ActiveField::Content
        }
    }

    pub fn set_active_field(&mut self, field: ActiveField) {
        self.active = field;
    }

    pub fn toggle_field(&mut self) -> ActiveField {
        self.active = match self.active_field() {
            ActiveField::Content => ActiveField::Thinking,
            ActiveField::Thinking => ActiveField::Content,
        };
        self.active_field()
    }

    /// Follow the dataset's reasoning setting; `submit` re-applies it
    pub fn apply_settings(&mut self, settings: &DatasetSettings) {
        self.reasoning_enabled = settings.reasoning_enabled;
    }

    pub fn active_mut(&mut self) -> &mut RichField<T> {
        match self.active_field() {
            ActiveField::Content => &mut self.content,
            ActiveField::Thinking => &mut self.thinking,
        }
    }

    /// Insert a chip into the active field
    pub fn insert_token(&mut self, token_id: &str, registry: &TokenRegistry) -> &[Segment] {
        self.active_mut().insert_token(token_id, registry)
    }

    /// Re-render both fields after the token set changed
    pub fn refresh(&mut self, registry: &TokenRegistry) {
        self.content.refresh(registry);
        self.thinking.refresh(registry);
    }

    /// Load message `index` of `entry` into the fields for editing
    pub fn begin_edit(
        &mut self,
        entry: &Entry,
        index: usize,
        registry: &TokenRegistry,
    ) -> EditorResult<()> {
        let message = entry
            .messages
            .get(index)
            .ok_or(EditorError::InvalidEditIndex {
                index,
                len: entry.messages.len(),
            })?;

        self.content.load(message.content_segments(), registry);
        self.thinking.load(message.thinking_segments(), registry);
        self.mode = ComposerMode::Edit { index };
        self.active = ActiveField::Content;
        debug!(entry = %entry.id, index, "Editing message");
        Ok(())
    }

    /// Build the message the draft describes for `role`
    fn draft_message(&self, role: Role, registry: &TokenRegistry) -> Message {
        let content = self.content.segments().to_vec();
        let message = Message::from_segments(role, content, registry);

        let thinking = self.thinking.segments();
        if role == Role::Model && self.reasoning_enabled && !thinking.is_empty() {
            message.with_thinking(thinking.to_vec(), registry)
        } else {
            message
        }
    }

    /// Write the draft into entry `entry_id`, then clear the composer
    ///
    /// In add mode the message is appended with the next role of the
    /// conversation. In edit mode the message keeps its role and replaces
    /// the one being edited.
    pub fn submit(
        &mut self,
        snapshot: &mut DatasetSnapshot,
        entry_id: &str,
    ) -> EditorResult<Submitted> {
        self.apply_settings(&snapshot.settings);
        let registry = snapshot.registry();
        let entry = snapshot.entry_mut(entry_id)?;

        let submitted = match self.mode {
            ComposerMode::Add => {
                let role = entry.next_role();
                entry.push(self.draft_message(role, &registry));
                Submitted {
                    index: entry.messages.len() - 1,
                    role,
                    replaced: false,
                }
            }
            ComposerMode::Edit { index } => {
                let role = entry
                    .messages
                    .get(index)
                    .map(|message| message.role)
                    .ok_or(EditorError::InvalidEditIndex {
                        index,
                        len: entry.messages.len(),
                    })?;
                entry.replace(index, self.draft_message(role, &registry))?;
                Submitted {
                    index,
                    role,
                    replaced: true,
                }
            }
        };

        info!(
            entry = entry_id,
            index = submitted.index,
            role = ?submitted.role,
            "Message submitted"
        );
        self.clear();
        Ok(submitted)
    }

    /// Back to an empty add-mode draft
    pub fn clear(&mut self) {
        self.content.clear();
        self.thinking.clear();
        self.mode = ComposerMode::Add;
        self.active = ActiveField::Content;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composer_rich::{MemoryTree, TokenDescriptor};

    fn field() -> RichField<MemoryTree> {
        let tree = MemoryTree::new();
        let root = tree.root();
        RichField::mount(tree, root)
    }

    fn composer() -> Composer<MemoryTree> {
        Composer::new(field(), field())
    }

    fn type_into(field: &mut RichField<MemoryTree>, text: &str) {
        let root = *field.root();
        field.tree_mut().set_inner_markup(&root, text);
        field.handle_input();
    }

    fn snapshot() -> DatasetSnapshot {
        let mut snapshot = DatasetSnapshot::default();
        snapshot
            .special_tokens
            .push(TokenDescriptor::new("eos", "EOS", "</s>"));
        snapshot.entries.push(Entry::new("e1"));
        snapshot
    }

    #[test]
    fn test_roles_alternate_on_submit() {
        let mut snapshot = snapshot();
        let mut composer = composer();

        let mut roles = Vec::new();
        for text in ["sys", "question", "answer", "follow-up"] {
            type_into(composer.content_mut(), text);
            roles.push(composer.submit(&mut snapshot, "e1").unwrap().role);
        }

        assert_eq!(roles, vec![Role::System, Role::User, Role::Model, Role::User]);
        let entry = snapshot.entry("e1").unwrap();
        assert_eq!(entry.messages[2].content, "answer");
    }

    #[test]
    fn test_submit_clears_the_draft() {
        let mut snapshot = snapshot();
        let mut composer = composer();

        type_into(composer.content_mut(), "hello");
        composer.insert_token("eos", &snapshot.registry());
        composer.submit(&mut snapshot, "e1").unwrap();

        assert!(composer.content().segments().is_empty());
        assert!(!composer.content().sync().is_suppressing());
        assert_eq!(composer.mode(), ComposerMode::Add);

        let message = &snapshot.entry("e1").unwrap().messages[0];
        assert_eq!(message.content, "hello</s> ");
        assert_eq!(
            message.rich,
            Some(vec![
                Segment::text("hello"),
                Segment::token("eos"),
                Segment::text(" "),
            ])
        );
    }

    #[test]
    fn test_model_message_carries_thinking() {
        let mut snapshot = snapshot();
        let entry = snapshot.entry_mut("e1").unwrap();
        entry.push(Message::plain(Role::System, "sys"));
        entry.push(Message::plain(Role::User, "q"));

        let mut composer = composer();
        type_into(composer.content_mut(), "a");
        composer.toggle_field();
        assert_eq!(composer.active_field(), ActiveField::Thinking);
        type_into(composer.active_mut(), "because");

        let submitted = composer.submit(&mut snapshot, "e1").unwrap();

        assert_eq!(submitted.role, Role::Model);
        let message = &snapshot.entry("e1").unwrap().messages[2];
        assert_eq!(message.content, "a");
        assert_eq!(message.thinking_block.as_deref(), Some("because"));
    }

    #[test]
    fn test_thinking_dropped_without_reasoning() {
        let mut snapshot = snapshot();
        snapshot.settings.reasoning_enabled = false;
        let entry = snapshot.entry_mut("e1").unwrap();
        entry.push(Message::plain(Role::System, "sys"));
        entry.push(Message::plain(Role::User, "q"));

        let mut composer = composer();
        composer.apply_settings(&snapshot.settings);
        assert_eq!(composer.toggle_field(), ActiveField::Content);
        type_into(composer.content_mut(), "a");
        type_into(composer.thinking_mut(), "hidden");

        composer.submit(&mut snapshot, "e1").unwrap();

        let message = &snapshot.entry("e1").unwrap().messages[2];
        assert_eq!(message.thinking_block, None);
    }

    #[test]
    fn test_submit_follows_dataset_reasoning_setting() {
        let mut snapshot = snapshot();
        snapshot.settings.reasoning_enabled = false;
        let entry = snapshot.entry_mut("e1").unwrap();
        entry.push(Message::plain(Role::System, "sys"));
        entry.push(Message::plain(Role::User, "q"));

        let mut composer = composer();
        assert_eq!(composer.toggle_field(), ActiveField::Thinking);
        type_into(composer.thinking_mut(), "hidden");
        type_into(composer.content_mut(), "a");

        composer.submit(&mut snapshot, "e1").unwrap();
        assert_eq!(snapshot.entry("e1").unwrap().messages[2].thinking_block, None);
        assert_eq!(composer.active_field(), ActiveField::Content);
        assert_eq!(composer.toggle_field(), ActiveField::Content);

        snapshot.settings.reasoning_enabled = true;
        snapshot.entry_mut("e1").unwrap().push(Message::plain(Role::User, "q2"));
        type_into(composer.content_mut(), "b");
        type_into(composer.thinking_mut(), "shown");
        composer.submit(&mut snapshot, "e1").unwrap();
        assert!(snapshot.entry("e1").unwrap().messages[4].thinking_block.is_some());
    }

    #[test]
    fn test_edit_replaces_message_in_place() {
        let mut snapshot = snapshot();
        let entry = snapshot.entry_mut("e1").unwrap();
        entry.push(Message::plain(Role::System, "sys"));
        entry.push(Message::plain(Role::User, "old question"));

        let registry = snapshot.registry();
        let mut composer = composer();
        // leftover typing must not block loading the message
        type_into(composer.content_mut(), "stray");
        let entry = snapshot.entry("e1").unwrap().clone();
        composer.begin_edit(&entry, 1, &registry).unwrap();
        assert_eq!(
            composer.content().segments(),
            &[Segment::text("old question")]
        );
        assert_eq!(
            composer.content().tree().inner_markup(composer.content().root()),
            "old question"
        );

        type_into(composer.content_mut(), "new question");
        let submitted = composer.submit(&mut snapshot, "e1").unwrap();

        assert!(submitted.replaced);
        assert_eq!(submitted.role, Role::User);
        let messages = &snapshot.entry("e1").unwrap().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "new question");
    }

    #[test]
    fn test_begin_edit_out_of_range() {
        let mut composer = composer();
        let err = composer
            .begin_edit(&Entry::new("e1"), 3, &TokenRegistry::new())
            .unwrap_err();
        assert!(matches!(
            err,
            EditorError::InvalidEditIndex { index: 3, len: 0 }
        ));
    }

    #[test]
    fn test_submit_to_unknown_entry() {
        let mut snapshot = snapshot();
        let err = composer().submit(&mut snapshot, "missing").unwrap_err();
        assert!(matches!(err, EditorError::Dataset(_)));
    }

    #[test]
    fn test_fields_sync_independently() {
        let mut composer = composer();
        type_into(composer.content_mut(), "typed");

        let registry = TokenRegistry::new();
        let outcome = composer
            .thinking_mut()
            .set_segments(vec![Segment::text("t")], &registry);

        assert_eq!(outcome, crate::SyncOutcome::Overwritten);
        assert!(composer.content().sync().is_suppressing());
    }
}
