//! # TXT Export
//!
//! Flattens a dataset into the training text format:
//!
//! ```text
//! <turn>instruct<start>SYSTEM<end>
//! <turn>user<start>QUESTION<end>
//! <turn>model<start><reason>THINKING</reason><answer>ANSWER<end></answer>
//! <|endoftext|>
//! ```
//!
//! Rich messages are re-projected through the token registry, so chips
//! always expand to the registry's current text.

use composer_rich::TokenRegistry;
use tracing::debug;

use crate::model::{DatasetSettings, DatasetSnapshot, Entry, Message, Role};

/// Written after the last message of every entry
pub const END_OF_TEXT: &str = "<|endoftext|>";

/// Export every entry of a snapshot
pub fn export_txt(snapshot: &DatasetSnapshot) -> String {
    export_entries(&snapshot.entries, &snapshot.settings, &snapshot.registry())
}

pub fn export_entries(
    entries: &[Entry],
    settings: &DatasetSettings,
    registry: &TokenRegistry,
) -> String {
    let mut out = String::new();
    for entry in entries {
        for message in &entry.messages {
            write_message(&mut out, message, settings, registry);
        }
        out.push_str(END_OF_TEXT);
        out.push('\n');
    }
    debug!(entries = entries.len(), bytes = out.len(), "Exported dataset text");
    out
}

fn write_message(
    out: &mut String,
    message: &Message,
    settings: &DatasetSettings,
    registry: &TokenRegistry,
) {
    let content = message.plain_content(registry);

    out.push_str(&settings.turn_token);
    out.push_str(settings.role_token(message.role));
    out.push_str(&settings.start_token);

    match message.role {
        Role::System | Role::User => {
            out.push_str(&content);
            out.push_str(&settings.end_token);
        }
        Role::Model => {
            if let Some(thinking) = message.plain_thinking(registry) {
                out.push_str(&settings.reasoning_token);
                out.push_str(&thinking);
                out.push_str(&settings.reasoning_end_token);
            }
            out.push_str(&settings.answer_token);
            out.push_str(&content);
            out.push_str(&settings.end_token);
            out.push_str(&settings.answer_end_token);
        }
    }
    out.push('\n');
}
