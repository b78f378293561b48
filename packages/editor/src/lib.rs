//! # Composer Editor
//!
//! Editing layer for the dataset composer: binds rich segment models to
//! live editable surfaces.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ rich: segments ⇄ markup, tree abstraction   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: surfaces bound to segment models    │
//! │  - One-shot sync suppression per field      │
//! │  - Chip insertion at the caret              │
//! │  - Content/thinking draft, add/edit/submit  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ dataset: entries, messages, TXT export      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Segments are the source of truth**: surface markup is derived
//! 2. **Never fight the user**: a model change caused by typing does not
//!    re-render the surface
//! 3. **Chips are atomic**: carets and selections never end up inside one
//!
//! ## Usage
//!
//! ```rust,ignore
//! use composer_editor::RichField;
//! use composer_rich::MemoryTree;
//!
//! let tree = MemoryTree::new();
//! let root = tree.root();
//! let mut field = RichField::mount(tree, root);
//!
//! field.on_change(|segments| println!("{segments:?}"));
//! field.set_segments(message.content_segments(), &registry);
//!
//! // after the user typed into the surface
//! field.handle_input();
//! field.insert_token("tok-eos", &registry);
//! ```

mod composer;
mod errors;
mod field;
mod insertion;
mod sync;

pub use composer::{ActiveField, Composer, ComposerMode, Submitted};
pub use errors::{EditorError, EditorResult};
pub use field::RichField;
pub use insertion::{insert_token, Insertion};
pub use sync::{SyncController, SyncOutcome};
