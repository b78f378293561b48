//! # Composer Rich
//!
//! Segment engine behind the dataset composer's rich fields.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  serialize   ┌──────────────────────┐
//! │ Vec<Segment> │ ───────────→ │ editable tree        │
//! │ (authority)  │ ←─────────── │ (MemoryTree / DOM)   │
//! └──────────────┘    parse     └──────────────────────┘
//!        │
//!        │ project_to_plain_text
//!        ↓
//!   plain string (export, legacy content)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use composer_rich::{parse_markup, serialize, Segment, TokenDescriptor, TokenRegistry};
//!
//! let registry = TokenRegistry::from_tokens([TokenDescriptor::new("eos", "EOS", "</s>")]);
//! let segments = vec![Segment::text("Done"), Segment::token("eos")];
//!
//! let markup = serialize(&segments, &registry);
//! assert_eq!(parse_markup(&markup), segments);
//! ```

pub mod markup;
pub mod parser;
pub mod projector;
pub mod registry;
pub mod segment;
pub mod serializer;
pub mod tree;
pub mod visitor;

pub use parser::{
    is_block_tag, parse, parse_markup, parse_markup_with, parse_with, BlockNewline, ParseOptions,
};
pub use projector::project_to_plain_text;
pub use registry::{TokenDescriptor, TokenRegistry};
pub use segment::{from_plain, is_merged, normalize, Segment, SegmentBuilder};
pub use serializer::{
    build_chip, serialize, serialize_with, Chip, ChipStyle, Serializer, TOKEN_ID_ATTRIBUTE,
};
pub use tree::{EditableTree, MemoryTree, NodeId, NodeKind, Position, Selection};
pub use visitor::{walk_children, walk_node, TreeVisitor};
