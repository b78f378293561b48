//! # Composer Dataset
//!
//! Dataset model (categories, entries, messages, export settings) and the
//! TXT export used to produce training files.

mod error;
mod export;
mod model;

pub use error::{DatasetError, DatasetResult};
pub use export::{export_entries, export_txt, END_OF_TEXT};
pub use model::{
    Category, DatasetSettings, DatasetSnapshot, Entry, Message, Role, DEFAULT_CATEGORY_ID,
    DEFAULT_CATEGORY_NAME,
};
