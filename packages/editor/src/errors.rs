//! Error types for the editor

use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] composer_dataset::DatasetError),

    #[error("Cannot edit message {index}: entry has {len} messages")]
    InvalidEditIndex { index: usize, len: usize },
}
