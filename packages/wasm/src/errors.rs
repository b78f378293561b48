//! Error types for the browser bindings

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum DomError {
    #[error("DOM call failed: {0}")]
    Js(String),

    #[error("No window in this context")]
    NoWindow,

    #[error("No document in this context")]
    NoDocument,

    #[error("Window has no selection")]
    NoSelection,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        DomError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<DomError> for JsValue {
    fn from(err: DomError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
