//! Browser bindings for the dataset composer
//!
//! String-in, string-out functions for the stateless transforms (segments
//! and snapshots travel as JSON), plus [`RichEditor`], which binds a
//! `contenteditable` element to a segment model.

mod dom;
mod errors;

use composer_dataset::DatasetSnapshot;
use composer_editor::{RichField, SyncOutcome};
use composer_rich::{
    parse_markup_with, project_to_plain_text, serialize_with, ChipStyle, ParseOptions, Segment,
    TokenDescriptor, TokenRegistry,
};
use wasm_bindgen::prelude::*;

pub use dom::{place_caret, read_selection, DomTree};
pub use errors::DomError;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn decode_segments(segments_json: &str) -> Result<Vec<Segment>, DomError> {
    Ok(serde_json::from_str(segments_json)?)
}

fn decode_registry(tokens_json: &str) -> Result<TokenRegistry, DomError> {
    let tokens: Vec<TokenDescriptor> = serde_json::from_str(tokens_json)?;
    Ok(TokenRegistry::from_tokens(tokens))
}

fn decode_style(style_json: Option<String>) -> Result<ChipStyle, DomError> {
    match style_json {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(ChipStyle::default()),
    }
}

fn serialize_impl(
    segments_json: &str,
    tokens_json: &str,
    style_json: Option<String>,
) -> Result<String, DomError> {
    let segments = decode_segments(segments_json)?;
    let registry = decode_registry(tokens_json)?;
    let style = decode_style(style_json)?;
    Ok(serialize_with(&segments, &registry, &style))
}

fn parse_impl(markup: &str, options_json: Option<String>) -> Result<String, DomError> {
    let options = match options_json {
        Some(json) => serde_json::from_str(&json)?,
        None => ParseOptions::default(),
    };
    Ok(serde_json::to_string(&parse_markup_with(markup, options))?)
}

fn project_impl(segments_json: &str, tokens_json: &str) -> Result<String, DomError> {
    let segments = decode_segments(segments_json)?;
    let registry = decode_registry(tokens_json)?;
    Ok(project_to_plain_text(&segments, &registry))
}

fn export_impl(snapshot_json: &str) -> Result<String, DomError> {
    let snapshot = DatasetSnapshot::from_json(snapshot_json)
        .map_err(|e| DomError::Js(format!("Dataset error: {}", e)))?;
    Ok(composer_dataset::export_txt(&snapshot))
}

/// Render segments to editable markup
#[wasm_bindgen(js_name = serialize)]
pub fn serialize_js(
    segments_json: &str,
    tokens_json: &str,
    style_json: Option<String>,
) -> Result<String, JsValue> {
    Ok(serialize_impl(segments_json, tokens_json, style_json)?)
}

/// Read surface markup back into segments JSON
#[wasm_bindgen(js_name = parse)]
pub fn parse_js(markup: &str, options_json: Option<String>) -> Result<String, JsValue> {
    Ok(parse_impl(markup, options_json)?)
}

#[wasm_bindgen(js_name = projectToPlainText)]
pub fn project_to_plain_text_js(segments_json: &str, tokens_json: &str) -> Result<String, JsValue> {
    Ok(project_impl(segments_json, tokens_json)?)
}

/// Export a stored dataset snapshot as training text
#[wasm_bindgen(js_name = exportTxt)]
pub fn export_txt_js(snapshot_json: &str) -> Result<String, JsValue> {
    Ok(export_impl(snapshot_json)?)
}

fn outcome_name(outcome: SyncOutcome) -> &'static str {
    match outcome {
        SyncOutcome::Suppressed => "suppressed",
        SyncOutcome::Unchanged => "unchanged",
        SyncOutcome::Overwritten => "overwritten",
    }
}

/// Queue `callback(json)` behind the running call into the editor
fn defer_call(callback: &js_sys::Function, json: &str) -> Result<(), DomError> {
    let window = web_sys::window().ok_or(DomError::NoWindow)?;
    let bound = callback.bind1(&JsValue::NULL, &JsValue::from_str(json));
    window.queue_microtask(bound.unchecked_ref::<js_sys::Function>());
    Ok(())
}

/// A `contenteditable` element bound to a segment model
#[wasm_bindgen]
pub struct RichEditor {
    field: RichField<DomTree>,
    registry: TokenRegistry,
}

#[wasm_bindgen]
impl RichEditor {
    #[wasm_bindgen(constructor)]
    pub fn new(
        root: web_sys::HtmlElement,
        tokens_json: &str,
        style_json: Option<String>,
    ) -> Result<RichEditor, JsValue> {
        let tree = DomTree::from_window()?;
        let registry = decode_registry(tokens_json)?;
        let style = decode_style(style_json)?;
        let field = RichField::mount(tree, root.into()).with_style(style);
        Ok(RichEditor { field, registry })
    }

    /// Called with the segments JSON after every user edit
    ///
    /// The callback runs as a microtask once the current call has returned,
    /// so it may call back into this editor (typically `setSegments`).
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: js_sys::Function) {
        self.field.on_change(move |segments| {
            let queued = serde_json::to_string(segments)
                .map_err(DomError::from)
                .and_then(|json| defer_call(&callback, &json));
            if let Err(err) = queued {
                tracing::warn!(error = %err, "Change callback not queued");
            }
        });
    }

    /// Model-change notification; returns what happened to the surface
    #[wasm_bindgen(js_name = setSegments)]
    pub fn set_segments(&mut self, segments_json: &str) -> Result<String, JsValue> {
        let segments = decode_segments(segments_json)?;
        let outcome = self.field.set_segments(segments, &self.registry);
        Ok(outcome_name(outcome).to_string())
    }

    /// Replace the token set and re-render chips
    #[wasm_bindgen(js_name = setTokens)]
    pub fn set_tokens(&mut self, tokens_json: &str) -> Result<(), JsValue> {
        self.registry = decode_registry(tokens_json)?;
        self.field.refresh(&self.registry);
        Ok(())
    }

    /// Input event handler; returns the new segments JSON
    #[wasm_bindgen(js_name = handleInput)]
    pub fn handle_input(&mut self) -> Result<String, JsValue> {
        let segments = self.field.handle_input();
        serde_json::to_string(segments).map_err(|e| JsValue::from(DomError::from(e)))
    }

    /// Insert a chip at the window selection; returns the new segments JSON
    #[wasm_bindgen(js_name = insertToken)]
    pub fn insert_token(&mut self, token_id: &str) -> Result<String, JsValue> {
        self.field.set_selection(read_selection());
        let json = serde_json::to_string(self.field.insert_token(token_id, &self.registry))
            .map_err(DomError::from)?;
        if let Some(selection) = self.field.selection() {
            if let Err(err) = place_caret(&selection.focus) {
                tracing::warn!(error = %err, "Caret not restored");
            }
        }
        Ok(json)
    }

    pub fn segments(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.field.segments()).map_err(|e| JsValue::from(DomError::from(e)))
    }

    #[wasm_bindgen(js_name = plainText)]
    pub fn plain_text(&self) -> String {
        project_to_plain_text(self.field.segments(), &self.registry)
    }

    pub fn clear(&mut self) {
        self.field.clear();
    }
}
