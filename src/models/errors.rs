//! Error types for the editor core
//!
//! Defines the error hierarchy for edit operations. Mapping functions never
//! appear here: they clamp instead of failing because they run on every
//! keystroke.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Top-level editor error type
#[derive(Debug, Clone, Error)]
pub enum EditorError {
    /// No document has been loaded into the editor yet
    #[error("no document loaded")]
    NoDocument,

    /// A selection range was supplied with start past end
    #[error("invalid range: start {start} is past end {end}")]
    InvalidRange { start: usize, end: usize },

    /// Serialization across the JS boundary failed
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<EditorError> for JsValue {
    fn from(err: EditorError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}
