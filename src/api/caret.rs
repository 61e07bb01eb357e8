//! Caret and position-mapping WASM API
//!
//! Mapping functions come in two forms: stateless ones that take full
//! content and work without a loaded document (the host uses these against
//! synced snapshots), and stateful ones that read or move the active
//! buffer's caret.

use wasm_bindgen::prelude::*;

use crate::api::core::{caret_info, lock_editor};
use crate::api::helpers::serialize;
use crate::models::elements::NoopClassifier;
use crate::models::errors::EditorError;
use crate::reconcile;
use crate::tags;
use crate::wasm_warn;

// ============================================================================
// Stateless Offset Mapping
// ============================================================================

/// Map a full-content character offset to its display offset. Offsets
/// inside tag lines land where the next visible content begins; anything
/// out of range clamps.
#[wasm_bindgen(js_name = mapFullToDisplay)]
pub fn map_full_to_display(full: &str, full_offset: usize) -> usize {
    tags::map_full_to_display(full, full_offset)
}

/// Map a display-content character offset back into the full content
#[wasm_bindgen(js_name = mapDisplayToFull)]
pub fn map_display_to_full(full: &str, display_offset: usize) -> usize {
    tags::map_display_to_full(full, display_offset)
}

/// Strip tag lines from full content, returning what the control renders
#[wasm_bindgen(js_name = stripTags)]
pub fn strip_tags(full: &str) -> String {
    tags::strip_tags(full)
}

/// Where a caret saved against `old_display` should land in `new_display`
#[wasm_bindgen(js_name = reconcileCaret)]
pub fn reconcile_caret(old_display: &str, new_display: &str, saved_caret: usize) -> usize {
    reconcile::reconcile_caret(old_display, new_display, saved_caret)
}

// ============================================================================
// Active-Document Caret Operations
// ============================================================================

/// Caret of the active document in both coordinate spaces
#[wasm_bindgen(js_name = getCaretInfo)]
pub fn get_caret_info() -> Result<JsValue, JsValue> {
    let guard = lock_editor()?;
    let editor = guard.as_ref().ok_or(EditorError::NoDocument)?;
    serialize(&caret_info(&editor.buffer), "getCaretInfo serialization")
}

/// Move the caret to a display offset reported by the text control
#[wasm_bindgen(js_name = setCaretFromDisplay)]
pub fn set_caret_from_display(display_offset: usize) -> Result<JsValue, JsValue> {
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    editor.buffer.set_caret_from_display(display_offset);
    serialize(&caret_info(&editor.buffer), "setCaretFromDisplay serialization")
}

/// Record the control's selection; the caret follows the selection end
#[wasm_bindgen(js_name = setSelectionFromDisplay)]
pub fn set_selection_from_display(start: usize, end: usize) -> Result<JsValue, JsValue> {
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    editor.buffer.set_selection_from_display(start, end);
    serialize(&caret_info(&editor.buffer), "setSelectionFromDisplay serialization")
}

/// Gate for restoring the caret after a programmatic content swap.
///
/// The host passes the control's current value; if it matches the buffer's
/// display content the reconciled caret display offset comes back and may
/// be applied. `undefined` means the control is out of sync (an input event
/// landed in between) and the restore must be skipped.
#[wasm_bindgen(js_name = confirmCaretRestore)]
pub fn confirm_caret_restore(control_value: &str) -> Result<Option<usize>, JsValue> {
    let guard = lock_editor()?;
    let editor = guard.as_ref().ok_or(EditorError::NoDocument)?;
    if reconcile::confirm_control_sync(control_value, editor.buffer.display_content()) {
        Ok(Some(editor.buffer.caret_display_offset()))
    } else {
        wasm_warn!("confirmCaretRestore: control out of sync, skipping restore");
        Ok(None)
    }
}

/// The display line under the caret, with its classified element kind
#[wasm_bindgen(js_name = getCaretLineContext)]
pub fn get_caret_line_context() -> Result<JsValue, JsValue> {
    let guard = lock_editor()?;
    let editor = guard.as_ref().ok_or(EditorError::NoDocument)?;
    let context = editor.buffer.caret_line_context(&NoopClassifier);
    serialize(&context, "getCaretLineContext serialization")
}
