//! Core WASM API for the screenplay editor
//!
//! This module owns the editor state living on the WASM side and exposes
//! the JavaScript-facing lifecycle, mutation, history, and save functions.
//! Every mutation returns an [`EditOutcome`] so the host can refresh the
//! text control and caret in one round trip.

use std::cell::RefCell;
use std::sync::{Mutex, MutexGuard};

use lazy_static::lazy_static;
use wasm_bindgen::prelude::*;

use crate::api::helpers::{now_ms, serialize, validate_edit_range, validation_error};
use crate::buffer::{AutoSavePort, EditBuffer, SaveRequest};
use crate::models::caret::EditOrigin;
use crate::models::document::TagSummary;
use crate::models::errors::EditorError;
use crate::projection::CollaboratorOverlay;
use crate::{wasm_error, wasm_info, wasm_warn};

// WASM-owned editor state (canonical source of truth)
lazy_static! {
    static ref EDITOR: Mutex<Option<ScriptEditor>> = Mutex::new(None);
}

thread_local! {
    // js_sys::Function is not Send, so the callback lives outside the
    // editor mutex; WASM runs single-threaded so thread_local is exact
    static AUTOSAVE_CALLBACK: RefCell<Option<js_sys::Function>> = RefCell::new(None);
}

/// Editor state held behind the global lock
pub struct ScriptEditor {
    pub buffer: EditBuffer,
    pub collaborators: Option<CollaboratorOverlay>,
}

impl ScriptEditor {
    fn new(full: &str) -> Self {
        let mut buffer = EditBuffer::from_full_content(full);
        buffer.set_autosave_port(Box::new(JsAutoSave));
        ScriptEditor {
            buffer,
            collaborators: None,
        }
    }
}

/// Locks the global editor state, surfacing poisoning as a JS error
pub fn lock_editor() -> Result<MutexGuard<'static, Option<ScriptEditor>>, JsValue> {
    EDITOR
        .lock()
        .map_err(|_| JsValue::from_str("editor state lock poisoned"))
}

/// Port that forwards save requests to the registered JS callback
struct JsAutoSave;

impl AutoSavePort for JsAutoSave {
    fn schedule_save(&mut self, request: SaveRequest) {
        AUTOSAVE_CALLBACK.with(|cell| {
            if let Some(callback) = cell.borrow().as_ref() {
                match serde_wasm_bindgen::to_value(&request) {
                    Ok(payload) => {
                        if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
                            wasm_warn!("autosave callback raised: {:?}", err);
                        }
                    }
                    Err(err) => wasm_error!("autosave payload serialization failed: {}", err),
                }
            }
        });
    }
}

// ============================================================================
// Result structures for edit operations
// ============================================================================

/// Caret presented in both coordinate spaces
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct CaretInfo {
    /// Character offset into the full content
    pub position: usize,
    /// One-based display line number
    pub line: usize,
    /// Character offset into the display content
    pub display_offset: usize,
}

/// Result of a mutation: everything the host needs to refresh the control
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct EditOutcome {
    pub full_content: String,
    pub display_content: String,
    pub caret: CaretInfo,
    pub dirty: bool,
}

/// Full editor state for initial render and debugging
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct DocumentSnapshot {
    pub document_id: String,
    pub title: Option<String>,
    pub full_content: String,
    pub display_content: String,
    pub caret: CaretInfo,
    pub dirty: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub tags: TagSummary,
}

pub(crate) fn caret_info(buffer: &EditBuffer) -> CaretInfo {
    let caret = buffer.caret();
    CaretInfo {
        position: caret.position,
        line: caret.line,
        display_offset: buffer.caret_display_offset(),
    }
}

fn edit_outcome(buffer: &EditBuffer) -> EditOutcome {
    EditOutcome {
        full_content: buffer.full_content(),
        display_content: buffer.display_content().to_string(),
        caret: caret_info(buffer),
        dirty: buffer.is_dirty(),
    }
}

fn document_snapshot(buffer: &EditBuffer) -> DocumentSnapshot {
    let meta = &buffer.document().meta;
    DocumentSnapshot {
        document_id: meta.id.clone(),
        title: meta.title.clone(),
        full_content: buffer.full_content(),
        display_content: buffer.display_content().to_string(),
        caret: caret_info(buffer),
        dirty: buffer.is_dirty(),
        can_undo: buffer.can_undo(),
        can_redo: buffer.can_redo(),
        tags: buffer.document().tag_summary(),
    }
}

// ============================================================================
// Document Lifecycle
// ============================================================================

/// Create a new empty document and make it the active editor state
#[wasm_bindgen(js_name = newDocument)]
pub fn new_document() -> Result<JsValue, JsValue> {
    wasm_info!("newDocument called");
    let editor = ScriptEditor::new("");
    let snapshot = document_snapshot(&editor.buffer);
    let mut guard = lock_editor()?;
    *guard = Some(editor);
    serialize(&snapshot, "newDocument serialization")
}

/// Load persisted full content (tag lines included) as the active document
#[wasm_bindgen(js_name = loadDocument)]
pub fn load_document(content: &str) -> Result<JsValue, JsValue> {
    wasm_info!("loadDocument called with {} chars", content.chars().count());
    let editor = ScriptEditor::new(content);
    let snapshot = document_snapshot(&editor.buffer);
    let mut guard = lock_editor()?;
    *guard = Some(editor);
    serialize(&snapshot, "loadDocument serialization")
}

/// Get the complete editor state for the active document
#[wasm_bindgen(js_name = getDocumentSnapshot)]
pub fn get_document_snapshot() -> Result<JsValue, JsValue> {
    let guard = lock_editor()?;
    let editor = guard.as_ref().ok_or(EditorError::NoDocument)?;
    serialize(&document_snapshot(&editor.buffer), "getDocumentSnapshot serialization")
}

/// Full content as it should be persisted, tag lines included
#[wasm_bindgen(js_name = getFullContent)]
pub fn get_full_content() -> Result<String, JsValue> {
    let guard = lock_editor()?;
    let editor = guard.as_ref().ok_or(EditorError::NoDocument)?;
    Ok(editor.buffer.full_content())
}

/// Display content as the text control should render it
#[wasm_bindgen(js_name = getDisplayContent)]
pub fn get_display_content() -> Result<String, JsValue> {
    let guard = lock_editor()?;
    let editor = guard.as_ref().ok_or(EditorError::NoDocument)?;
    Ok(editor.buffer.display_content().to_string())
}

/// Set the document title carried in the snapshot metadata
#[wasm_bindgen(js_name = setDocumentTitle)]
pub fn set_document_title(title: &str) -> Result<(), JsValue> {
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    editor.buffer.set_title(title);
    Ok(())
}

// ============================================================================
// Content Mutations
// ============================================================================

/// Replace the entire content.
///
/// `origin` decides caret handling: programmatic replacements reconcile the
/// caret against the old display content, user-originated ones keep the
/// control's caret. `mark_dirty` false loads synced content without
/// flagging unpersisted changes.
#[wasm_bindgen(js_name = setContent)]
pub fn set_content(content: &str, origin: EditOrigin, mark_dirty: bool) -> Result<JsValue, JsValue> {
    wasm_info!(
        "setContent called: {} chars, origin {:?}, mark_dirty {}",
        content.chars().count(),
        origin,
        mark_dirty
    );
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    editor.buffer.set_content(content, origin, mark_dirty);
    serialize(&edit_outcome(&editor.buffer), "setContent serialization")
}

/// Insert text at a full-content character offset
#[wasm_bindgen(js_name = insertText)]
pub fn insert_text(text: &str, at: usize) -> Result<JsValue, JsValue> {
    wasm_info!("insertText called: {} chars at {}", text.chars().count(), at);
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    editor.buffer.insert_text(text, at);
    serialize(&edit_outcome(&editor.buffer), "insertText serialization")
}

/// Replace a full-content character range; start == end inserts
#[wasm_bindgen(js_name = replaceSelection)]
pub fn replace_selection(text: &str, start: usize, end: usize) -> Result<JsValue, JsValue> {
    wasm_info!("replaceSelection called: range {}..{}", start, end);
    validate_edit_range(start, end).map_err(validation_error)?;
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    editor
        .buffer
        .replace_selection(text, start, end)
        .map_err(|e| validation_error(e.to_string()))?;
    serialize(&edit_outcome(&editor.buffer), "replaceSelection serialization")
}

/// Apply an edit reported by the text control: the new display content and
/// the caret position after the edit
#[wasm_bindgen(js_name = applyDisplayEdit)]
pub fn apply_display_edit(
    display_text: &str,
    display_caret: usize,
    origin: EditOrigin,
) -> Result<JsValue, JsValue> {
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    editor
        .buffer
        .apply_display_edit(display_text, display_caret, origin);
    serialize(&edit_outcome(&editor.buffer), "applyDisplayEdit serialization")
}

// ============================================================================
// Undo / Redo
// ============================================================================

/// Seal the open typing batch; the next keystroke starts a new undo step
#[wasm_bindgen(js_name = commitTyping)]
pub fn commit_typing() -> Result<(), JsValue> {
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    editor.buffer.commit_typing();
    Ok(())
}

/// Undo the last edit batch; a no-op when history is empty
#[wasm_bindgen]
pub fn undo() -> Result<JsValue, JsValue> {
    wasm_info!("undo called");
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    if !editor.buffer.undo() {
        wasm_info!("undo: nothing to undo");
    }
    serialize(&edit_outcome(&editor.buffer), "undo serialization")
}

/// Re-apply the most recently undone batch; a no-op when nothing was undone
#[wasm_bindgen]
pub fn redo() -> Result<JsValue, JsValue> {
    wasm_info!("redo called");
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    if !editor.buffer.redo() {
        wasm_info!("redo: nothing to redo");
    }
    serialize(&edit_outcome(&editor.buffer), "redo serialization")
}

#[wasm_bindgen(js_name = canUndo)]
pub fn can_undo() -> Result<bool, JsValue> {
    let guard = lock_editor()?;
    let editor = guard.as_ref().ok_or(EditorError::NoDocument)?;
    Ok(editor.buffer.can_undo())
}

#[wasm_bindgen(js_name = canRedo)]
pub fn can_redo() -> Result<bool, JsValue> {
    let guard = lock_editor()?;
    let editor = guard.as_ref().ok_or(EditorError::NoDocument)?;
    Ok(editor.buffer.can_redo())
}

// ============================================================================
// Save Lifecycle
// ============================================================================

/// Register the host callback invoked with a save request on every mutation
#[wasm_bindgen(js_name = setAutosaveCallback)]
pub fn set_autosave_callback(callback: js_sys::Function) -> Result<(), JsValue> {
    wasm_info!("setAutosaveCallback called");
    AUTOSAVE_CALLBACK.with(|cell| {
        *cell.borrow_mut() = Some(callback);
    });
    Ok(())
}

/// Drop the registered save callback
#[wasm_bindgen(js_name = clearAutosaveCallback)]
pub fn clear_autosave_callback() -> Result<(), JsValue> {
    AUTOSAVE_CALLBACK.with(|cell| {
        *cell.borrow_mut() = None;
    });
    Ok(())
}

/// Acknowledge a completed save. Clears the dirty flag only when
/// `generation` matches the buffer's latest mutation; returns whether the
/// acknowledgement was current.
#[wasm_bindgen(js_name = notifySaved)]
pub fn notify_saved(generation: u32) -> Result<bool, JsValue> {
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    Ok(editor.buffer.acknowledge_save(generation))
}

/// Report a failed save; the buffer stays dirty
#[wasm_bindgen(js_name = notifySaveFailed)]
pub fn notify_save_failed(generation: u32, reason: &str) -> Result<(), JsValue> {
    wasm_warn!("notifySaveFailed called: generation {}, {}", generation, reason);
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    editor.buffer.save_failed(generation, reason);
    Ok(())
}

#[wasm_bindgen(js_name = isDirty)]
pub fn is_dirty() -> Result<bool, JsValue> {
    let guard = lock_editor()?;
    let editor = guard.as_ref().ok_or(EditorError::NoDocument)?;
    Ok(editor.buffer.is_dirty())
}

// ============================================================================
// Highlights
// ============================================================================

/// Place a transient highlight over a range given in display offsets (an
/// AI insertion the host just scrolled to, for example). The range is
/// stored and reported back in full-content coordinates.
#[wasm_bindgen(js_name = setHighlight)]
pub fn set_highlight(start: usize, end: usize) -> Result<(), JsValue> {
    wasm_info!("setHighlight called: {}..{}", start, end);
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    editor.buffer.set_highlight(start, end, now_ms());
    Ok(())
}

/// The active highlight range, or undefined when none is live
#[wasm_bindgen(js_name = activeHighlight)]
pub fn active_highlight() -> Result<JsValue, JsValue> {
    let guard = lock_editor()?;
    let editor = guard.as_ref().ok_or(EditorError::NoDocument)?;
    serialize(
        &editor.buffer.active_highlight(now_ms()),
        "activeHighlight serialization",
    )
}

#[wasm_bindgen(js_name = clearHighlight)]
pub fn clear_highlight() -> Result<(), JsValue> {
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    editor.buffer.clear_highlight();
    Ok(())
}
