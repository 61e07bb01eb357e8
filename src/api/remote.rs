//! Remote collaborator WASM API
//!
//! The sync layer pushes cursor feeds paired with the snapshot they were
//! measured against; the host asks for pixel projections whenever the
//! overlay needs repainting (scroll, resize, feed update). Projections
//! always come from the paired snapshot, never from the live buffer.

use wasm_bindgen::prelude::*;

use crate::api::core::lock_editor;
use crate::api::helpers::{deserialize, serialize};
use crate::models::errors::EditorError;
use crate::models::remote::RemoteCursor;
use crate::projection::{CollaboratorOverlay, RemoteCursorProjection, TextMetrics};
use crate::wasm_info;

/// Install a collaborator cursor feed together with the synced full
/// content its offsets refer to. Returns the number of cursors accepted.
#[wasm_bindgen(js_name = updateCollaborators)]
pub fn update_collaborators(synced_full: &str, cursors: JsValue) -> Result<usize, JsValue> {
    let cursors: Vec<RemoteCursor> = deserialize(cursors, "updateCollaborators cursor feed")?;
    wasm_info!("updateCollaborators called: {} cursors", cursors.len());
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    let count = cursors.len();
    editor.collaborators = Some(CollaboratorOverlay::new(synced_full, cursors));
    Ok(count)
}

/// Drop the collaborator overlay entirely
#[wasm_bindgen(js_name = clearCollaborators)]
pub fn clear_collaborators() -> Result<(), JsValue> {
    let mut guard = lock_editor()?;
    let editor = guard.as_mut().ok_or(EditorError::NoDocument)?;
    editor.collaborators = None;
    Ok(())
}

/// Project every collaborator cursor to overlay pixels using the control
/// geometry measured by the host. An empty array comes back when no feed
/// is installed.
#[wasm_bindgen(js_name = projectRemoteCursors)]
pub fn project_remote_cursors(metrics: JsValue) -> Result<JsValue, JsValue> {
    let metrics: TextMetrics = deserialize(metrics, "projectRemoteCursors metrics")?;
    let guard = lock_editor()?;
    let editor = guard.as_ref().ok_or(EditorError::NoDocument)?;
    let projections: Vec<RemoteCursorProjection> = match &editor.collaborators {
        Some(overlay) => overlay.project_all(&metrics),
        None => Vec::new(),
    };
    serialize(&projections, "projectRemoteCursors serialization")
}
