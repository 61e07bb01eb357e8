//! Screenplay Editor WASM API
//!
//! This module provides the JavaScript-facing API for the screenplay editor.
//! It includes shared utilities for serialization, validation, and error
//! handling, as well as the API functions organized by functional domain.
//!
//! # Module Structure
//!
//! - `helpers`: Shared utilities for serialization, validation, error handling, and logging
//! - `core`: Document lifecycle, content mutations, undo/redo, saves, highlights
//! - `caret`: Offset mapping and caret restore operations
//! - `remote`: Collaborator cursor overlay operations

pub mod helpers;
pub mod core;
pub mod caret;
pub mod remote;

// Re-export all public functions from modules to maintain a flat public API
pub use self::core::*;
pub use self::caret::{
    confirm_caret_restore, get_caret_info, get_caret_line_context, map_display_to_full,
    map_full_to_display, reconcile_caret, set_caret_from_display, set_selection_from_display,
    strip_tags,
};
pub use self::remote::{clear_collaborators, project_remote_cursors, update_collaborators};
