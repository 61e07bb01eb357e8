//! Models module for the Screenplay Editor
//!
//! This module contains the data models shared across the editor core:
//! the tagged-line document, caret and selection state, element
//! classification, and the remote collaborator feed.

pub mod caret;
pub mod document;
pub mod elements;
pub mod errors;
pub mod remote;

// Re-export commonly used types
pub use caret::*;
pub use document::*;
pub use elements::*;
pub use errors::EditorError;
pub use remote::RemoteCursor;
