//! Auto-save scheduling port
//!
//! The buffer never performs IO. Every mutation hands a [`SaveRequest`] to
//! whatever port is installed; the host side owns debouncing, transport,
//! and retry. Save acknowledgements flow back through the buffer so the
//! dirty flag only clears for the generation that was actually persisted.

use serde::{Deserialize, Serialize};

use crate::models::document::TagSummary;

/// Snapshot of what should be persisted, emitted on every mutation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SaveRequest {
    /// Full content, tag lines included
    pub content: String,
    /// Whether the buffer has unpersisted changes
    pub is_dirty: bool,
    /// Monotonic mutation counter; echo it back in the acknowledgement
    pub generation: u32,
    /// Structural context for the host's save pipeline
    pub context: TagSummary,
}

/// Outbound seam for save scheduling. Implementations must not block.
pub trait AutoSavePort {
    fn schedule_save(&mut self, request: SaveRequest);
}

/// Port that drops every request; used before a host callback is installed
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAutoSave;

impl AutoSavePort for NullAutoSave {
    fn schedule_save(&mut self, _request: SaveRequest) {}
}
