//! Remote collaborator cursor feed

use serde::{Deserialize, Serialize};

/// A collaborator's cursor as reported by the sync layer.
///
/// Offsets are full-content character offsets into the synced snapshot that
/// accompanied the feed, never into the local buffer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RemoteCursor {
    pub user_id: String,
    pub display_name: String,
    /// Caret offset into the synced snapshot's full content
    pub full_offset: usize,
    pub selection_start: Option<usize>,
    pub selection_end: Option<usize>,
}

impl RemoteCursor {
    pub fn has_selection(&self) -> bool {
        self.selection_start.is_some() && self.selection_end.is_some()
    }
}
