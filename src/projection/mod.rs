//! Remote cursor projection
//!
//! Collaborator cursors arrive as character offsets into a synced snapshot
//! of the document, not into the local buffer, which may already have
//! unsynced local edits. Projection therefore pairs each cursor feed with
//! the snapshot it was measured against and never consults the live buffer.
//! Stale offsets clamp inside the snapshot instead of erroring; cursors a
//! few keystrokes behind drift until the next sync rather than vanish.
//!
//! Pixel math assumes the monospace editing control the host renders into:
//! one glyph per character cell, constant line height.

use serde::{Deserialize, Serialize};

use crate::models::document::ScriptDocument;
use crate::models::remote::RemoteCursor;
use crate::tags::{self, LineTable};

/// Selections narrower than this still get a visible highlight sliver
pub const MIN_HIGHLIGHT_WIDTH_PX: f32 = 2.0;
/// Name label sits this far above the caret line
pub const LABEL_OFFSET_PX: f32 = 18.0;

/// Geometry of the editing control, measured by the host
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(default)]
pub struct TextMetrics {
    pub line_height: f32,
    pub char_width: f32,
    pub padding_top: f32,
    pub padding_left: f32,
    pub container_top: f32,
    pub container_left: f32,
    pub scroll_top: f32,
    pub scroll_left: f32,
}

/// The document state a collaborator feed was measured against
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedSnapshot {
    full: String,
    display: String,
    table: LineTable,
}

impl SyncedSnapshot {
    pub fn new(full: &str) -> Self {
        let doc = ScriptDocument::from_full_content(full);
        let table = LineTable::build(&doc);
        SyncedSnapshot {
            full: full.to_string(),
            display: doc.display_content(),
            table,
        }
    }

    pub fn full_content(&self) -> &str {
        &self.full
    }

    pub fn display_content(&self) -> &str {
        &self.display
    }
}

/// Axis-aligned rectangle for a selection highlight, in page pixels
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Anchor point for a collaborator's name label
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LabelAnchor {
    pub x: f32,
    pub y: f32,
}

/// A collaborator cursor resolved to overlay geometry
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RemoteCursorProjection {
    pub user_id: String,
    pub display_name: String,
    /// Caret x in page pixels
    pub x: f32,
    /// Caret top y in page pixels
    pub y: f32,
    /// Zero-based display line the caret sits on
    pub line_index: usize,
    /// Zero-based column within that line
    pub column: usize,
    pub selection: Option<SelectionRect>,
    pub label: LabelAnchor,
}

/// Display line/column and pixel point for a full-content offset
fn point_at(snapshot: &SyncedSnapshot, metrics: &TextMetrics, full_offset: usize) -> (f32, f32, usize, usize) {
    let display_offset = snapshot.table.map_full_to_display(full_offset);
    let (line, col) = tags::line_col_at(&snapshot.display, display_offset);
    let x = metrics.container_left + metrics.padding_left + col as f32 * metrics.char_width
        - metrics.scroll_left;
    let y = metrics.container_top + metrics.padding_top + line as f32 * metrics.line_height
        - metrics.scroll_top;
    (x, y, line, col)
}

/// Bounding rectangle of a selection between two full-content offsets.
/// Width and height are floored so zero-width selections stay visible.
fn selection_rect(
    snapshot: &SyncedSnapshot,
    metrics: &TextMetrics,
    a: usize,
    b: usize,
) -> SelectionRect {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    let (x1, y1, _, _) = point_at(snapshot, metrics, start);
    let (x2, y2, _, _) = point_at(snapshot, metrics, end);
    let left = x1.min(x2);
    let top = y1.min(y2);
    let right = x1.max(x2);
    let bottom = y1.max(y2) + metrics.line_height;
    SelectionRect {
        left,
        top,
        width: (right - left).max(MIN_HIGHLIGHT_WIDTH_PX),
        height: (bottom - top).max(metrics.line_height),
    }
}

/// Projects one collaborator cursor against the snapshot it belongs to
pub fn project_cursor(
    snapshot: &SyncedSnapshot,
    cursor: &RemoteCursor,
    metrics: &TextMetrics,
) -> RemoteCursorProjection {
    let (x, y, line_index, column) = point_at(snapshot, metrics, cursor.full_offset);
    let selection = match (cursor.selection_start, cursor.selection_end) {
        (Some(a), Some(b)) => Some(selection_rect(snapshot, metrics, a, b)),
        _ => None,
    };
    RemoteCursorProjection {
        user_id: cursor.user_id.clone(),
        display_name: cursor.display_name.clone(),
        x,
        y,
        line_index,
        column,
        selection,
        label: LabelAnchor { x, y: y - LABEL_OFFSET_PX },
    }
}

/// A collaborator feed paired with the snapshot its offsets refer to
#[derive(Debug, Clone, PartialEq)]
pub struct CollaboratorOverlay {
    pub snapshot: SyncedSnapshot,
    pub cursors: Vec<RemoteCursor>,
}

impl CollaboratorOverlay {
    pub fn new(synced_full: &str, cursors: Vec<RemoteCursor>) -> Self {
        CollaboratorOverlay {
            snapshot: SyncedSnapshot::new(synced_full),
            cursors,
        }
    }

    pub fn project_all(&self, metrics: &TextMetrics) -> Vec<RemoteCursorProjection> {
        self.cursors
            .iter()
            .map(|cursor| project_cursor(&self.snapshot, cursor, metrics))
            .collect()
    }
}
