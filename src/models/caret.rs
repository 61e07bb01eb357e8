//! Caret, selection, and highlight state
//!
//! All offsets are zero-based character (Unicode scalar) indices. The caret
//! is stored in full-content coordinates; display coordinates are derived
//! through the line table when needed.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use wasm_bindgen::prelude::*;

/// How long a highlight cue stays visible before it expires
pub const HIGHLIGHT_DURATION_MS: f64 = 3000.0;

/// Who initiated a content mutation.
///
/// Programmatic replacements (sync pulls, template insertion, undo of an
/// external change) trigger caret reconciliation; direct user input already
/// carries its own caret position from the text control.
#[wasm_bindgen]
#[repr(u8)]
#[derive(Serialize_repr, Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    UserInput = 0,
    Programmatic = 1,
}

/// Caret position in full-content coordinates plus its display line
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretState {
    /// Character offset into the full content
    pub position: usize,
    /// One-based display line number
    pub line: usize,
}

impl CaretState {
    pub fn new(position: usize, line: usize) -> Self {
        CaretState { position, line }
    }

    /// Caret at the start of an empty or freshly loaded document
    pub fn at_origin() -> Self {
        CaretState { position: 0, line: 1 }
    }
}

impl Default for CaretState {
    fn default() -> Self {
        CaretState::at_origin()
    }
}

/// A selection span in full-content coordinates, normalized so start <= end
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSpan {
    pub start: usize,
    pub end: usize,
}

impl SelectionSpan {
    /// Builds a span, swapping the endpoints if they arrive reversed
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            SelectionSpan { start: a, end: b }
        } else {
            SelectionSpan { start: b, end: a }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// A transient highlight cue over a full-content range.
///
/// Highlights expire on a wall clock supplied by the caller so the core
/// stays testable off-browser, and they are dropped outright by the next
/// user mutation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct HighlightRange {
    pub start: usize,
    pub end: usize,
    /// Timestamp (ms) after which the highlight is no longer active
    pub expires_at_ms: f64,
}

impl HighlightRange {
    pub fn new(a: usize, b: usize, now_ms: f64) -> Self {
        let span = SelectionSpan::new(a, b);
        HighlightRange {
            start: span.start,
            end: span.end,
            expires_at_ms: now_ms + HIGHLIGHT_DURATION_MS,
        }
    }

    pub fn is_active(&self, now_ms: f64) -> bool {
        now_ms < self.expires_at_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_span_normalizes_reversed_endpoints() {
        let span = SelectionSpan::new(9, 4);
        assert_eq!(span.start, 4);
        assert_eq!(span.end, 9);
        assert_eq!(span.len(), 5);
    }

    #[test]
    fn selection_span_contains_is_half_open() {
        let span = SelectionSpan::new(2, 5);
        assert!(span.contains(2));
        assert!(span.contains(4));
        assert!(!span.contains(5));
    }

    #[test]
    fn highlight_expires_after_duration() {
        let hl = HighlightRange::new(0, 10, 1000.0);
        assert!(hl.is_active(1000.0));
        assert!(hl.is_active(1000.0 + HIGHLIGHT_DURATION_MS - 1.0));
        assert!(!hl.is_active(1000.0 + HIGHLIGHT_DURATION_MS));
    }

    #[test]
    fn highlight_normalizes_reversed_range() {
        let hl = HighlightRange::new(8, 3, 0.0);
        assert_eq!((hl.start, hl.end), (3, 8));
    }
}
