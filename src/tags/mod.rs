//! Tag filtering and full/display offset mapping
//!
//! The document has two textual projections: full content (every line,
//! tag lines included) and display content (visible lines only). Both are
//! joined with single newlines. This module owns the translation between
//! the two coordinate spaces via a per-line index built from the document's
//! typed line records.
//!
//! Both mapping directions are total: any input offset, in range or not,
//! produces an in-range output. Out-of-range inputs clamp to the content
//! length. Offsets are character (Unicode scalar) indices, never bytes.

use crate::models::document::{ScriptDocument, ScriptLine};

/// One row of the line table
#[derive(Debug, Clone, PartialEq, Eq)]
struct LineEntry {
    /// Char offset of the line's first character in the full content
    full_start: usize,
    /// Line length in chars, newline excluded
    char_len: usize,
    /// Char offset of the line's first character in the display content;
    /// `None` for tag lines, which have no display presence
    display_start: Option<usize>,
}

/// Index of line positions in both coordinate spaces.
///
/// Built once per content revision and reused for every mapping query until
/// the next mutation invalidates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTable {
    entries: Vec<LineEntry>,
    full_len: usize,
    display_len: usize,
}

impl LineTable {
    pub fn build(doc: &ScriptDocument) -> Self {
        let mut entries = Vec::with_capacity(doc.lines.len());
        let mut full_pos = 0;
        let mut display_pos = 0;
        let mut first_visible = true;
        let line_count = doc.lines.len();

        for (idx, line) in doc.lines.iter().enumerate() {
            let char_len = line.char_len();
            let display_start = match line {
                ScriptLine::Visible(_) => {
                    if first_visible {
                        first_visible = false;
                    } else {
                        // newline separating this visible line from the previous one
                        display_pos += 1;
                    }
                    let start = display_pos;
                    display_pos += char_len;
                    Some(start)
                }
                ScriptLine::Tag(_) => None,
            };
            entries.push(LineEntry {
                full_start: full_pos,
                char_len,
                display_start,
            });
            full_pos += char_len;
            if idx + 1 < line_count {
                full_pos += 1;
            }
        }

        LineTable {
            entries,
            full_len: full_pos,
            display_len: display_pos,
        }
    }

    /// Length of the full content in chars
    pub fn full_len(&self) -> usize {
        self.full_len
    }

    /// Length of the display content in chars
    pub fn display_len(&self) -> usize {
        self.display_len
    }

    /// Index of the line owning a full offset: the last line whose start is
    /// at or before the offset. An offset on a line's trailing newline
    /// belongs to that line.
    fn line_at_full(&self, full_offset: usize) -> usize {
        match self
            .entries
            .binary_search_by(|entry| entry.full_start.cmp(&full_offset))
        {
            Ok(idx) => idx,
            Err(insertion) => insertion.saturating_sub(1),
        }
    }

    /// Maps a full-content offset to the display offset of the same piece
    /// of text. Offsets inside a tag line map to the position in the
    /// display where the next visible content begins, since the preceding
    /// display text is identical either way.
    pub fn map_full_to_display(&self, full_offset: usize) -> usize {
        if self.entries.is_empty() {
            return 0;
        }
        let full_offset = full_offset.min(self.full_len);
        let idx = self.line_at_full(full_offset);
        let entry = &self.entries[idx];
        match entry.display_start {
            Some(display_start) => {
                let col = (full_offset - entry.full_start).min(entry.char_len);
                display_start + col
            }
            None => self.entries[idx + 1..]
                .iter()
                .find_map(|e| e.display_start)
                .unwrap_or(self.display_len),
        }
    }

    /// Maps a display-content offset back to the full-content offset of the
    /// same piece of text. A display offset on the newline between two
    /// visible lines maps into the earlier line's end.
    pub fn map_display_to_full(&self, display_offset: usize) -> usize {
        let display_offset = display_offset.min(self.display_len);
        let mut owner: Option<&LineEntry> = None;
        for entry in &self.entries {
            match entry.display_start {
                Some(start) if start <= display_offset => owner = Some(entry),
                Some(_) => break,
                None => {}
            }
        }
        match owner {
            Some(entry) => {
                let start = entry.display_start.unwrap_or(0);
                let col = (display_offset - start).min(entry.char_len);
                entry.full_start + col
            }
            // no visible lines at all, or offset before the first one
            None => 0,
        }
    }
}

/// Strips tag lines from full content, returning the display content.
///
/// Pure string-in, string-out; deterministic and idempotent on its own
/// output (display content never contains tag lines).
pub fn strip_tags(full: &str) -> String {
    ScriptDocument::from_full_content(full).display_content()
}

/// One-shot full-to-display mapping without a prebuilt table
pub fn map_full_to_display(full: &str, full_offset: usize) -> usize {
    LineTable::build(&ScriptDocument::from_full_content(full)).map_full_to_display(full_offset)
}

/// One-shot display-to-full mapping without a prebuilt table
pub fn map_display_to_full(full: &str, display_offset: usize) -> usize {
    LineTable::build(&ScriptDocument::from_full_content(full)).map_display_to_full(display_offset)
}

/// Zero-based (line, column) of a display offset, counting characters
pub fn line_col_at(display: &str, display_offset: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    for ch in display.chars().take(display_offset) {
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Text of the `line_index`-th display line, empty when out of range
pub fn display_line_text(display: &str, line_index: usize) -> &str {
    display.split('\n').nth(line_index).unwrap_or("")
}
