//! Edit buffer: canonical document state, caret, and edit history
//!
//! The buffer owns the line records and keeps the derived display string
//! and line table in lockstep with them. Every mutation flows through here:
//! it snapshots history, re-derives the projections, stamps the document
//! metadata, and notifies the auto-save port. Host-facing layers stay thin
//! wrappers over these methods.
//!
//! Undo history stores full-content snapshots. Consecutive user keystrokes
//! coalesce into one history entry; a batch breaks on whitespace insertion,
//! on a caret jump, and when typing flips between inserting and deleting.

pub mod autosave;

pub use autosave::{AutoSavePort, NullAutoSave, SaveRequest};

use crate::models::caret::{CaretState, EditOrigin, HighlightRange, SelectionSpan};
use crate::models::document::ScriptDocument;
use crate::models::elements::{LineClassifier, LineContext};
use crate::models::errors::EditorError;
use crate::reconcile::{self, DisplaySplice};
use crate::tags::{self, LineTable};

/// Maximum number of history entries kept per stack
const MAX_HISTORY: usize = 100;

/// One history entry: the full content and where the caret was
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    full: String,
    caret: CaretState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypingKind {
    Insert,
    Delete,
}

/// Bookkeeping for the currently open coalescing batch
#[derive(Debug, Clone, Copy)]
struct TypingBatch {
    kind: TypingKind,
    /// Display offset where the caret ended after the batch's last edit
    end_display: usize,
}

pub struct EditBuffer {
    document: ScriptDocument,
    /// Derived: visible lines joined with newlines
    display: String,
    /// Derived: offset index over the current line records
    table: LineTable,
    caret: CaretState,
    selection: Option<SelectionSpan>,
    highlight: Option<HighlightRange>,
    dirty: bool,
    /// Bumped on every mutation; save acknowledgements echo it back
    save_generation: u32,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    open_batch: Option<TypingBatch>,
    autosave: Box<dyn AutoSavePort + Send>,
}

impl EditBuffer {
    pub fn new() -> Self {
        EditBuffer::with_autosave("", Box::new(NullAutoSave))
    }

    pub fn from_full_content(full: &str) -> Self {
        EditBuffer::with_autosave(full, Box::new(NullAutoSave))
    }

    pub fn with_autosave(full: &str, autosave: Box<dyn AutoSavePort + Send>) -> Self {
        let document = ScriptDocument::from_full_content(full);
        let display = document.display_content();
        let table = LineTable::build(&document);
        EditBuffer {
            document,
            display,
            table,
            caret: CaretState::at_origin(),
            selection: None,
            highlight: None,
            dirty: false,
            save_generation: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            open_batch: None,
            autosave,
        }
    }

    pub fn set_autosave_port(&mut self, autosave: Box<dyn AutoSavePort + Send>) {
        self.autosave = autosave;
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn document(&self) -> &ScriptDocument {
        &self.document
    }

    pub fn full_content(&self) -> String {
        self.document.full_content()
    }

    pub fn display_content(&self) -> &str {
        &self.display
    }

    pub fn table(&self) -> &LineTable {
        &self.table
    }

    pub fn caret(&self) -> CaretState {
        self.caret
    }

    /// Caret position translated into display coordinates
    pub fn caret_display_offset(&self) -> usize {
        self.table.map_full_to_display(self.caret.position)
    }

    pub fn selection(&self) -> Option<SelectionSpan> {
        self.selection
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn save_generation(&self) -> u32 {
        self.save_generation
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Sets the title carried in the document metadata. Content and dirty
    /// state are untouched; titles persist through a separate host path.
    pub fn set_title(&mut self, title: &str) {
        self.document.meta.title = if title.is_empty() {
            None
        } else {
            Some(title.to_string())
        };
        self.document.meta.touch();
    }

    // ------------------------------------------------------------------
    // Loading and whole-content replacement
    // ------------------------------------------------------------------

    /// Loads persisted content as a fresh document. History is dropped and
    /// the buffer starts clean; no save is scheduled.
    pub fn load(&mut self, full: &str) {
        self.document = ScriptDocument::from_full_content(full);
        self.rebuild_derived();
        self.caret = CaretState::at_origin();
        self.selection = None;
        self.highlight = None;
        self.dirty = false;
        self.save_generation += 1;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open_batch = None;
    }

    /// Replaces the entire content in place.
    ///
    /// A programmatic replacement reconciles the caret against the old
    /// display content; user-originated replacements keep the caret where
    /// the control reported it, merely clamped. Either way the undo history
    /// is reset, since snapshots predating a full swap would restore
    /// content the user never saw.
    pub fn set_content(&mut self, full: &str, origin: EditOrigin, mark_dirty: bool) {
        let old_display = std::mem::take(&mut self.display);
        let saved_display_caret = self.table.map_full_to_display(self.caret.position);

        self.document.replace_content(full);
        self.rebuild_derived();
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open_batch = None;
        self.selection = None;
        self.highlight = None;

        if reconcile::needs_reconciliation(origin) {
            let landed =
                reconcile::reconcile_caret(&old_display, &self.display, saved_display_caret);
            self.caret = self.caret_at_display(landed);
        } else {
            self.clamp_caret();
        }

        self.dirty = mark_dirty;
        self.save_generation += 1;
        self.notify_autosave();
    }

    // ------------------------------------------------------------------
    // Targeted mutations
    // ------------------------------------------------------------------

    /// Inserts text at a full-content offset, clamped into range
    pub fn insert_text(&mut self, text: &str, at: usize) {
        self.commit_typing();
        self.push_undo_snapshot();
        let at = at.min(self.document.char_len());
        self.document.splice(at, at, text);
        self.rebuild_derived();
        self.place_caret_at_full(at + text.chars().count());
        self.finish_mutation();
    }

    /// Replaces the full-content range `start..end` with `text`. A range
    /// with `start == end` is a plain insertion.
    pub fn replace_selection(
        &mut self,
        text: &str,
        start: usize,
        end: usize,
    ) -> Result<(), EditorError> {
        if start > end {
            return Err(EditorError::InvalidRange { start, end });
        }
        self.commit_typing();
        self.push_undo_snapshot();
        let len = self.document.char_len();
        let start = start.min(len);
        let end = end.min(len);
        self.document.splice(start, end, text);
        self.rebuild_derived();
        self.place_caret_at_full(start + text.chars().count());
        self.finish_mutation();
        Ok(())
    }

    /// Applies an edit reported by the text control as new display content
    /// plus the caret position after the edit.
    ///
    /// The single contiguous change is recovered by prefix/suffix diffing,
    /// translated into full-content coordinates through the pre-edit line
    /// table, and spliced into the line records. Tag lines outside the
    /// changed span are untouched; tag lines strictly inside a deleted span
    /// go with it.
    pub fn apply_display_edit(
        &mut self,
        new_display: &str,
        display_caret: usize,
        origin: EditOrigin,
    ) {
        let splice = match reconcile::diff_displays(&self.display, new_display) {
            Some(splice) => splice,
            None => {
                // caret motion without a content change
                self.set_caret_from_display(display_caret);
                return;
            }
        };

        let full_start = self.table.map_display_to_full(splice.start);
        let full_end = self
            .table
            .map_display_to_full(splice.start + splice.removed)
            .max(full_start);

        match origin {
            EditOrigin::UserInput => self.open_or_continue_batch(&splice),
            EditOrigin::Programmatic => {
                self.commit_typing();
                self.push_undo_snapshot();
            }
        }

        self.document.splice(full_start, full_end, &splice.inserted);
        self.rebuild_derived();
        self.caret = self.caret_at_display(display_caret);
        self.selection = None;
        self.finish_mutation();
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Seals the open typing batch so the next keystroke starts a new
    /// history entry. Called by the host on blur or after a typing pause.
    pub fn commit_typing(&mut self) {
        self.open_batch = None;
    }

    /// Steps back one history entry. Returns false when there is nothing
    /// to undo; the buffer is left untouched in that case.
    pub fn undo(&mut self) -> bool {
        self.commit_typing();
        let snapshot = match self.undo_stack.pop() {
            Some(snapshot) => snapshot,
            None => return false,
        };
        let current = self.capture_snapshot();
        self.redo_stack.push(current);
        self.restore_snapshot(snapshot);
        self.finish_mutation();
        true
    }

    /// Re-applies the most recently undone entry
    pub fn redo(&mut self) -> bool {
        self.commit_typing();
        let snapshot = match self.redo_stack.pop() {
            Some(snapshot) => snapshot,
            None => return false,
        };
        let current = self.capture_snapshot();
        self.undo_stack.push(current);
        self.restore_snapshot(snapshot);
        self.finish_mutation();
        true
    }

    // ------------------------------------------------------------------
    // Caret and selection
    // ------------------------------------------------------------------

    /// Moves the caret to a display offset, collapsing any selection and
    /// dropping any active highlight
    pub fn set_caret_from_display(&mut self, display_offset: usize) {
        self.caret = self.caret_at_display(display_offset);
        self.selection = None;
        self.highlight = None;
        // a caret jump ends the current typing batch
        self.commit_typing();
    }

    /// Records a selection reported in display offsets, stored in full
    /// coordinates; the caret follows the selection end
    pub fn set_selection_from_display(&mut self, a: usize, b: usize) {
        let limit = self.table.display_len();
        let span = SelectionSpan::new(a.min(limit), b.min(limit));
        self.caret = self.caret_at_display(span.end);
        self.selection = Some(SelectionSpan::new(
            self.table.map_display_to_full(span.start),
            self.table.map_display_to_full(span.end),
        ));
        self.highlight = None;
        self.commit_typing();
    }

    /// The display line under the caret, classified for the host UI
    pub fn caret_line_context(&self, classifier: &dyn LineClassifier) -> LineContext {
        let display_offset = self.caret_display_offset();
        let (line_index, caret_col) = tags::line_col_at(&self.display, display_offset);
        let text = tags::display_line_text(&self.display, line_index).to_string();
        let element = classifier.classify(&text);
        LineContext {
            text,
            caret_col,
            line_index,
            element,
        }
    }

    // ------------------------------------------------------------------
    // Highlights
    // ------------------------------------------------------------------

    /// Places a transient highlight over a range reported in display
    /// offsets, replacing any existing one. The range is stored in full
    /// coordinates, like every other persisted position.
    pub fn set_highlight(&mut self, a: usize, b: usize, now_ms: f64) {
        let limit = self.table.display_len();
        self.highlight = Some(HighlightRange::new(
            self.table.map_display_to_full(a.min(limit)),
            self.table.map_display_to_full(b.min(limit)),
            now_ms,
        ));
    }

    /// The current highlight, if it has not expired
    pub fn active_highlight(&self, now_ms: f64) -> Option<HighlightRange> {
        self.highlight.filter(|hl| hl.is_active(now_ms))
    }

    pub fn clear_highlight(&mut self) {
        self.highlight = None;
    }

    // ------------------------------------------------------------------
    // Save lifecycle
    // ------------------------------------------------------------------

    /// Marks the buffer clean if `generation` matches the latest mutation.
    /// A stale acknowledgement (more edits happened since that save was
    /// scheduled) leaves the dirty flag alone and returns false.
    pub fn acknowledge_save(&mut self, generation: u32) -> bool {
        if generation == self.save_generation {
            self.dirty = false;
            true
        } else {
            log::debug!(
                "stale save acknowledgement: generation {} while buffer is at {}",
                generation,
                self.save_generation
            );
            false
        }
    }

    /// Records a failed save attempt. The buffer stays dirty so the next
    /// schedule retries with current content.
    pub fn save_failed(&mut self, generation: u32, reason: &str) {
        log::warn!("auto-save failed (generation {}): {}", generation, reason);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn rebuild_derived(&mut self) {
        self.display = self.document.display_content();
        self.table = LineTable::build(&self.document);
    }

    fn caret_at_display(&self, display_offset: usize) -> CaretState {
        let display_offset = display_offset.min(self.table.display_len());
        let position = self.table.map_display_to_full(display_offset);
        let (line_index, _) = tags::line_col_at(&self.display, display_offset);
        CaretState::new(position, line_index + 1)
    }

    fn place_caret_at_full(&mut self, position: usize) {
        let position = position.min(self.document.char_len());
        let display_offset = self.table.map_full_to_display(position);
        let (line_index, _) = tags::line_col_at(&self.display, display_offset);
        self.caret = CaretState::new(position, line_index + 1);
        self.selection = None;
    }

    fn clamp_caret(&mut self) {
        self.place_caret_at_full(self.caret.position.min(self.document.char_len()));
    }

    fn capture_snapshot(&self) -> Snapshot {
        Snapshot {
            full: self.document.full_content(),
            caret: self.caret,
        }
    }

    fn restore_snapshot(&mut self, snapshot: Snapshot) {
        self.document.replace_content(&snapshot.full);
        self.rebuild_derived();
        self.caret = snapshot.caret;
        self.clamp_caret();
        self.selection = None;
    }

    fn push_undo_snapshot(&mut self) {
        self.redo_stack.clear();
        self.undo_stack.push(self.capture_snapshot());
        if self.undo_stack.len() > MAX_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Decides whether a user edit joins the open typing batch or starts a
    /// new history entry
    fn open_or_continue_batch(&mut self, splice: &DisplaySplice) {
        let kind = if splice.is_pure_delete() {
            TypingKind::Delete
        } else {
            TypingKind::Insert
        };

        // whitespace starts a new batch so undo steps back word by word
        let whitespace = kind == TypingKind::Insert
            && !splice.inserted.is_empty()
            && splice.inserted.chars().all(char::is_whitespace);
        if whitespace {
            self.commit_typing();
        }

        let continues = match self.open_batch {
            Some(batch) => {
                batch.kind == kind
                    && (splice.start == batch.end_display
                        || splice.start + splice.removed == batch.end_display)
            }
            None => false,
        };

        if !continues {
            self.commit_typing();
            self.push_undo_snapshot();
        }
        self.open_batch = Some(TypingBatch {
            kind,
            end_display: splice.start + splice.inserted_len(),
        });
    }

    /// Shared tail of every content mutation
    fn finish_mutation(&mut self) {
        self.highlight = None;
        self.dirty = true;
        self.save_generation += 1;
        self.notify_autosave();
    }

    fn notify_autosave(&mut self) {
        let request = SaveRequest {
            content: self.document.full_content(),
            is_dirty: self.dirty,
            generation: self.save_generation,
            context: self.document.tag_summary(),
        };
        self.autosave.schedule_save(request);
    }
}

impl Default for EditBuffer {
    fn default() -> Self {
        EditBuffer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingPort {
        log: Arc<Mutex<Vec<SaveRequest>>>,
    }

    impl AutoSavePort for RecordingPort {
        fn schedule_save(&mut self, request: SaveRequest) {
            self.log.lock().unwrap().push(request);
        }
    }

    /// Types `text` one character at a time through the display-edit path,
    /// the way textarea input events arrive
    fn type_chars(buffer: &mut EditBuffer, text: &str) {
        for ch in text.chars() {
            let caret = buffer.caret_display_offset();
            let mut display = buffer.display_content().to_string();
            let byte = display
                .char_indices()
                .nth(caret)
                .map(|(b, _)| b)
                .unwrap_or(display.len());
            display.insert(byte, ch);
            buffer.apply_display_edit(&display, caret + 1, EditOrigin::UserInput);
        }
    }

    /// Presses backspace once at the current caret
    fn backspace(buffer: &mut EditBuffer) {
        let caret = buffer.caret_display_offset();
        assert!(caret > 0, "backspace at start of buffer");
        let display: String = buffer.display_content().to_string();
        let new_display: String = display
            .chars()
            .take(caret - 1)
            .chain(display.chars().skip(caret))
            .collect();
        buffer.apply_display_edit(&new_display, caret - 1, EditOrigin::UserInput);
    }

    #[test]
    fn insert_text_moves_caret_past_insertion() {
        let mut buffer = EditBuffer::from_full_content("Hello world");
        buffer.insert_text("brave ", 6);
        assert_eq!(buffer.full_content(), "Hello brave world");
        assert_eq!(buffer.caret().position, 12);
        assert!(buffer.is_dirty());
    }

    #[test]
    fn replace_selection_rejects_reversed_range() {
        let mut buffer = EditBuffer::from_full_content("Hello");
        let err = buffer.replace_selection("x", 4, 2).unwrap_err();
        assert!(matches!(err, EditorError::InvalidRange { start: 4, end: 2 }));
        assert_eq!(buffer.full_content(), "Hello");
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn replace_selection_with_empty_range_inserts() {
        let mut buffer = EditBuffer::from_full_content("ab");
        buffer.replace_selection("X", 1, 1).unwrap();
        assert_eq!(buffer.full_content(), "aXb");
        assert_eq!(buffer.caret().position, 2);
    }

    #[test]
    fn display_edit_preserves_tag_lines_outside_the_change() {
        let mut buffer = EditBuffer::from_full_content("A\n@@scene: 1\nB");
        assert_eq!(buffer.display_content(), "A\nB");
        buffer.apply_display_edit("A!\nB", 2, EditOrigin::UserInput);
        assert_eq!(buffer.full_content(), "A!\n@@scene: 1\nB");
        assert_eq!(buffer.display_content(), "A!\nB");
        assert_eq!(buffer.caret().position, 2);
    }

    #[test]
    fn deleting_across_a_tag_line_takes_the_tag_with_it() {
        let mut buffer = EditBuffer::from_full_content("A\n@@t\nB");
        // delete the display newline joining the two visible lines
        buffer.apply_display_edit("AB", 1, EditOrigin::UserInput);
        assert_eq!(buffer.full_content(), "AB");
        assert_eq!(buffer.display_content(), "AB");
    }

    #[test]
    fn display_edit_without_change_only_moves_caret() {
        let mut buffer = EditBuffer::from_full_content("abc");
        buffer.apply_display_edit("abc", 2, EditOrigin::UserInput);
        assert_eq!(buffer.caret().position, 2);
        assert!(!buffer.is_dirty());
        assert!(!buffer.can_undo());
    }

    #[test]
    fn consecutive_keystrokes_coalesce_into_one_undo_step() {
        let mut buffer = EditBuffer::new();
        type_chars(&mut buffer, "Hi");
        assert_eq!(buffer.display_content(), "Hi");
        assert!(buffer.undo());
        assert_eq!(buffer.display_content(), "");
        assert!(!buffer.can_undo());
    }

    #[test]
    fn whitespace_starts_a_new_batch() {
        let mut buffer = EditBuffer::new();
        type_chars(&mut buffer, "Hello world");
        assert!(buffer.undo());
        assert_eq!(buffer.display_content(), "Hello");
        assert!(buffer.undo());
        assert_eq!(buffer.display_content(), "");
    }

    #[test]
    fn switching_to_deletion_breaks_the_batch() {
        let mut buffer = EditBuffer::new();
        type_chars(&mut buffer, "ab");
        backspace(&mut buffer);
        assert_eq!(buffer.display_content(), "a");
        assert!(buffer.undo());
        assert_eq!(buffer.display_content(), "ab");
        assert!(buffer.undo());
        assert_eq!(buffer.display_content(), "");
    }

    #[test]
    fn backspace_run_coalesces() {
        let mut buffer = EditBuffer::from_full_content("abc");
        buffer.set_caret_from_display(3);
        backspace(&mut buffer);
        backspace(&mut buffer);
        backspace(&mut buffer);
        assert_eq!(buffer.display_content(), "");
        assert!(buffer.undo());
        assert_eq!(buffer.display_content(), "abc");
    }

    #[test]
    fn caret_jump_breaks_the_batch() {
        let mut buffer = EditBuffer::new();
        type_chars(&mut buffer, "ab");
        buffer.set_caret_from_display(0);
        buffer.apply_display_edit("Xab", 1, EditOrigin::UserInput);
        assert!(buffer.undo());
        assert_eq!(buffer.display_content(), "ab");
    }

    #[test]
    fn undo_on_empty_history_is_a_noop() {
        let mut buffer = EditBuffer::from_full_content("abc");
        assert!(!buffer.undo());
        assert!(!buffer.redo());
        assert_eq!(buffer.full_content(), "abc");
    }

    #[test]
    fn redo_restores_undone_edit_and_new_edit_clears_it() {
        let mut buffer = EditBuffer::from_full_content("a");
        buffer.insert_text("b", 1);
        assert!(buffer.undo());
        assert_eq!(buffer.full_content(), "a");
        assert!(buffer.can_redo());
        assert!(buffer.redo());
        assert_eq!(buffer.full_content(), "ab");

        assert!(buffer.undo());
        buffer.insert_text("c", 1);
        assert!(!buffer.can_redo());
    }

    #[test]
    fn history_is_capped() {
        let mut buffer = EditBuffer::new();
        for _ in 0..(MAX_HISTORY + 5) {
            buffer.insert_text("x", 0);
        }
        let mut undone = 0;
        while buffer.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_HISTORY);
    }

    #[test]
    fn programmatic_set_content_reconciles_caret() {
        let mut buffer = EditBuffer::from_full_content("INT. HOUSE\n\n");
        buffer.set_caret_from_display(11);
        buffer.set_content(
            "INT. HOUSE\nJohn walks in.\n\n",
            EditOrigin::Programmatic,
            true,
        );
        assert_eq!(buffer.caret().position, 11);
        assert_eq!(buffer.caret().line, 2);
    }

    #[test]
    fn programmatic_set_content_shifts_caret_past_insertion() {
        let mut buffer = EditBuffer::from_full_content("Hello world");
        buffer.set_caret_from_display(11);
        buffer.set_content("Hello there world", EditOrigin::Programmatic, true);
        assert_eq!(buffer.caret().position, 17);
    }

    #[test]
    fn user_set_content_skips_reconciliation() {
        let mut buffer = EditBuffer::from_full_content("Hello world");
        buffer.set_caret_from_display(11);
        buffer.set_content("Hi", EditOrigin::UserInput, true);
        // no prefix shift, just clamped into the new content
        assert_eq!(buffer.caret().position, 2);
    }

    #[test]
    fn set_content_resets_history_and_dirty_state() {
        let mut buffer = EditBuffer::from_full_content("a");
        buffer.insert_text("b", 1);
        assert!(buffer.can_undo());
        buffer.set_content("fresh", EditOrigin::Programmatic, false);
        assert!(!buffer.can_undo());
        assert!(!buffer.can_redo());
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn save_acknowledgement_clears_dirty_only_when_current() {
        let mut buffer = EditBuffer::from_full_content("a");
        buffer.insert_text("b", 1);
        let stale = buffer.save_generation();
        buffer.insert_text("c", 2);
        assert!(!buffer.acknowledge_save(stale));
        assert!(buffer.is_dirty());
        assert!(buffer.acknowledge_save(buffer.save_generation()));
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn failed_save_keeps_buffer_dirty() {
        let mut buffer = EditBuffer::from_full_content("a");
        buffer.insert_text("b", 1);
        let generation = buffer.save_generation();
        buffer.save_failed(generation, "network unreachable");
        assert!(buffer.is_dirty());
    }

    #[test]
    fn every_mutation_notifies_the_autosave_port() {
        let port = RecordingPort::default();
        let log = port.log.clone();
        let mut buffer = EditBuffer::with_autosave("start", Box::new(port));
        buffer.insert_text("!", 5);
        buffer.apply_display_edit("start!?", 7, EditOrigin::UserInput);
        buffer.undo();

        let requests = log.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|r| r.is_dirty));
        assert_eq!(requests.last().unwrap().content, "start!");
        // generations are strictly increasing
        assert!(requests.windows(2).all(|w| w[0].generation < w[1].generation));
    }

    #[test]
    fn autosave_context_carries_tag_summary() {
        let port = RecordingPort::default();
        let log = port.log.clone();
        let mut buffer = EditBuffer::with_autosave("@@scene: 3\nINT. LAB", Box::new(port));
        buffer.insert_text(" - NIGHT", 19);
        let requests = log.lock().unwrap();
        assert_eq!(requests.last().unwrap().context.scenes, vec!["3"]);
    }

    #[test]
    fn highlight_expires_and_clears_on_edit() {
        let mut buffer = EditBuffer::from_full_content("hello");
        buffer.set_highlight(0, 5, 1000.0);
        assert!(buffer.active_highlight(2000.0).is_some());
        assert!(buffer.active_highlight(1000.0 + 3000.0).is_none());

        buffer.set_highlight(0, 5, 1000.0);
        buffer.insert_text("x", 0);
        assert!(buffer.active_highlight(1001.0).is_none());
    }

    #[test]
    fn load_resets_everything() {
        let mut buffer = EditBuffer::from_full_content("old");
        buffer.insert_text("!", 3);
        buffer.set_highlight(0, 2, 0.0);
        buffer.load("@@scene: 1\nnew");
        assert_eq!(buffer.display_content(), "new");
        assert!(!buffer.is_dirty());
        assert!(!buffer.can_undo());
        assert!(buffer.active_highlight(1.0).is_none());
        assert_eq!(buffer.caret(), CaretState::at_origin());
    }

    #[test]
    fn selection_is_stored_in_full_coordinates() {
        let mut buffer = EditBuffer::from_full_content("@@t\nhello");
        // display offsets 1..4 of "hello" sit past the 4-char tag prefix
        buffer.set_selection_from_display(1, 4);
        let span = buffer.selection().unwrap();
        assert_eq!((span.start, span.end), (5, 8));
        // caret lands at the selection end
        assert_eq!(buffer.caret().position, 8);
    }

    #[test]
    fn highlight_is_stored_in_full_coordinates() {
        let mut buffer = EditBuffer::from_full_content("@@t\nhello");
        buffer.set_highlight(1, 4, 0.0);
        let hl = buffer.active_highlight(1.0).unwrap();
        assert_eq!((hl.start, hl.end), (5, 8));
    }

    #[test]
    fn caret_and_selection_moves_clear_the_highlight() {
        let mut buffer = EditBuffer::from_full_content("hello");
        buffer.set_highlight(0, 5, 1000.0);
        buffer.set_caret_from_display(3);
        assert!(buffer.active_highlight(1001.0).is_none());

        buffer.set_highlight(0, 5, 1000.0);
        buffer.set_selection_from_display(1, 4);
        assert!(buffer.active_highlight(1001.0).is_none());
    }

    #[test]
    fn caret_line_context_reports_display_line() {
        use crate::models::elements::{NoopClassifier, ScreenplayElement};
        let mut buffer = EditBuffer::from_full_content("@@scene: 1\nINT. HOUSE\nJohn walks in.");
        buffer.set_caret_from_display(13);
        let context = buffer.caret_line_context(&NoopClassifier);
        assert_eq!(context.text, "John walks in.");
        assert_eq!(context.line_index, 1);
        assert_eq!(context.caret_col, 2);
        assert_eq!(context.element, ScreenplayElement::Unknown);
    }
}
