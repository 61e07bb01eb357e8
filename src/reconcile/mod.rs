//! Caret reconciliation and display diffing
//!
//! When content changes under the caret (a programmatic replacement, or a
//! textarea edit reported back by the host), the caret has to land somewhere
//! sensible in the new text. Reconciliation uses a common-prefix heuristic:
//! a caret inside the unchanged prefix stays put; a caret past it shifts by
//! the net length change. The heuristic can misplace the caret when the
//! change region itself contained it, which is accepted behavior.
//!
//! All functions here are pure and operate on display-space strings.

use crate::models::caret::EditOrigin;

/// Number of leading characters shared by `old` and `new`
pub fn common_prefix_len(old: &str, new: &str) -> usize {
    old.chars()
        .zip(new.chars())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Number of trailing characters shared by `old` and `new`, capped at `max`
/// so the suffix never overlaps the common prefix
fn common_suffix_len(old: &str, new: &str, max: usize) -> usize {
    old.chars()
        .rev()
        .zip(new.chars().rev())
        .take_while(|(a, b)| a == b)
        .count()
        .min(max)
}

/// Computes where a caret saved against `old_display` should land in
/// `new_display`.
///
/// With `p` the common prefix length: a caret at or before `p` keeps its
/// position (clamped to the new length); a caret past `p` shifts by the net
/// length change, clamped into `0..=new_len`. Total over all inputs.
pub fn reconcile_caret(old_display: &str, new_display: &str, saved_caret: usize) -> usize {
    let old_len = old_display.chars().count();
    let new_len = new_display.chars().count();
    let saved = saved_caret.min(old_len);
    let prefix = common_prefix_len(old_display, new_display);
    if saved <= prefix {
        saved.min(new_len)
    } else {
        let shifted = saved as i64 + new_len as i64 - old_len as i64;
        shifted.clamp(0, new_len as i64) as usize
    }
}

/// Whether an edit origin requires caret reconciliation.
///
/// User input carries its own caret from the text control; only
/// programmatic replacements move content under the caret.
pub fn needs_reconciliation(origin: EditOrigin) -> bool {
    origin == EditOrigin::Programmatic
}

/// Confirms that the text control's rendered value matches the display
/// content a caret restore was computed against. When this fails the caller
/// must skip the restore rather than re-apply a stale caret.
pub fn confirm_control_sync(control_value: &str, expected_display: &str) -> bool {
    control_value == expected_display
}

/// A single contiguous display-space edit recovered by diffing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySplice {
    /// Display char offset where the change begins
    pub start: usize,
    /// Number of display chars removed from the old content
    pub removed: usize,
    /// Replacement text
    pub inserted: String,
}

impl DisplaySplice {
    pub fn inserted_len(&self) -> usize {
        self.inserted.chars().count()
    }

    pub fn is_pure_insert(&self) -> bool {
        self.removed == 0
    }

    pub fn is_pure_delete(&self) -> bool {
        self.inserted.is_empty()
    }
}

/// Recovers the single splice that turns `old` into `new` by trimming the
/// common prefix and suffix. Returns `None` when the strings are equal.
///
/// A textarea edit event is always one contiguous change, so prefix/suffix
/// trimming reconstructs it exactly; for arbitrary string pairs the result
/// is still a valid (if maximal) single splice.
pub fn diff_displays(old: &str, new: &str) -> Option<DisplaySplice> {
    if old == new {
        return None;
    }
    let old_len = old.chars().count();
    let new_len = new.chars().count();
    let prefix = common_prefix_len(old, new);
    let max_suffix = old_len.min(new_len) - prefix;
    let suffix = common_suffix_len(old, new, max_suffix);
    let inserted: String = new
        .chars()
        .skip(prefix)
        .take(new_len - prefix - suffix)
        .collect();
    Some(DisplaySplice {
        start: prefix,
        removed: old_len - prefix - suffix,
        inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_before_change_stays_put() {
        // insertion happens after the caret
        assert_eq!(reconcile_caret("INT. HOUSE\n\n", "INT. HOUSE\nJohn walks in.\n\n", 11), 11);
        assert_eq!(reconcile_caret("abcdef", "abcXdef", 2), 2);
    }

    #[test]
    fn caret_after_insertion_shifts_right() {
        // "Hello world" -> "Hello there world", caret at end
        assert_eq!(reconcile_caret("Hello world", "Hello there world", 11), 17);
        assert_eq!(reconcile_caret("abcdef", "abcXdef", 5), 6);
    }

    #[test]
    fn caret_after_deletion_shifts_left() {
        assert_eq!(reconcile_caret("Hello there world", "Hello world", 17), 11);
    }

    #[test]
    fn caret_clamps_when_shift_goes_negative() {
        // large deletion right at the caret
        assert_eq!(reconcile_caret("abcdef", "a", 3), 0);
        assert_eq!(reconcile_caret("abcdef", "a", 6), 1);
    }

    #[test]
    fn caret_on_prefix_boundary_keeps_position() {
        // p = 3, caret exactly at p
        assert_eq!(reconcile_caret("abcdef", "abcXYZ", 3), 3);
    }

    #[test]
    fn oversized_saved_caret_is_clamped_first() {
        assert_eq!(reconcile_caret("abc", "abc", 99), 3);
        assert_eq!(reconcile_caret("abc", "ab", 99), 2);
    }

    #[test]
    fn identical_content_is_identity() {
        for caret in 0..=5 {
            assert_eq!(reconcile_caret("hello", "hello", caret), caret);
        }
    }

    #[test]
    fn empty_new_content_sends_caret_to_zero() {
        assert_eq!(reconcile_caret("hello", "", 4), 0);
    }

    #[test]
    fn reconciliation_only_for_programmatic_edits() {
        assert!(needs_reconciliation(EditOrigin::Programmatic));
        assert!(!needs_reconciliation(EditOrigin::UserInput));
    }

    #[test]
    fn control_sync_is_exact_equality() {
        assert!(confirm_control_sync("abc", "abc"));
        assert!(!confirm_control_sync("abc", "abc "));
        assert!(!confirm_control_sync("", "a"));
    }

    #[test]
    fn diff_finds_mid_string_insertion() {
        let splice = diff_displays("Hello world", "Hello there world").unwrap();
        assert_eq!(splice.start, 6);
        assert_eq!(splice.removed, 0);
        assert_eq!(splice.inserted, "there ");
        assert!(splice.is_pure_insert());
    }

    #[test]
    fn diff_finds_deletion() {
        let splice = diff_displays("Hello there world", "Hello world").unwrap();
        assert_eq!(splice.start, 6);
        assert_eq!(splice.removed, 6);
        assert!(splice.is_pure_delete());
    }

    #[test]
    fn diff_finds_replacement() {
        let splice = diff_displays("Hello world", "Hello earth").unwrap();
        assert_eq!(splice.start, 6);
        assert_eq!(splice.removed, 5);
        assert_eq!(splice.inserted, "earth");
    }

    #[test]
    fn diff_of_equal_strings_is_none() {
        assert!(diff_displays("same", "same").is_none());
        assert!(diff_displays("", "").is_none());
    }

    #[test]
    fn diff_handles_edits_at_the_ends() {
        let splice = diff_displays("world", "Hello world").unwrap();
        assert_eq!((splice.start, splice.removed), (0, 0));
        assert_eq!(splice.inserted, "Hello ");

        let splice = diff_displays("Hello", "Hello!").unwrap();
        assert_eq!((splice.start, splice.removed), (5, 0));
        assert_eq!(splice.inserted, "!");
    }

    #[test]
    fn diff_on_repeated_characters_is_deterministic() {
        // "aaa" -> "aa" could delete any of the three; prefix-first trimming
        // always deletes the last
        let splice = diff_displays("aaa", "aa").unwrap();
        assert_eq!((splice.start, splice.removed), (2, 1));
        assert!(splice.is_pure_delete());
    }

    #[test]
    fn diff_counts_chars_not_bytes() {
        let splice = diff_displays("café", "cafe").unwrap();
        assert_eq!((splice.start, splice.removed), (3, 1));
        assert_eq!(splice.inserted, "e");
    }

    #[test]
    fn diff_suffix_never_overlaps_prefix() {
        // old is a substring of new expanded in the middle of a run
        let splice = diff_displays("ab", "aXXb").unwrap();
        assert_eq!((splice.start, splice.removed), (1, 0));
        assert_eq!(splice.inserted, "XX");
    }
}
