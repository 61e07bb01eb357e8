//! Screenplay element taxonomy
//!
//! Element kinds cross the WASM boundary as plain integers so the UI can
//! switch on them cheaply. Classification itself is pluggable: the core
//! ships a no-op classifier and the host may install a smarter one.

use serde_repr::{Deserialize_repr, Serialize_repr};
use wasm_bindgen::prelude::*;

/// Kinds of screenplay elements a display line can belong to
#[wasm_bindgen]
#[repr(u8)]
#[derive(Serialize_repr, Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenplayElement {
    #[default]
    Unknown = 0,
    SceneHeading = 1,
    Action = 2,
    Character = 3,
    Dialogue = 4,
    Parenthetical = 5,
    Transition = 6,
}

impl ScreenplayElement {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => ScreenplayElement::SceneHeading,
            2 => ScreenplayElement::Action,
            3 => ScreenplayElement::Character,
            4 => ScreenplayElement::Dialogue,
            5 => ScreenplayElement::Parenthetical,
            6 => ScreenplayElement::Transition,
            _ => ScreenplayElement::Unknown,
        }
    }
}

/// The display line under the caret, with enough context for the UI to
/// drive element-aware behavior (formatting toolbars, tab cycling)
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct LineContext {
    /// Text of the display line the caret sits on
    pub text: String,
    /// Caret column within that line, in characters
    pub caret_col: usize,
    /// Zero-based display line index
    pub line_index: usize,
    /// Classified element kind for the line
    pub element: ScreenplayElement,
}

/// Classifies a display line into a screenplay element.
///
/// The core never guesses at formatting conventions; hosts that know their
/// screenplay dialect implement this seam.
pub trait LineClassifier {
    fn classify(&self, line: &str) -> ScreenplayElement;
}

/// Default classifier: every line is `Unknown`
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClassifier;

impl LineClassifier for NoopClassifier {
    fn classify(&self, _line: &str) -> ScreenplayElement {
        ScreenplayElement::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_from_u8_roundtrip() {
        assert_eq!(ScreenplayElement::from_u8(3), ScreenplayElement::Character);
        assert_eq!(ScreenplayElement::from_u8(6), ScreenplayElement::Transition);
        assert_eq!(ScreenplayElement::from_u8(99), ScreenplayElement::Unknown);
    }

    #[test]
    fn noop_classifier_returns_unknown() {
        let classifier = NoopClassifier;
        assert_eq!(classifier.classify("INT. HOUSE"), ScreenplayElement::Unknown);
        assert_eq!(classifier.classify(""), ScreenplayElement::Unknown);
    }
}
