//! Screenplay document model
//!
//! A document is a sequence of typed line records. Visible lines carry the
//! prose the author reads; tag lines carry structural metadata (scene
//! numbers, character cues, AI insertion markers) that is persisted with the
//! document but never rendered in the editing control. The line records are
//! the canonical representation: both the full content and the display
//! content are projections of them, so the two can never drift apart.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Marker that opens a tag line. A line is a tag line exactly when its text
/// begins with this marker; the pattern is reserved and display content can
/// therefore never contain a line that starts with it.
pub const TAG_MARKER: &str = "@@";

/// Structural tag categories
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Scene,
    Character,
    Location,
    AiInsertion,
    Unknown,
}

static TAG_KEYWORDS: Lazy<HashMap<&'static str, TagKind>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert("scene", TagKind::Scene);
    table.insert("character", TagKind::Character);
    table.insert("location", TagKind::Location);
    table.insert("ai", TagKind::AiInsertion);
    table
});

/// Parsed form of a tag line.
///
/// `raw` keeps the exact original text so serializing the document back out
/// is lossless even for tags the parser does not recognize.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TagPayload {
    pub kind: TagKind,
    /// Keyword as written, lowercased (`scene`, `character`, ...)
    pub keyword: String,
    /// Text after the colon, trimmed; empty when the tag has no value
    pub value: String,
    /// The complete line including the marker
    pub raw: String,
}

impl TagPayload {
    /// Parses a line into a tag payload. Returns `None` for lines that do
    /// not start with the tag marker.
    pub fn parse(line: &str) -> Option<TagPayload> {
        let body = line.strip_prefix(TAG_MARKER)?;
        let (keyword_part, value_part) = match body.split_once(':') {
            Some((k, v)) => (k, v),
            None => (body, ""),
        };
        let keyword = keyword_part.trim().to_ascii_lowercase();
        let kind = TAG_KEYWORDS
            .get(keyword.as_str())
            .copied()
            .unwrap_or(TagKind::Unknown);
        Some(TagPayload {
            kind,
            keyword,
            value: value_part.trim().to_string(),
            raw: line.to_string(),
        })
    }
}

/// One line of the document, classified at parse time
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ScriptLine {
    /// A line the author sees and edits
    Visible(String),
    /// A structural metadata line, hidden from the editing control
    Tag(TagPayload),
}

impl ScriptLine {
    /// Classifies a single line of full content
    pub fn classify(line: &str) -> ScriptLine {
        match TagPayload::parse(line) {
            Some(payload) => ScriptLine::Tag(payload),
            None => ScriptLine::Visible(line.to_string()),
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, ScriptLine::Tag(_))
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, ScriptLine::Visible(_))
    }

    /// The line's text as it appears in the full content
    pub fn as_full_text(&self) -> &str {
        match self {
            ScriptLine::Visible(text) => text,
            ScriptLine::Tag(payload) => &payload.raw,
        }
    }

    /// Length of the line in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.as_full_text().chars().count()
    }
}

/// Document metadata carried alongside the line records
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    pub id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub created_at: Option<String>,
    pub modified_at: Option<String>,
}

impl DocumentMeta {
    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        DocumentMeta {
            id: uuid::Uuid::new_v4().to_string(),
            title: None,
            author: None,
            created_at: Some(now.clone()),
            modified_at: Some(now),
        }
    }

    pub fn touch(&mut self) {
        self.modified_at = Some(chrono::Utc::now().to_rfc3339());
    }
}

impl Default for DocumentMeta {
    fn default() -> Self {
        DocumentMeta::new()
    }
}

/// Aggregated view of the tag lines in a document, reported to the host
/// alongside auto-save requests
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct TagSummary {
    pub scenes: Vec<String>,
    pub characters: Vec<String>,
    pub locations: Vec<String>,
    pub ai_markers: usize,
    pub tag_count: usize,
}

/// A screenplay document: metadata plus the canonical line records
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScriptDocument {
    pub meta: DocumentMeta,
    pub lines: Vec<ScriptLine>,
}

impl ScriptDocument {
    /// An empty document: a single empty visible line, so full content
    /// round-trips to the empty string
    pub fn new() -> Self {
        ScriptDocument {
            meta: DocumentMeta::new(),
            lines: vec![ScriptLine::Visible(String::new())],
        }
    }

    /// Parses full content into line records. Fresh metadata is attached;
    /// use [`ScriptDocument::replace_content`] to keep existing metadata.
    pub fn from_full_content(full: &str) -> Self {
        ScriptDocument {
            meta: DocumentMeta::new(),
            lines: parse_lines(full),
        }
    }

    /// Re-parses the line records from new full content, keeping the
    /// document identity and bumping the modification timestamp
    pub fn replace_content(&mut self, full: &str) {
        self.lines = parse_lines(full);
        self.meta.touch();
    }

    /// The persisted representation: every line, tags included
    pub fn full_content(&self) -> String {
        let mut out = String::new();
        for (idx, line) in self.lines.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            out.push_str(line.as_full_text());
        }
        out
    }

    /// The rendered representation: visible lines only
    pub fn display_content(&self) -> String {
        let mut out = String::new();
        let mut first = true;
        for line in &self.lines {
            if let ScriptLine::Visible(text) = line {
                if first {
                    first = false;
                } else {
                    out.push('\n');
                }
                out.push_str(text);
            }
        }
        out
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn visible_line_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_visible()).count()
    }

    /// Total length of the full content in characters
    pub fn char_len(&self) -> usize {
        let newlines = self.lines.len().saturating_sub(1);
        self.lines.iter().map(ScriptLine::char_len).sum::<usize>() + newlines
    }

    /// Splices `replacement` over the character range `start..end` of the
    /// full content and re-parses the line records. Out-of-bounds offsets
    /// clamp to the content length; a reversed range collapses to an
    /// insertion at `start`.
    pub fn splice(&mut self, start: usize, end: usize, replacement: &str) {
        let full = self.full_content();
        let total = full.chars().count();
        let start = start.min(total);
        let end = end.clamp(start, total);
        let start_byte = byte_offset(&full, start);
        let end_byte = byte_offset(&full, end);
        let mut next = full;
        next.replace_range(start_byte..end_byte, replacement);
        self.lines = parse_lines(&next);
        self.meta.touch();
    }

    /// Collects scene/character/location values and marker counts from the
    /// document's tag lines
    pub fn tag_summary(&self) -> TagSummary {
        let mut summary = TagSummary::default();
        for line in &self.lines {
            if let ScriptLine::Tag(payload) = line {
                summary.tag_count += 1;
                match payload.kind {
                    TagKind::Scene => summary.scenes.push(payload.value.clone()),
                    TagKind::Character => summary.characters.push(payload.value.clone()),
                    TagKind::Location => summary.locations.push(payload.value.clone()),
                    TagKind::AiInsertion => summary.ai_markers += 1,
                    TagKind::Unknown => {}
                }
            }
        }
        summary
    }
}

impl Default for ScriptDocument {
    fn default() -> Self {
        ScriptDocument::new()
    }
}

fn parse_lines(full: &str) -> Vec<ScriptLine> {
    full.split('\n').map(ScriptLine::classify).collect()
}

/// Byte position of the `char_offset`-th character of `s`, or `s.len()`
/// when the offset is at or past the end
fn byte_offset(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}
