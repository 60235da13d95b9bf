//! Core value types: the extracted `Suggestion` record and query results.

use serde::{Deserialize, Serialize};

/// One discrete, independently selectable actionable item extracted from a
/// review comment.
///
/// Records are immutable value objects rebuilt wholesale on every extraction
/// pass. Identity lives in `id`, which is derived from the source thread,
/// comment/item position, and a content hash of `text`, so selection state
/// keyed by `id` naturally re-applies to identical future extractions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// `{threadId}:{commentIndex}:{itemIndex}:{hash(text)}`
    pub id: String,
    /// Raw extracted suggestion string, verbatim from the segmenter
    pub text: String,
    /// Short display form, truncated near a sentence boundary
    pub summary: String,
    /// Permalink to the origin comment, or the page address
    pub source_url: String,
    /// Whether the comment was classified as authored by the automated reviewer
    pub is_primary_author: bool,
    /// Reviewed file path, when any locator strategy succeeded
    pub file_path: Option<String>,
    /// First reviewed line; present iff `line_end` is present
    pub line_start: Option<u32>,
    /// Last reviewed line; always >= `line_start` when present
    pub line_end: Option<u32>,
    /// Code context around the reviewed region
    pub code_mentioned: Option<String>,
    /// Comment prose with code/diff/table sub-elements stripped
    pub review_text: Option<String>,
    /// The single most relevant proposed code change block, if any
    pub suggested_change: Option<String>,
}

impl Suggestion {
    /// Human-readable `file (lines a-b)` label for output builders.
    pub fn location_label(&self) -> String {
        let file = self.file_path.as_deref().unwrap_or("unknown file");

        match (self.line_start, self.line_end) {
            (Some(a), Some(b)) if a == b => format!("{file} (line {a})"),
            (Some(a), Some(b)) => format!("{file} (lines {a}-{b})"),
            _ => file.to_string(),
        }
    }
}

/// Line span located for one review-thread container.
///
/// Either both bounds are present (ordered) or both are absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineRange {
    pub start: Option<u32>,
    pub end: Option<u32>,
}

impl LineRange {
    /// Build an ordered range from two candidate bounds.
    pub fn new(a: u32, b: u32) -> Self {
        Self { start: Some(a.min(b)), end: Some(a.max(b)) }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }
}

/// Snapshot answer for external callers: what was found, what is selected.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Count of visible (non-ignored) suggestions, deselected included
    pub found: usize,
    /// Count of currently selected suggestions
    pub selected: usize,
    /// Visible suggestions in extraction order
    pub suggestions: Vec<Suggestion>,
    /// Ids of the selected subset, in extraction order
    pub selected_ids: Vec<String>,
}
