//! Suggestion segmentation: pull discrete actionable items out of one
//! comment body.
//!
//! Four strategies run unconditionally and their outputs are concatenated
//! before a case-insensitive, order-preserving dedup: list items, pattern
//! lines, suggested-change blocks, and a plain-text fallback. Structured
//! signals are preferred for precision, but most real automated-review
//! comments are unstructured prose; the fallback exists so those never
//! produce a silently empty result.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::core::page;
use crate::infra::utils::TextUtils;

/// Flattened comment text shorter than this is too thin to keep as a
/// fallback suggestion.
const MIN_FALLBACK_CHARS: usize = 10;

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static LIST_ITEM_SEL: LazyLock<Selector> = LazyLock::new(|| sel("li"));
static DETAILS_SEL: LazyLock<Selector> = LazyLock::new(|| sel("details"));
static SUMMARY_SEL: LazyLock<Selector> = LazyLock::new(|| sel("summary"));
static PRE_SEL: LazyLock<Selector> = LazyLock::new(|| sel("pre"));
static CODE_BLOCK_SEL: LazyLock<Selector> = LazyLock::new(|| sel("pre, code"));
static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| sel("table"));
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| sel("tr"));
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| sel("td"));
static CODE_CELL_SEL: LazyLock<Selector> = LazyLock::new(|| sel(r#"td[class*="code"]"#));

/// Bullet or numbered line: `- x`, `* x`, `1. x`.
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*]|\d+\.)\s+(.+)$").expect("valid regex"));

/// Keyword-prefixed line: `Fix: x`, `Suggestion: x`, ...
static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:suggestion|fix|improve|change|refactor|rename|remove|add|update)\s*:\s*(.+)$",
    )
    .expect("valid regex")
});

/// Extract zero or more discrete suggestion strings from one comment body.
///
/// Always returns a deduplicated (lowercased trimmed key), first-seen-order
/// list. The plain-text fallback fires only when the three structured
/// strategies all came up empty.
pub fn segment(body: ElementRef<'_>) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    found.extend(list_items(body));
    found.extend(pattern_lines(body));
    found.extend(change_blocks(body));

    let mut unique: IndexMap<String, String> = IndexMap::new();

    for item in found {
        let text = item.trim().to_string();
        if text.is_empty() {
            continue;
        }

        unique.entry(text.to_lowercase()).or_insert(text);
    }

    if !unique.is_empty() {
        return unique.into_values().collect();
    }

    // Catch-all: one suggestion holding the whole comment, when substantial
    let flat = page::flatten_text(body);
    let flat = TextUtils::normalize_ws(&flat);

    if flat.chars().count() > MIN_FALLBACK_CHARS {
        return vec![flat];
    }

    Vec::new()
}

/// Strategy 1: every list-item element's text.
fn list_items(body: ElementRef<'_>) -> Vec<String> {
    body.select(&LIST_ITEM_SEL)
        .map(|li| TextUtils::normalize_ws(&page::flatten_text(li)))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Strategy 2: bullet/numbered or keyword-prefixed lines of the flattened
/// text, remainder trimmed of surrounding quotes.
fn pattern_lines(body: ElementRef<'_>) -> Vec<String> {
    let mut out = Vec::new();

    for line in page::flatten_lines(body) {
        let captured = BULLET_RE
            .captures(&line)
            .or_else(|| KEYWORD_RE.captures(&line));

        if let Some(cap) = captured {
            let item = TextUtils::trim_quotes(&cap[1]);
            if !item.is_empty() {
                out.push(item.to_string());
            }
        }
    }

    out
}

/// Strategy 3: proposed code changes in any of three structured shapes.
fn change_blocks(body: ElementRef<'_>) -> Vec<String> {
    let mut out = Vec::new();

    // (a) collapsible blocks labelled as suggestions
    for details in body.select(&DETAILS_SEL) {
        if let Some(code) = details_change(details) {
            out.push(format!("Suggested change:\n{code}"));
        }
    }

    // (b) row-structured diff tables rendered unified-diff style
    for table in body.select(&TABLE_SEL) {
        if let Some(diff) = render_diff_table(table) {
            out.push(format!("Suggested diff:\n{diff}"));
        }
    }

    // (c) raw preformatted blocks that read like a diff
    for pre in body.select(&PRE_SEL) {
        if let Some(diff) = diff_pre(pre) {
            out.push(format!("Suggested diff:\n{diff}"));
        }
    }

    out
}

/// Code content of a collapsible block whose header marks it as a
/// suggestion, if so labelled.
fn details_change(details: ElementRef<'_>) -> Option<String> {
    let header = details
        .select(&SUMMARY_SEL)
        .next()
        .map(|s| page::flatten_text(s).to_lowercase())
        .unwrap_or_default();

    if !header.contains("suggested change") && !header.contains("suggestion") {
        return None;
    }

    let code = details
        .select(&CODE_BLOCK_SEL)
        .next()
        .map(page::code_text)
        .unwrap_or_else(|| page::text_without(details, &["summary"]));

    let code = code.trim();
    if code.is_empty() {
        return None;
    }

    Some(code.to_string())
}

/// Render a diff table into unified-diff-style text based on per-row
/// deletion/addition markers. `None` when no row carries a marker, which
/// keeps plain data tables out of the suggestion list.
fn render_diff_table(table: ElementRef<'_>) -> Option<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut any_marker = false;

    for tr in table.select(&ROW_SEL) {
        let mut row_handled = false;

        for td in tr.select(&CELL_SEL) {
            let marker = cell_marker(td);

            if let Some(sign) = marker {
                let text = cell_code(td);
                if !text.is_empty() {
                    lines.push(format!("{sign} {text}"));
                    any_marker = true;
                    row_handled = true;
                }
            }
        }

        if !row_handled {
            // Context row: two-space indent
            if let Some(cell) = tr.select(&CODE_CELL_SEL).next() {
                let text = cell_code(cell);
                if !text.is_empty() {
                    lines.push(format!("  {text}"));
                }
            }
        }
    }

    if !any_marker || lines.is_empty() {
        return None;
    }

    Some(lines.join("\n"))
}

/// Deletion/addition marker for one table cell, from class names or an
/// explicit marker attribute.
fn cell_marker(td: ElementRef<'_>) -> Option<char> {
    if let Some(marker) = td.value().attr("data-code-marker") {
        match marker.trim() {
            "-" => return Some('-'),
            "+" => return Some('+'),
            _ => {}
        }
    }

    let classes: Vec<&str> = td.value().classes().collect();

    if classes.iter().any(|c| c.contains("deletion") || c.contains("removed") || *c == "old") {
        return Some('-');
    }

    if classes.iter().any(|c| c.contains("addition") || c.contains("added") || *c == "new") {
        return Some('+');
    }

    None
}

/// Cell text with any leading diff sign stripped, since the renderer adds
/// its own.
fn cell_code(td: ElementRef<'_>) -> String {
    let text = page::code_text(td);
    let text = text.trim();

    text.strip_prefix('+')
        .or_else(|| text.strip_prefix('-'))
        .unwrap_or(text)
        .trim()
        .to_string()
}

/// Text of a raw `<pre>` block when it reads like a diff. Blocks living
/// inside `<details>` belong to strategy (a) and are skipped here.
fn diff_pre(pre: ElementRef<'_>) -> Option<String> {
    if page::has_ancestor(pre, "details") {
        return None;
    }

    let text = page::code_text(pre);
    let text = text.trim_end();

    if text.is_empty() || !looks_like_diff(text) {
        return None;
    }

    Some(text.to_string())
}

/// A block reads like a diff when some line starts with `+`, `-`,
/// whitespace, `@@`, or the word `diff`.
fn looks_like_diff(text: &str) -> bool {
    text.lines().any(|line| {
        line.starts_with('+')
            || line.starts_with('-')
            || line.starts_with("@@")
            || line.starts_with("diff")
            || line.starts_with(|c: char| c.is_whitespace())
    })
}

/// Comment prose with code/diff/table sub-elements stripped out.
pub fn review_text(body: ElementRef<'_>) -> Option<String> {
    let text = page::text_without(body, &["pre", "table", "details"]);
    let text = text.trim();

    if text.is_empty() {
        return None;
    }

    Some(text.to_string())
}

/// The single most relevant proposed code change for the comment: the first
/// labelled collapsible block, else the first diff table, else the first
/// diff-looking `<pre>`.
pub fn suggested_change(body: ElementRef<'_>) -> Option<String> {
    for details in body.select(&DETAILS_SEL) {
        if let Some(code) = details_change(details) {
            return Some(code);
        }
    }

    for table in body.select(&TABLE_SEL) {
        if let Some(diff) = render_diff_table(table) {
            return Some(diff);
        }
    }

    for pre in body.select(&PRE_SEL) {
        if let Some(diff) = diff_pre(pre) {
            return Some(diff);
        }
    }

    None
}
