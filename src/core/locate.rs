//! Context locators: file path, line range, and mentioned code for one
//! review-thread container.
//!
//! Each locator is an independent, priority-ordered chain of fallback
//! strategies over untrusted markup. A miss is `None` (or an empty
//! [`LineRange`]), never an error; the page layout is expected to vary.

use std::sync::LazyLock;

use itertools::{Itertools, MinMaxResult};
use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::core::model::LineRange;
use crate::core::page;
use crate::infra::utils::TextUtils;

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

// --- file path sources, in priority order ---

static FILE_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| {
    sel(r#"a[class*="file"], [class*="file-info"] a, [class*="file-header"] a"#)
});

static PATH_ATTR_SEL: LazyLock<Selector> =
    LazyLock::new(|| sel(r#"[data-path], [data-file-path], [data-tagsearch-path]"#));

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| sel("a[href]"));

static TITLED_SEL: LazyLock<Selector> =
    LazyLock::new(|| sel(r#"[title*="/"], [aria-label*="/"]"#));

// --- line number sources ---

static LINE_ATTR_SEL: LazyLock<Selector> =
    LazyLock::new(|| sel(r#"[data-line-number], [data-line]"#));

static LINE_CELL_SEL: LazyLock<Selector> = LazyLock::new(|| {
    sel(r#"td[class*="num"], [class*="blob-num"], [class*="line-number"]"#)
});

/// `Lines 42-45` and `on lines +67 to +87`, leading `+` stripped.
static LINES_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\blines?\s+\+?(\d+)\s*(?:-|–|—|to)\s*\+?(\d+)").expect("valid regex")
});

/// `#L123` / `#R123` anchor fragments.
static ANCHOR_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[LR](\d+)$").expect("valid regex"));

// --- code-mentioned sources ---

static DIFF_TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    sel(r#"table[class*="diff"], table[class*="blob"], [class*="diff-table"]"#)
});

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| sel("tr"));

static CODE_CELL_SEL: LazyLock<Selector> = LazyLock::new(|| sel(r#"td[class*="code"]"#));

/// Locate the reviewed file path for one thread container.
///
/// Tries, in order: a structured file-link element, an explicit path
/// attribute, file-role anchors with path-looking text, then any title/label
/// attribute containing a slash. First non-empty hit wins.
pub fn locate_file_path(thread: ElementRef<'_>) -> Option<String> {
    // (a) structured file-link element
    for el in thread.select(&FILE_LINK_SEL) {
        let text = TextUtils::normalize_ws(&page::flatten_text(el));
        if !text.is_empty() {
            return Some(text);
        }
    }

    // (b) explicit path attribute
    for el in thread.select(&PATH_ATTR_SEL) {
        for attr in ["data-path", "data-file-path", "data-tagsearch-path"] {
            if let Some(v) = el.value().attr(attr) {
                let v = v.trim();
                if !v.is_empty() {
                    return Some(v.to_string());
                }
            }
        }
    }

    // (c) file-role anchors whose text looks path-like
    for el in thread.select(&ANCHOR_SEL) {
        let href = el.value().attr("href").unwrap_or_default();

        if href.contains("#diff") || href.contains("/files") || href.contains("/blob/") {
            let text = TextUtils::normalize_ws(&page::flatten_text(el));
            if TextUtils::looks_like_path(&text) {
                return Some(text);
            }
        }
    }

    // (d) any title/label attribute carrying a slash
    for el in thread.select(&TITLED_SEL) {
        let v = el
            .value()
            .attr("title")
            .or_else(|| el.value().attr("aria-label"))
            .unwrap_or_default()
            .trim();

        if v.contains('/') {
            return Some(v.to_string());
        }
    }

    None
}

/// Locate the reviewed line range for one thread container.
///
/// Candidates from every source are merged into one set and reduced to
/// `min..max`, which keeps the result stable under unordered DOM traversal.
pub fn locate_line_range(thread: ElementRef<'_>) -> LineRange {
    let mut candidates: Vec<u32> = Vec::new();

    // Structured "Lines X-Y" text fragments anywhere in the container
    let text = page::flatten_text(thread);
    for cap in LINES_TEXT_RE.captures_iter(&text) {
        for group in [1, 2] {
            if let Ok(n) = cap[group].parse() {
                candidates.push(n);
            }
        }
    }

    // Explicit line-number attributes
    for el in thread.select(&LINE_ATTR_SEL) {
        for attr in ["data-line-number", "data-line"] {
            if let Some(v) = el.value().attr(attr) {
                if let Ok(n) = v.trim().trim_start_matches('+').parse() {
                    candidates.push(n);
                }
            }
        }
    }

    // Numbered-row indicator cells
    for el in thread.select(&LINE_CELL_SEL) {
        let t = TextUtils::normalize_ws(&page::flatten_text(el));
        if let Ok(n) = t.trim_start_matches('+').parse() {
            candidates.push(n);
        }
    }

    // Anchor fragments of the form #L123 / #R123
    for el in thread.select(&ANCHOR_SEL) {
        let href = el.value().attr("href").unwrap_or_default();

        if let Some((_, fragment)) = href.split_once('#') {
            if let Some(cap) = ANCHOR_LINE_RE.captures(fragment) {
                if let Ok(n) = cap[1].parse() {
                    candidates.push(n);
                }
            }
        }
    }

    match candidates.into_iter().minmax() {
        MinMaxResult::NoElements => LineRange::default(),
        MinMaxResult::OneElement(n) => LineRange::new(n, n),
        MinMaxResult::MinMax(a, b) => LineRange::new(a, b),
    }
}

/// Locate code context for one thread container.
///
/// Returns every diff/code table row's code cell joined by newlines, the
/// table's full text when no code cells exist, or `None` without a table.
pub fn locate_code_mentioned(thread: ElementRef<'_>) -> Option<String> {
    let table = thread.select(&DIFF_TABLE_SEL).next()?;

    let mut rows: Vec<String> = Vec::new();

    for tr in table.select(&ROW_SEL) {
        if let Some(cell) = tr.select(&CODE_CELL_SEL).next() {
            let code = page::code_text(cell);
            if !code.trim().is_empty() {
                rows.push(code);
            }
        }
    }

    if rows.is_empty() {
        let full = page::flatten_text(table);
        let full = full.trim();
        if full.is_empty() {
            return None;
        }
        return Some(full.to_string());
    }

    Some(rows.join("\n"))
}
