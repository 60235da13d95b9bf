//! Text utility helpers organized by small, focused structs.
//! All functions are associated fns to keep call sites
//! ergonomic, testable, and discoverable.

use std::sync::LazyLock;

use regex::Regex;

/// Trailing file-extension check, e.g. `main.rs`, `index.d.ts`
static EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[A-Za-z][A-Za-z0-9]{0,7}$").expect("valid regex"));

/// Whitespace and quoting helpers for extracted fragments
pub struct TextUtils;

impl TextUtils
{
    /// Collapse all runs of whitespace into single spaces and trim
    pub fn normalize_ws(s: &str) -> String
    {
        let mut out = String::with_capacity(s.len());
        let mut pending_space = false;

        for c in s.chars()
        {
            if c.is_whitespace()
            {
                pending_space = !out.is_empty();
            }
            else
            {
                if pending_space
                {
                    out.push(' ');
                    pending_space = false;
                }

                out.push(c);
            }
        }

        out
    }

    /// Strip one layer of matching surrounding quotes, then trim
    pub fn trim_quotes(s: &str) -> &str
    {
        let t = s.trim();

        for (open, close) in [('"', '"'), ('\'', '\''), ('`', '`'), ('“', '”')]
        {
            if t.chars().count() >= 2 && t.starts_with(open) && t.ends_with(close)
            {
                return t[open.len_utf8()..t.len() - close.len_utf8()].trim();
            }
        }

        t
    }

    /// Shorten `text` to at most `limit` characters, preferring a sentence
    /// boundary. Mid-sentence cuts get an ellipsis. Never returns an empty
    /// string for non-empty input.
    pub fn summarize(text: &str, limit: usize) -> String
    {
        let flat = Self::normalize_ws(text);
        let chars: Vec<char> = flat.chars().collect();

        if chars.len() <= limit
        {
            return flat;
        }

        let window = &chars[..limit];

        // Prefer cutting at the last sentence end, but only when that
        // keeps a reasonable share of the window
        if let Some(i) = window
            .iter()
            .rposition(|c| matches!(c, '.' | '!' | '?'))
        {
            if i + 1 >= limit / 2
            {
                return window[..=i].iter().collect();
            }
        }

        // Otherwise cut at the last word break and mark the truncation
        let stop = window
            .iter()
            .rposition(|c| c.is_whitespace())
            .unwrap_or(limit);

        let mut out: String = window[..stop].iter().collect();
        out.push('…');
        out
    }

    /// Case-insensitive whole-word containment check
    pub fn contains_word(haystack: &str, word: &str) -> bool
    {
        if word.trim().is_empty()
        {
            return false;
        }

        let pattern = format!(r"(?i)\b{}\b", regex::escape(word.trim()));

        // Escaped literals always compile; treat a failure as no match
        Regex::new(&pattern)
            .map(|re| re.is_match(haystack))
            .unwrap_or(false)
    }

    /// Heuristic check that a fragment reads like a file path
    pub fn looks_like_path(s: &str) -> bool
    {
        let t = s.trim();

        if t.is_empty() || t.contains(' ')
        {
            return false;
        }

        t.contains('/') || EXTENSION_RE.is_match(t)
    }
}
