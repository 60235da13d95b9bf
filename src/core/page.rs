//! Review-page access: parsing, address resolution, and text flattening.
//!
//! A page is one rendered code-review document captured as HTML. Everything
//! downstream (locators, classifier, segmenter) works on `scraper` element
//! handles; this module owns the parse and the text-rendering helpers that
//! turn markup subtrees into line-structured plain text.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use thiserror::Error;

use crate::infra::utils::TextUtils;

/// Elements that terminate a text line when flattening markup.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "tr", "td", "th", "table", "pre", "blockquote", "details",
    "summary",
    "section", "article", "h1", "h2", "h3", "h4", "h5", "h6",
];

static CANONICAL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"link[rel="canonical"]"#).expect("valid selector"));

static OG_URL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:url"]"#).expect("valid selector"));

/// Errors raised while opening a page or compiling configured selectors.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to read page {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid selector `{0}`")]
    BadSelector(String),
}

/// Compile a user-configurable selector string, naming it on failure.
pub fn compile_selector(css: &str) -> Result<Selector, PageError> {
    Selector::parse(css).map_err(|_| PageError::BadSelector(css.to_string()))
}

/// One parsed review page plus its resolved address.
pub struct ReviewPage {
    html: Html,
    address: String,
}

impl ReviewPage {
    /// Parse page markup with a known address.
    pub fn parse(source: &str, address: impl Into<String>) -> Self {
        Self { html: Html::parse_document(source), address: address.into() }
    }

    /// Read and parse a page file.
    ///
    /// The page address is the explicit override when given, else the page's
    /// canonical link, else its `og:url` meta tag, else the file path.
    pub fn load(path: &Path, address_override: Option<&str>) -> Result<Self, PageError> {
        let source = fs::read_to_string(path).map_err(|source| PageError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let html = Html::parse_document(&source);
        let address = address_override
            .map(str::to_string)
            .or_else(|| declared_address(&html))
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self { html, address })
    }

    /// The resolved page address used for permalinks and identity.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn document(&self) -> &Html {
        &self.html
    }

    /// All review-thread containers matching `thread_sel`, in tree order.
    pub fn threads<'a>(&'a self, thread_sel: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> {
        self.html.select(thread_sel)
    }
}

/// Address the page declares about itself, if any.
fn declared_address(html: &Html) -> Option<String> {
    if let Some(link) = html.select(&CANONICAL_SEL).next() {
        if let Some(href) = link.value().attr("href") {
            if !href.trim().is_empty() {
                return Some(href.trim().to_string());
            }
        }
    }

    html.select(&OG_URL_SEL)
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Flatten an element subtree to plain text, inserting newlines at block
/// boundaries and `<br>` tags. Inline markup contributes bare text.
pub fn flatten_text(el: ElementRef<'_>) -> String {
    text_without(el, &[])
}

/// Like [`flatten_text`], skipping any subtree rooted at a listed element
/// name. Used to pull comment prose without its code/diff/table blocks.
pub fn text_without(el: ElementRef<'_>, skip: &[&str]) -> String {
    let mut raw = String::new();

    for child in el.children() {
        push_node_text(child, skip, &mut raw);
    }

    // Collapse intra-line whitespace and blank-line runs
    let mut lines: Vec<String> = Vec::new();

    for line in raw.lines() {
        let line = TextUtils::normalize_ws(line);

        if line.is_empty() {
            continue;
        }

        lines.push(line);
    }

    lines.join("\n")
}

/// Flattened text split into normalized, non-empty lines.
pub fn flatten_lines(el: ElementRef<'_>) -> Vec<String> {
    flatten_text(el).lines().map(str::to_string).collect()
}

/// Flatten a code-bearing subtree preserving interior spacing, joining text
/// chunks without inserting block newlines between inline spans.
pub fn code_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();

    for piece in el.text() {
        out.push_str(piece);
    }

    out.trim_matches('\n').trim_end().to_string()
}

fn push_node_text(node: NodeRef<'_, Node>, skip: &[&str], out: &mut String) {
    match node.value() {
        Node::Text(t) => out.push_str(t),
        Node::Element(e) => {
            let name = e.name();

            if skip.contains(&name) {
                return;
            }

            if name == "br" {
                out.push('\n');
                return;
            }

            let block = BLOCK_ELEMENTS.contains(&name);

            if block && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }

            for child in node.children() {
                push_node_text(child, skip, out);
            }

            if block && !out.ends_with('\n') {
                out.push('\n');
            }
        }
        _ => {}
    }
}

/// Whether `el` sits under an element with the given name.
pub fn has_ancestor(el: ElementRef<'_>, name: &str) -> bool {
    let mut current = el.parent();

    while let Some(node) = current {
        if let Some(parent) = node.value().as_element() {
            if parent.name() == name {
                return true;
            }
        }

        current = node.parent();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(html: &'a Html, css: &str) -> ElementRef<'a> {
        let sel = Selector::parse(css).unwrap();
        html.select(&sel).next().expect("element present")
    }

    #[test]
    fn flatten_breaks_at_blocks_not_inline() {
        let html = Html::parse_fragment(
            "<div><p>Fix: use <code>foo</code> instead</p><p>Second line</p></div>",
        );
        let text = flatten_text(first(&html, "div"));

        assert_eq!(text, "Fix: use foo instead\nSecond line");
    }

    #[test]
    fn flatten_honors_br() {
        let html = Html::parse_fragment("<p>one<br>two</p>");
        assert_eq!(flatten_text(first(&html, "p")), "one\ntwo");
    }

    #[test]
    fn text_without_strips_subtrees() {
        let html = Html::parse_fragment(
            "<div><p>Keep this prose</p><pre>drop code</pre><table><tr><td>drop cell</td></tr></table></div>",
        );
        let text = text_without(first(&html, "div"), &["pre", "table"]);

        assert_eq!(text, "Keep this prose");
    }

    #[test]
    fn declared_address_prefers_canonical() {
        let html = Html::parse_document(
            r#"<html><head>
                <link rel="canonical" href="https://example.test/pr/7">
                <meta property="og:url" content="https://example.test/other">
            </head><body></body></html>"#,
        );

        assert_eq!(declared_address(&html).as_deref(), Some("https://example.test/pr/7"));
    }

    #[test]
    fn declared_address_falls_back_to_og_url() {
        let html = Html::parse_document(
            r#"<html><head><meta property="og:url" content="https://example.test/pr/9"></head></html>"#,
        );

        assert_eq!(declared_address(&html).as_deref(), Some("https://example.test/pr/9"));
    }

    #[test]
    fn ancestor_walk_finds_details() {
        let html = Html::parse_fragment("<details><summary>s</summary><pre>x</pre></details>");
        let pre = first(&html, "pre");

        assert!(has_ancestor(pre, "details"));
        assert!(!has_ancestor(pre, "table"));
    }
}
