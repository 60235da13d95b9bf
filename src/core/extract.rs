//! Extraction orchestrator: page walk, record assembly, and the global
//! author-based filtering policy.
//!
//! Thread containers are discovered with configurable selectors; within one
//! container the three context locators run once and their result is shared
//! by every comment, since they describe the reviewed location rather than
//! any individual comment. Each segmented string becomes one `Suggestion`.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use owo_colors::OwoColorize;
use scraper::{ElementRef, Selector};
use tracing::debug;
use url::Url;

use crate::cli::{AppContext, ExtractArgs, ExtractFormat};
use crate::core::classify::Classifier;
use crate::core::hash::content_hash;
use crate::core::locate;
use crate::core::model::{LineRange, QueryResult, Suggestion};
use crate::core::page::{self, PageError, ReviewPage, compile_selector};
use crate::core::state::{PageState, SelectionStore};
use crate::infra::config::Config;
use crate::infra::utils::TextUtils;

/// Content prefix length hashed for thread identity fallback.
const THREAD_PREFIX_CHARS: usize = 80;

static PERMALINK_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r##"a[href*="#discussion"], a[href*="#issuecomment"], a[href*="#note_"], a[href*="#r"]"##,
    )
    .expect("valid selector")
});

/// Shared per-container context, located once and cloned into every
/// suggestion built from the container's comments.
#[derive(Debug, Clone, Default)]
struct ThreadContext {
    file_path: Option<String>,
    lines: LineRange,
    code_mentioned: Option<String>,
}

impl ThreadContext {
    fn locate(thread: ElementRef<'_>) -> Self {
        Self {
            file_path: locate::locate_file_path(thread),
            lines: locate::locate_line_range(thread),
            code_mentioned: locate::locate_code_mentioned(thread),
        }
    }
}

/// Compiled extraction pipeline for one configuration.
pub struct Extractor {
    thread_sel: Selector,
    comment_sel: Selector,
    body_sel: Selector,
    classifier: Classifier,
}

impl Extractor {
    /// Compile configured selectors; a bad user selector is a hard error.
    pub fn from_config(cfg: &Config) -> Result<Self, PageError> {
        Ok(Self {
            thread_sel: compile_selector(&cfg.selectors.thread)?,
            comment_sel: compile_selector(&cfg.selectors.comment)?,
            body_sel: compile_selector(&cfg.selectors.comment_body)?,
            classifier: Classifier::new(&cfg.reviewer),
        })
    }

    /// Run the full pipeline over one page snapshot.
    ///
    /// Re-running on an unchanged page yields an identical ordered list,
    /// ids included; there is no memory of prior passes.
    pub fn extract_all(&self, page: &ReviewPage) -> Vec<Suggestion> {
        let mut all: Vec<Suggestion> = Vec::new();

        for (thread_index, thread) in page.threads(&self.thread_sel).enumerate() {
            let thread_id = self.thread_identity(thread, thread_index);
            let context = ThreadContext::locate(thread);
            let comments = self.comment_roots(thread);

            debug!(
                thread = %thread_id,
                comments = comments.len(),
                file = context.file_path.as_deref().unwrap_or("-"),
                "walking review thread"
            );

            for (comment_index, comment) in comments.into_iter().enumerate() {
                let body = comment.select(&self.body_sel).next().unwrap_or(comment);
                let is_primary = self.classifier.is_primary_author(comment, body);
                let source_url = comment_permalink(comment, page.address());
                let review_text = crate::core::segment::review_text(body);
                let suggested_change = crate::core::segment::suggested_change(body);

                for (item_index, text) in crate::core::segment::segment(body).into_iter().enumerate()
                {
                    let id = format!(
                        "{thread_id}:{comment_index}:{item_index}:{}",
                        content_hash(&text)
                    );

                    all.push(Suggestion {
                        id,
                        summary: summarize_item(&text, review_text.as_deref()),
                        text,
                        source_url: source_url.clone(),
                        is_primary_author: is_primary,
                        file_path: context.file_path.clone(),
                        line_start: context.lines.start,
                        line_end: context.lines.end,
                        code_mentioned: context.code_mentioned.clone(),
                        review_text: review_text.clone(),
                        suggested_change: suggested_change.clone(),
                    });
                }
            }
        }

        dedup_records(&mut all);

        let total = all.len();
        let filtered = filter_primary(all);
        debug!(candidates = total, kept = filtered.len(), "global author filter applied");

        filtered
    }

    /// Comment roots inside one thread: configured comment containers that
    /// expose a body element, else the thread itself when it carries a body
    /// directly.
    fn comment_roots<'a>(&self, thread: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let roots: Vec<ElementRef<'a>> = thread
            .select(&self.comment_sel)
            .filter(|c| c.select(&self.body_sel).next().is_some())
            .collect();

        if !roots.is_empty() {
            return roots;
        }

        if thread.select(&self.body_sel).next().is_some() {
            return vec![thread];
        }

        Vec::new()
    }

    /// Stable container identity: an explicit id attribute when present,
    /// else a hash over the position and a flattened-content prefix.
    fn thread_identity(&self, thread: ElementRef<'_>, index: usize) -> String {
        for attr in ["id", "data-thread-id", "data-review-thread-id"] {
            if let Some(v) = thread.value().attr(attr) {
                let v = v.trim();
                if !v.is_empty() {
                    return v.to_string();
                }
            }
        }

        let text = TextUtils::normalize_ws(&page::flatten_text(thread));
        let prefix: String = text.chars().take(THREAD_PREFIX_CHARS).collect();

        format!("t{}", content_hash(&format!("{index}:{prefix}")))
    }
}

/// Summary for one suggestion: the item's own text, or the comment prose
/// when the item is a code block rather than a sentence.
fn summarize_item(text: &str, review_text: Option<&str>) -> String {
    let is_code_block =
        text.starts_with("Suggested change:") || text.starts_with("Suggested diff:");

    let base = match review_text {
        Some(review) if is_code_block && !review.is_empty() => review,
        _ => text,
    };

    let summary = TextUtils::summarize(base, 140);

    if summary.is_empty() {
        // Invariant: non-empty text always has a non-empty summary
        TextUtils::summarize(text, 140)
    } else {
        summary
    }
}

/// Best-effort permalink for one comment, resolved against the page
/// address, falling back to the page address itself.
fn comment_permalink(comment: ElementRef<'_>, page_address: &str) -> String {
    for link in comment.select(&PERMALINK_SEL) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };

        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }

        if let Ok(base) = Url::parse(page_address) {
            if let Ok(joined) = base.join(href) {
                return joined.to_string();
            }
        }
    }

    page_address.to_string()
}

/// Drop repeated records carrying identical text for the same file, keeping
/// the first occurrence. Ids stay unique afterwards by construction.
fn dedup_records(records: &mut Vec<Suggestion>) {
    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();

    records.retain(|s| {
        let key = format!(
            "{}::{}",
            s.file_path.as_deref().unwrap_or(""),
            s.text.trim().to_lowercase()
        );
        seen.insert(key)
    });
}

/// Global two-pass filtering policy, collection-level by design.
///
/// When at least one suggestion is classified as reviewer-authored, only
/// those are kept; when classification failed across the board, the full
/// list passes through unchanged rather than showing nothing.
pub fn filter_primary(list: Vec<Suggestion>) -> Vec<Suggestion> {
    if list.iter().any(|s| s.is_primary_author) {
        list.into_iter().filter(|s| s.is_primary_author).collect()
    } else {
        list
    }
}

/// Selection-state view over an extracted list.
///
/// Ignored ids are hidden entirely; deselected ids stay visible and
/// counted, but drop out of the selected subset.
pub fn query(suggestions: &[Suggestion], state: &PageState) -> QueryResult {
    let visible: Vec<Suggestion> = suggestions
        .iter()
        .filter(|s| !state.ignored.contains(&s.id))
        .cloned()
        .collect();

    let selected_ids: Vec<String> = visible
        .iter()
        .filter(|s| !state.deselected.contains(&s.id))
        .map(|s| s.id.clone())
        .collect();

    QueryResult {
        found: visible.len(),
        selected: selected_ids.len(),
        suggestions: visible,
        selected_ids,
    }
}

/// One opened page with its extraction results and persisted selection.
pub struct PageSession {
    pub page: ReviewPage,
    pub suggestions: Vec<Suggestion>,
    pub state: PageState,
    pub store: SelectionStore,
}

impl PageSession {
    /// Load a page file, run extraction, and attach persisted selection
    /// state for the page's identity.
    pub fn open(page_path: &Path, url: Option<&str>, cfg: &Config) -> Result<Self> {
        let extractor = Extractor::from_config(cfg)?;
        let page = ReviewPage::load(page_path, url)?;
        let suggestions = extractor.extract_all(&page);

        let store = SelectionStore::new(cfg.state_path());
        let state = store.load(page.address());

        debug!(
            page = page.address(),
            found = suggestions.len(),
            deselected = state.deselected.len(),
            ignored = state.ignored.len(),
            "page session ready"
        );

        Ok(Self { page, suggestions, state, store })
    }

    pub fn query(&self) -> QueryResult {
        query(&self.suggestions, &self.state)
    }
}

/// Run the `extract` command: list what the page yields.
pub fn run(args: ExtractArgs, ctx: &AppContext) -> Result<()> {
    let cfg = crate::infra::config::load_config()?;
    let session = PageSession::open(&args.page, args.url.as_deref(), &cfg)?;
    let result = session.query();

    match args.format {
        ExtractFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        ExtractFormat::Text => {
            if result.found == 0 {
                if !ctx.quiet {
                    println!(
                        "No suggestions found on this page. The reviewer may not have \
                         commented yet, or the page markup was not recognized."
                    );
                }
                return Ok(());
            }

            for (i, s) in result.suggestions.iter().enumerate() {
                let mark = if result.selected_ids.contains(&s.id) { "[x]" } else { "[ ]" };
                let line = format!("{mark} {}. {} — {}", i + 1, s.location_label(), s.summary);

                if ctx.no_color {
                    println!("{line}");
                } else if s.is_primary_author {
                    println!("{}", line.green());
                } else {
                    println!("{line}");
                }

                if !ctx.quiet {
                    println!("      id: {}", s.id);
                }
            }

            if !ctx.quiet {
                println!("\n{} found, {} selected", result.found, result.selected);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, primary: bool) -> Suggestion {
        Suggestion {
            id: id.to_string(),
            text: format!("text for {id}"),
            summary: format!("text for {id}"),
            source_url: "https://example.test/pr/1".into(),
            is_primary_author: primary,
            file_path: None,
            line_start: None,
            line_end: None,
            code_mentioned: None,
            review_text: None,
            suggested_change: None,
        }
    }

    #[test]
    fn filter_keeps_only_primary_when_any_exists() {
        let list = vec![record("a", false), record("b", true), record("c", false)];
        let kept = filter_primary(list);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "b");
    }

    #[test]
    fn filter_passes_everything_when_none_primary() {
        let list = vec![record("a", false), record("b", false)];
        let kept = filter_primary(list.clone());

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].id, "a");
        assert_eq!(kept[1].id, "b");
    }

    #[test]
    fn query_hides_ignored_and_unselects_deselected() {
        let list = vec![record("a", true), record("b", true), record("c", true)];
        let mut state = PageState::default();
        state.ignored.insert("c".into());
        state.deselected.insert("b".into());

        let q = query(&list, &state);

        assert_eq!(q.found, 2);
        assert_eq!(q.selected, 1);
        assert_eq!(q.selected_ids, vec!["a".to_string()]);
        assert_eq!(q.suggestions.len(), 2);
    }

    #[test]
    fn dedup_drops_repeated_text_same_file() {
        let mut list = vec![record("a", true), record("b", true)];
        list[1].text = list[0].text.clone();
        list.push(record("c", true));

        dedup_records(&mut list);

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "a");
        assert_eq!(list[1].id, "c");
    }

    #[test]
    fn summary_uses_review_prose_for_code_items() {
        let s = summarize_item("Suggested diff:\n- a\n+ b", Some("Swap the constant."));
        assert_eq!(s, "Swap the constant.");

        let plain = summarize_item("Rename the field", Some("ignored"));
        assert_eq!(plain, "Rename the field");
    }
}
