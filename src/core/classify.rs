//! Reviewer-authorship classification for a single comment.
//!
//! An ordered list of independent evidence predicates combined with
//! short-circuit OR. Intentionally permissive: false negatives hide real
//! suggestions, so each predicate errs toward matching. The body-scan
//! fallback can misfire on a human comment that merely mentions the
//! reviewer by name; that broad match is an accepted precision/recall
//! trade-off, not a defect.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::core::page;
use crate::infra::utils::TextUtils;

static AUTHOR_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[class*="author"], [class*="author"] a, a[data-hovercard-type="user"]"#)
        .expect("valid selector")
});

static AUTHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[class*="author"]"#).expect("valid selector"));

static BADGE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[class*="Label"], [class*="label"], [class*="badge"]"#)
        .expect("valid selector")
});

/// Phrase that marks machine-generated review prose.
static AI_REVIEW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bai review\b").expect("valid regex"));

/// Decides whether a comment was authored by the automated reviewer.
pub struct Classifier {
    reviewer: String,
}

impl Classifier {
    pub fn new(reviewer: impl Into<String>) -> Self {
        Self { reviewer: reviewer.into() }
    }

    /// OR over the evidence predicates, strongest signal first.
    ///
    /// Author and badge evidence lives anywhere under the comment root;
    /// the text scan is restricted to the body so that header chrome
    /// ("in reply to ...") cannot trip it.
    pub fn is_primary_author(&self, comment: ElementRef<'_>, body: ElementRef<'_>) -> bool {
        self.author_link_names_reviewer(comment)
            || self.author_href_mentions_reviewer(comment)
            || self.bot_badge_with_reviewer(comment)
            || self.body_mentions_reviewer(body)
    }

    /// (1) An author-link element whose text contains the reviewer's name.
    fn author_link_names_reviewer(&self, comment: ElementRef<'_>) -> bool {
        let needle = self.reviewer.to_lowercase();

        comment
            .select(&AUTHOR_LINK_SEL)
            .any(|link| page::flatten_text(link).to_lowercase().contains(&needle))
    }

    /// (2) An author link pointing at a reviewer-identifying target.
    fn author_href_mentions_reviewer(&self, comment: ElementRef<'_>) -> bool {
        let needle = self.reviewer.to_lowercase();

        comment.select(&AUTHOR_LINK_SEL).any(|link| {
            link.value()
                .attr("href")
                .map(|href| href.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
    }

    /// (3) A "bot" badge present and the author region naming the reviewer.
    fn bot_badge_with_reviewer(&self, comment: ElementRef<'_>) -> bool {
        let has_bot_badge = comment
            .select(&BADGE_SEL)
            .any(|badge| TextUtils::contains_word(&page::flatten_text(badge), "bot"));

        if !has_bot_badge {
            return false;
        }

        let needle = self.reviewer.to_lowercase();

        comment
            .select(&AUTHOR_SEL)
            .any(|el| page::flatten_text(el).to_lowercase().contains(&needle))
    }

    /// (4) Body text naming the reviewer as a whole word, or an "AI review"
    /// phrase. Broadest signal, checked last.
    fn body_mentions_reviewer(&self, body: ElementRef<'_>) -> bool {
        let text = page::flatten_text(body);

        TextUtils::contains_word(&text, &self.reviewer) || AI_REVIEW_RE.is_match(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn comment(html: &Html) -> ElementRef<'_> {
        let sel = Selector::parse(".comment").unwrap();
        html.select(&sel).next().expect("comment present")
    }

    fn body(html: &Html) -> ElementRef<'_> {
        let sel = Selector::parse(".comment-body").unwrap();
        html.select(&sel).next().expect("body present")
    }

    fn classifier() -> Classifier {
        Classifier::new("coderabbitai")
    }

    /// Classify a comment that has no distinct body region.
    fn classify_flat(html: &Html) -> bool {
        let c = comment(html);
        classifier().is_primary_author(c, c)
    }

    #[test]
    fn author_link_text_matches_case_insensitive() {
        let html = Html::parse_fragment(
            r#"<div class="comment">
                <a class="author" href="/users/1">CodeRabbitAI</a>
                <p>Looks fine.</p>
            </div>"#,
        );

        assert!(classify_flat(&html));
    }

    #[test]
    fn author_href_matches() {
        let html = Html::parse_fragment(
            r#"<div class="comment">
                <span class="author"><a href="/apps/coderabbitai">reviewer</a></span>
                <p>Note.</p>
            </div>"#,
        );

        assert!(classify_flat(&html));
    }

    #[test]
    fn bot_badge_needs_reviewer_name_too() {
        let with_name = Html::parse_fragment(
            r#"<div class="comment">
                <span class="author-name">coderabbitai</span>
                <span class="badge">bot</span>
                <p>Hello.</p>
            </div>"#,
        );
        assert!(classify_flat(&with_name));

        let other_bot = Html::parse_fragment(
            r#"<div class="comment">
                <span class="author-name">dependabot</span>
                <span class="badge">bot</span>
                <p>Bump lockfile.</p>
            </div>"#,
        );
        assert!(!classify_flat(&other_bot));
    }

    #[test]
    fn body_scan_matches_whole_word_or_ai_phrase() {
        let mention = Html::parse_fragment(
            r#"<div class="comment"><p>Automated AI review of this change.</p></div>"#,
        );
        assert!(classify_flat(&mention));

        let word = Html::parse_fragment(
            r#"<div class="comment"><p>coderabbitai suggested a rename here.</p></div>"#,
        );
        assert!(classify_flat(&word));

        let partial = Html::parse_fragment(
            r#"<div class="comment"><p>the coderabbitai2 fork differs</p></div>"#,
        );
        assert!(!classify_flat(&partial));
    }

    #[test]
    fn header_mention_outside_the_body_does_not_classify() {
        // "In reply to" chrome names the reviewer, but the human reply
        // itself does not
        let html = Html::parse_fragment(
            r#"<div class="comment">
                <div class="comment-header"><span>In reply to coderabbitai</span></div>
                <div class="comment-body"><p>I disagree with that rename.</p></div>
            </div>"#,
        );

        assert!(!classifier().is_primary_author(comment(&html), body(&html)));
    }

    #[test]
    fn body_mention_still_classifies_with_separate_body() {
        let html = Html::parse_fragment(
            r#"<div class="comment">
                <div class="comment-header"><span>2 days ago</span></div>
                <div class="comment-body"><p>coderabbitai flagged this loop.</p></div>
            </div>"#,
        );

        assert!(classifier().is_primary_author(comment(&html), body(&html)));
    }

    #[test]
    fn plain_human_comment_is_not_primary() {
        let html = Html::parse_fragment(
            r#"<div class="comment">
                <a class="author" href="/users/alice">alice</a>
                <p>I prefer the old name.</p>
            </div>"#,
        );

        assert!(!classify_flat(&html));
    }
}
