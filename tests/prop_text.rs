//! Property checks for the text helpers, id hashing, and the global
//! author filter.

use proptest::prelude::*;

use revsift::core::extract::filter_primary;
use revsift::core::hash::content_hash;
use revsift::core::model::Suggestion;
use revsift::infra::utils::TextUtils;

fn record(primary: bool, n: usize) -> Suggestion {
    Suggestion {
        id: format!("t:{n}"),
        text: format!("suggestion {n}"),
        summary: format!("suggestion {n}"),
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

proptest! {
    #[test]
    fn summarize_respects_the_limit(s in ".{0,400}", limit in 1usize..200) {
        let out = TextUtils::summarize(&s, limit);

        // At most limit characters plus the ellipsis marker
        prop_assert!(out.chars().count() <= limit + 1);

        if !TextUtils::normalize_ws(&s).is_empty() {
            prop_assert!(!out.is_empty());
        }
    }

    #[test]
    fn normalize_ws_is_idempotent(s in "\\PC{0,200}") {
        let once = TextUtils::normalize_ws(&s);

        prop_assert_eq!(TextUtils::normalize_ws(&once), once.clone());
        prop_assert!(!once.starts_with(' '));
        prop_assert!(!once.ends_with(' '));
    }

    #[test]
    fn content_hash_is_deterministic_base36(s in "\\PC{0,200}") {
        let a = content_hash(&s);

        prop_assert_eq!(&a, &content_hash(&s));
        prop_assert!(!a.is_empty());
        prop_assert!(a.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn filter_keeps_primary_subset_or_everything(
        flags in proptest::collection::vec(any::<bool>(), 0..16)
    ) {
        let list: Vec<Suggestion> =
            flags.iter().enumerate().map(|(i, p)| record(*p, i)).collect();

        let kept = filter_primary(list);

        if flags.iter().any(|p| *p) {
            prop_assert!(kept.iter().all(|s| s.is_primary_author));
            prop_assert_eq!(kept.len(), flags.iter().filter(|p| **p).count());
        } else {
            prop_assert_eq!(kept.len(), flags.len());
        }
    }
}
