//! Output builders: prompt, Markdown, and JSON renderings of selected
//! suggestions.
//!
//! Builders are pure over their input list: no dedup, no reordering, and
//! stable ordinal numbering, since ordering was already finalized by the
//! extraction pass.

use std::collections::HashSet;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::warn;

use crate::cli::{AppContext, BuildArgs};
use crate::core::extract::PageSession;
use crate::core::model::Suggestion;

/// Fixed instructional preamble for the prompt encoding.
const PROMPT_PREAMBLE: &str = "Apply the following code-review suggestions to this repository.\n\
Work through them one at a time, keep each change minimal, and preserve\n\
existing behavior unless a suggestion says otherwise.\n";

/// Which encoding a `prompt`/`markdown`/`json` invocation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    Prompt,
    Markdown,
    Json,
}

/// Natural-language prompt: preamble plus one block per suggestion.
pub fn build_prompt(suggestions: &[Suggestion], page_address: &str) -> String {
    let mut out = String::from(PROMPT_PREAMBLE);
    out.push_str(&format!("Review page: {page_address}\n"));

    for (i, s) in suggestions.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!("{}. {}\n", i + 1, s.location_label()));

        if let Some(code) = &s.code_mentioned {
            out.push_str("Code context:\n");
            out.push_str(code.trim_end());
            out.push('\n');
        }

        if let Some(review) = &s.review_text {
            out.push_str("Reviewer note:\n");
            out.push_str(review.trim_end());
            out.push('\n');
        }

        out.push_str(&change_block(s));
    }

    out
}

/// The suggested-change block for one record: the located change when
/// present, else the raw text, prefixed unless it already carries one.
fn change_block(s: &Suggestion) -> String {
    if let Some(change) = &s.suggested_change {
        return format!("Suggested change:\n{}\n", change.trim_end());
    }

    let text = s.text.trim_end();

    if text.starts_with("Suggested change:") || text.starts_with("Suggested diff:") {
        format!("{text}\n")
    } else {
        format!("Suggested change:\n{text}\n")
    }
}

/// Markdown document: page heading plus one section per suggestion.
pub fn build_markdown(suggestions: &[Suggestion], page_address: &str) -> String {
    let mut out = format!("## Review suggestions — {page_address}\n");

    for (i, s) in suggestions.iter().enumerate() {
        out.push_str(&format!("\n### {}. {}\n\n", i + 1, s.summary));
        out.push_str(&format!("- File: {}\n", s.location_label()));
        out.push_str(&format!("- Source: {}\n", s.source_url));

        if let Some(code) = &s.code_mentioned {
            out.push_str("\nCode context:\n\n```\n");
            out.push_str(code.trim_end());
            out.push_str("\n```\n");
        }

        if let Some(review) = &s.review_text {
            out.push('\n');
            out.push_str(review.trim_end());
            out.push('\n');
        }

        let change = s.suggested_change.as_deref().unwrap_or(&s.text);
        out.push_str("\nSuggested change:\n\n```\n");
        out.push_str(change.trim_end());
        out.push_str("\n```\n");
    }

    out
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    page: &'a str,
    suggestions: &'a [Suggestion],
}

/// JSON document with stable field names; absent optional fields serialize
/// as explicit `null`, never as missing keys.
pub fn build_json(suggestions: &[Suggestion], page_address: &str) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonDocument { page: page_address, suggestions })
}

/// Run one of the output-building commands.
pub fn run_build(kind: BuildKind, args: BuildArgs, ctx: &AppContext) -> Result<()> {
    let cfg = crate::infra::config::load_config()?;
    let session = PageSession::open(&args.page, args.url.as_deref(), &cfg)?;
    let query = session.query();

    let chosen = choose(&query.suggestions, &query.selected_ids, &args);

    if chosen.is_empty() {
        if !ctx.quiet {
            println!(
                "Nothing selected to export. Run `rsift extract` to list suggestions \
                 and their ids, or pass --all."
            );
        }
        return Ok(());
    }

    let address = session.page.address();
    let content = match kind {
        BuildKind::Prompt => build_prompt(&chosen, address),
        BuildKind::Markdown => build_markdown(&chosen, address),
        BuildKind::Json => build_json(&chosen, address).context("encode JSON output")?,
    };

    if let Some(path) = &args.output {
        if !ctx.dry_run {
            std::fs::write(path, &content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        if !ctx.quiet {
            println!(
                "{} Wrote {} suggestions ({} bytes) to {}",
                "✓".green(),
                chosen.len(),
                content.len(),
                path.display()
            );
        }
    } else if !args.clipboard {
        print!("{content}");
    }

    if args.clipboard && !ctx.dry_run {
        copy_to_clipboard(&content)?;

        if !ctx.quiet {
            println!("{} Copied {} suggestions to clipboard", "✓".green(), chosen.len());
        }
    }

    Ok(())
}

/// Resolve which records to export: an explicit id subset when given,
/// everything visible with `--all`, else the current selection. Input
/// order is preserved in every case.
fn choose(visible: &[Suggestion], selected_ids: &[String], args: &BuildArgs) -> Vec<Suggestion> {
    if !args.ids.is_empty() {
        let requested: HashSet<&str> = args.ids.iter().map(String::as_str).collect();
        let known: HashSet<&str> = visible.iter().map(|s| s.id.as_str()).collect();

        for id in &args.ids {
            if !known.contains(id.as_str()) {
                warn!(%id, "requested id not present on this page");
            }
        }

        return visible
            .iter()
            .filter(|s| requested.contains(s.id.as_str()))
            .cloned()
            .collect();
    }

    if args.all {
        return visible.to_vec();
    }

    let selected: HashSet<&str> = selected_ids.iter().map(String::as_str).collect();

    visible
        .iter()
        .filter(|s| selected.contains(s.id.as_str()))
        .cloned()
        .collect()
}

/// Copy rendered output to the system clipboard.
///
/// Failure surfaces as a short error to the user; there is no retry.
pub fn copy_to_clipboard(content: &str) -> Result<()> {
    use arboard::Clipboard;

    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;

    clipboard
        .set_text(content)
        .context("Failed to copy to clipboard")?;

    Ok(())
}
