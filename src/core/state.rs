//! Persistent selection state, scoped by page identity.
//!
//! Two id sets per page: `deselected` (unchecked, still listed) and
//! `ignored` (hidden entirely). State lives in one JSON file per page
//! identity under the state directory. Persistence failures degrade to
//! empty in-memory sets; a lost save means "selection not remembered",
//! never a crash.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::cli::{AppContext, ResetArgs, SelectArgs};
use crate::core::hash::content_hash;

/// Saved selection for one page identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageState {
    /// Page address the state was saved for (informational)
    #[serde(default)]
    pub page: String,

    /// Timestamp of the last save
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,

    /// Ids explicitly unchecked by the user; listed but excluded from output
    #[serde(default)]
    pub deselected: BTreeSet<String>,

    /// Ids permanently hidden from the list
    #[serde(default)]
    pub ignored: BTreeSet<String>,
}

/// File-backed store keyed by page identity.
pub struct SelectionStore {
    dir: PathBuf,
}

impl SelectionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Derive the page-identity key from a page address.
    ///
    /// Real URLs are normalized to scheme+host+path, so query strings and
    /// fragments do not split identity; non-URL addresses (file paths) are
    /// used verbatim. The key itself is a content hash of the normalized
    /// form.
    pub fn page_key(address: &str) -> String {
        let normalized = match Url::parse(address) {
            Ok(u) => format!("{}://{}{}", u.scheme(), u.host_str().unwrap_or(""), u.path()),
            Err(_) => address.trim().to_string(),
        };

        content_hash(&normalized)
    }

    /// Load state for one page address, tolerating every failure mode.
    pub fn load(&self, address: &str) -> PageState {
        let path = self.path_for(&Self::page_key(address));

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => {
                debug!(path = %path.display(), "no saved selection state");
                return PageState { page: address.to_string(), ..PageState::default() };
            }
        };

        match serde_json::from_str::<PageState>(&raw) {
            Ok(state) => state,
            Err(err) => {
                warn!(path = %path.display(), %err, "discarding unreadable selection state");
                PageState { page: address.to_string(), ..PageState::default() }
            }
        }
    }

    /// Persist state for one page address. Failures are logged and
    /// swallowed by design.
    pub fn save(&self, address: &str, state: &PageState) {
        let stamped = PageState {
            page: address.to_string(),
            saved_at: Some(Utc::now()),
            deselected: state.deselected.clone(),
            ignored: state.ignored.clone(),
        };

        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), %err, "cannot create state directory");
            return;
        }

        let path = self.path_for(&Self::page_key(address));

        let body = match serde_json::to_string_pretty(&stamped) {
            Ok(body) => body,
            Err(err) => {
                warn!(%err, "cannot encode selection state");
                return;
            }
        };

        if let Err(err) = fs::write(&path, body) {
            warn!(path = %path.display(), %err, "cannot write selection state");
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

/// Which selection set a CLI mutation touches, and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOp {
    Deselect,
    Reselect,
    Ignore,
    Unignore,
}

/// Run one of the selection-mutation commands.
pub fn run_select(op: SelectOp, args: SelectArgs, ctx: &AppContext) -> Result<()> {
    let cfg = crate::infra::config::load_config()?;
    let session =
        crate::core::extract::PageSession::open(&args.page, args.url.as_deref(), &cfg)?;

    let known: BTreeSet<&str> = session.suggestions.iter().map(|s| s.id.as_str()).collect();
    let mut state = session.state.clone();

    for id in &args.ids {
        let extracts_today = known.contains(id.as_str());

        match op {
            // Adding an id only makes sense for a current suggestion
            SelectOp::Deselect => {
                if !extracts_today {
                    warn!(%id, "id not present in this extraction pass");
                    continue;
                }
                state.deselected.insert(id.clone());
            }
            SelectOp::Ignore => {
                if !extracts_today {
                    warn!(%id, "id not present in this extraction pass");
                    continue;
                }
                state.ignored.insert(id.clone());
            }

            // Removal always applies, so ids left behind by a changed
            // page can be cleaned out without a full reset
            SelectOp::Reselect => {
                if !state.deselected.remove(id) && !extracts_today {
                    warn!(%id, "id was neither deselected nor present on the page");
                }
            }
            SelectOp::Unignore => {
                if !state.ignored.remove(id) && !extracts_today {
                    warn!(%id, "id was neither ignored nor present on the page");
                }
            }
        }
    }

    if ctx.dry_run {
        if !ctx.quiet {
            println!(
                "DRY RUN: would save {} deselected / {} ignored ids for {}",
                state.deselected.len(),
                state.ignored.len(),
                session.page.address()
            );
        }
        return Ok(());
    }

    session.store.save(session.page.address(), &state);

    if !ctx.quiet {
        let q = crate::core::extract::query(&session.suggestions, &state);
        println!("{} found, {} selected", q.found, q.selected);
    }

    Ok(())
}

/// Run the `reset` command: clear both sets for the page identity.
pub fn run_reset(args: ResetArgs, ctx: &AppContext) -> Result<()> {
    let cfg = crate::infra::config::load_config()?;
    let session =
        crate::core::extract::PageSession::open(&args.page, args.url.as_deref(), &cfg)?;

    if ctx.dry_run {
        if !ctx.quiet {
            println!("DRY RUN: would clear selection state for {}", session.page.address());
        }
        return Ok(());
    }

    session.store.save(session.page.address(), &PageState::default());

    if !ctx.quiet {
        println!("Cleared selection state for {}", session.page.address());
    }

    Ok(())
}
