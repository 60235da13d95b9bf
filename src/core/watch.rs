//! Debounced page watching and re-extraction.
//!
//! Change notifications for the page file are coalesced within a settle
//! window; each settled burst triggers exactly one full re-extraction.
//! Extraction is idempotent and synchronous, so runs never overlap and a
//! newer burst simply supersedes by running after the previous pass
//! finished.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::cli::{AppContext, WatchArgs};
use crate::core::extract::PageSession;

/// Watch `path`, invoking `on_settle` once initially and once per settled
/// burst of change events.
pub fn watch_page<F>(path: &Path, settle: Duration, mut on_settle: F) -> Result<()>
where
    F: FnMut() -> Result<()>,
{
    let (tx, rx) = mpsc::channel();

    let mut watcher = notify::recommended_watcher(tx).context("create file watcher")?;
    watcher
        .watch(path, RecursiveMode::NonRecursive)
        .with_context(|| format!("watch {}", path.display()))?;

    // Initial pass before any change arrives
    on_settle()?;

    drive(&rx, settle, || {
        // Editors and browsers save by rename-replace, which leaves
        // inotify-style watchers pointing at a dead inode; re-arm on the
        // path after every burst
        let _ = watcher.unwatch(path);
        if let Err(err) = watcher.watch(path, RecursiveMode::NonRecursive) {
            warn!(%err, path = %path.display(), "could not re-arm file watch");
        }

        on_settle()
    });

    Ok(())
}

/// Run one extraction pass per settled burst until the channel closes,
/// returning the number of passes.
///
/// A failing pass is logged and the loop keeps waiting: a page that is
/// briefly unreadable mid-save must not end the watch.
fn drive<T, F>(rx: &mpsc::Receiver<T>, settle: Duration, mut on_settle: F) -> usize
where
    F: FnMut() -> Result<()>,
{
    let mut passes = 0;

    while settle_burst(rx, settle) {
        debug!(passes, "change burst settled");
        passes += 1;

        if let Err(err) = on_settle() {
            warn!(%err, "extraction pass failed; waiting for the next change");
        }
    }

    passes
}

/// Block for the next change event, then drain the burst until the
/// channel stays quiet for one settle window. False once the channel is
/// closed.
fn settle_burst<T>(rx: &mpsc::Receiver<T>, settle: Duration) -> bool {
    match rx.recv() {
        Ok(_) => {
            while rx.recv_timeout(settle).is_ok() {}
            true
        }
        Err(_) => false,
    }
}

/// Run the `watch` command: debounced found/selected summaries.
pub fn run(args: WatchArgs, ctx: &AppContext) -> Result<()> {
    let cfg = crate::infra::config::load_config()?;
    let settle = Duration::from_millis(args.settle_ms.unwrap_or(cfg.settle_ms));

    if !ctx.quiet {
        println!(
            "Watching {} (settle window {}ms, Ctrl-C to stop)",
            args.page.display(),
            settle.as_millis()
        );
    }

    watch_page(&args.page, settle, || {
        // Selection state is reloaded each pass; ids are content-derived,
        // so prior selections re-apply to unchanged suggestions
        let session = PageSession::open(&args.page, args.url.as_deref(), &cfg)?;
        let q = session.query();

        if !ctx.quiet {
            println!("{}: {} found, {} selected", session.page.address(), q.found, q.selected);
        }

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn burst_of_events_coalesces_into_one_pass() {
        let (tx, rx) = mpsc::channel();
        for _ in 0..25 {
            tx.send(()).unwrap();
        }
        drop(tx);

        let mut calls = 0;
        let passes = drive(&rx, Duration::from_millis(50), || {
            calls += 1;
            Ok(())
        });

        assert_eq!(passes, 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn separate_bursts_each_trigger_a_pass() {
        let (tx, rx) = mpsc::channel();
        let sender = thread::spawn(move || {
            tx.send(()).unwrap();
            tx.send(()).unwrap();
            // Well past the settle window, so this is a second burst
            thread::sleep(Duration::from_millis(400));
            tx.send(()).unwrap();
        });

        let mut calls = 0;
        let passes = drive(&rx, Duration::from_millis(30), || {
            calls += 1;
            Ok(())
        });
        sender.join().unwrap();

        assert_eq!(passes, 2);
        assert_eq!(calls, 2);
    }

    #[test]
    fn failed_pass_does_not_stop_the_loop() {
        let (tx, rx) = mpsc::channel();
        tx.send(()).unwrap();
        let sender = thread::spawn(move || {
            thread::sleep(Duration::from_millis(300));
            tx.send(()).unwrap();
        });

        let mut calls = 0;
        let passes = drive(&rx, Duration::from_millis(20), || {
            calls += 1;
            if calls == 1 {
                anyhow::bail!("page vanished mid-save");
            }
            Ok(())
        });
        sender.join().unwrap();

        // The failed first pass is logged, not fatal
        assert_eq!(passes, 2);
        assert_eq!(calls, 2);
    }

    #[test]
    fn closed_channel_ends_the_loop() {
        let (tx, rx) = mpsc::channel::<()>();
        drop(tx);

        let passes = drive(&rx, Duration::from_millis(10), || Ok(()));
        assert_eq!(passes, 0);
    }
}
