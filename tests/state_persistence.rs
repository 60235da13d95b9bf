//! Selection persistence across store instances and page identities.

use assert_fs::prelude::*;
use revsift::core::state::{PageState, SelectionStore};

#[test]
fn selection_survives_reload() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let store = SelectionStore::new(tmp.path());

    let mut state = PageState::default();
    state.deselected.insert("t1:0:0:abc".into());
    state.ignored.insert("t1:0:1:def".into());
    store.save("https://example.test/pr/42?tab=files", &state);

    // A fresh store instance and a differently-decorated URL resolve to
    // the same page identity
    let reloaded = SelectionStore::new(tmp.path()).load("https://example.test/pr/42#r1");

    assert!(reloaded.deselected.contains("t1:0:0:abc"));
    assert!(reloaded.ignored.contains("t1:0:1:def"));
    assert!(reloaded.saved_at.is_some());
    assert_eq!(reloaded.page, "https://example.test/pr/42?tab=files");
}

#[test]
fn identities_do_not_bleed_across_pages() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let store = SelectionStore::new(tmp.path());

    let mut state = PageState::default();
    state.deselected.insert("x".into());
    store.save("https://example.test/pr/42", &state);

    let other = store.load("https://example.test/pr/43");
    assert!(other.deselected.is_empty());
    assert!(other.ignored.is_empty());
}

#[test]
fn corrupt_state_file_is_discarded() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let store = SelectionStore::new(tmp.path());

    let mut state = PageState::default();
    state.ignored.insert("gone".into());
    store.save("https://example.test/pr/1", &state);

    // Clobber the one state file with garbage
    let entry = std::fs::read_dir(tmp.path())
        .expect("read state dir")
        .filter_map(Result::ok)
        .find(|e| e.path().extension().is_some_and(|x| x == "json"))
        .expect("state file exists");
    std::fs::write(entry.path(), "not json {{").expect("corrupt file");

    let loaded = store.load("https://example.test/pr/1");
    assert!(loaded.ignored.is_empty());
    assert!(loaded.deselected.is_empty());
}

#[test]
fn unwritable_state_dir_does_not_panic() {
    let store = SelectionStore::new("/proc/revsift-definitely-missing/state");

    // Save is best-effort; failure is logged, never raised
    store.save("https://example.test/pr/1", &PageState::default());

    let loaded = store.load("https://example.test/pr/1");
    assert!(loaded.deselected.is_empty());
}
