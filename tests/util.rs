//! Shared helpers for integration tests.
//!
//! Provides the fixture page location and a throwaway working directory
//! so runs never touch real selection state.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_fs::prelude::*;

/// Path to the saved review-page fixture inside the repo.
pub fn fixture_path() -> PathBuf
{
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/review_page.html")
}

/// Fresh working directory holding a copy of the fixture page. Commands
/// run with this directory as cwd keep their `.rsift/state` files inside
/// the temp tree.
pub fn page_workspace() -> (assert_fs::TempDir, PathBuf)
{
    // Initialize the temporary working root
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    // Copy the fixture in so relative paths stay short
    let page = tmp.child("review_page.html");
    page.write_file(&fixture_path()).expect("copy fixture");

    let path = page.path().to_path_buf();
    (tmp, path)
}
