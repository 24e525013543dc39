//! Error handling integration tests for the ccp CLI.
//!
//! Exit codes: 0 when nothing failed, 1 when an entry failed or the source
//! is unusable, 2 for invalid input.

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, ccp};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_source_not_found() {
    let fx = TestFixture::new();

    ccp()
        .arg(fx.src_path("missing.txt"))
        .arg(fx.dst_path("missing.txt"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Path does not exist"));
}

#[test]
fn test_zero_threads_rejected() {
    let fx = TestFixture::new();
    let src = fx.write_src("test.txt", "content");

    ccp()
        .args(["-t", "0"])
        .arg(&src)
        .arg(fx.dst_path("test.txt"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid thread count"));

    assert!(!fx.dst_path("test.txt").exists());
}

#[test]
fn test_directory_without_recursive() {
    let fx = TestFixture::new();
    fx.create_sample_tree();
    let out = fx.dst_path("out");

    ccp()
        .arg(fx.src.path())
        .arg(&out)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("set RECURSIVE"));

    assert!(!out.exists());
}

#[test]
fn test_missing_arguments() {
    ccp().assert().code(2);
}

#[test]
fn test_blocked_directory_fails_its_subtree_only() {
    let fx = TestFixture::new();
    fx.create_sample_tree();
    let out = fx.dst_path("out");
    // A file where the docs/ directory should go
    fx.write_dst("out/docs", "blocker");

    ccp()
        .arg("-r")
        .arg(fx.src.path())
        .arg(&out)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Parent directory was not created"));

    fx.assert_file_content(&out.join("docs"), "blocker");
    fx.assert_file_content(&out.join("a.txt"), "alpha");
    assert!(out.join("empty").is_dir());
}

#[test]
fn test_overwrite_replaces_file_with_directory() {
    let fx = TestFixture::new();
    fx.create_sample_tree();
    let out = fx.dst_path("out");
    fx.write_dst("out/docs", "blocker");

    ccp()
        .args(["-r", "--overwrite"])
        .arg(fx.src.path())
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("docs").is_dir());
    fx.assert_file_content(&out.join("docs/deep/note.txt"), "note");
}

#[test]
fn test_missing_destination_parent_fails_entry() {
    let fx = TestFixture::new();
    let src = fx.write_src("test.txt", "content");

    ccp()
        .arg(&src)
        .arg(fx.dst_path("no/such/dir/test.txt"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("IO failure"));

    assert!(!fx.dst_path("no").exists());
}

#[cfg(unix)]
#[test]
fn test_special_files_are_skipped() {
    use std::os::unix::net::UnixListener;

    let fx = TestFixture::new();
    fx.write_src("regular.txt", "x");
    let _listener = UnixListener::bind(fx.src_path("sock")).unwrap();
    let out = fx.dst_path("out");

    ccp()
        .arg("-r")
        .arg(fx.src.path())
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped: 1"));

    assert!(out.join("regular.txt").exists());
    assert!(fs::symlink_metadata(out.join("sock")).is_err());
}
