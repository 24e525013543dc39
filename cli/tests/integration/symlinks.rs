//! Symlink handling integration tests for the ccp CLI.

#![cfg(unix)]

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, ccp};
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::symlink;
use std::path::Path;

#[test]
fn test_symlinks_preserved_by_default() {
    let fx = TestFixture::new();
    fx.write_src("target.txt", "target");
    symlink("target.txt", fx.src_path("link")).unwrap();
    symlink("../outside", fx.src_path("escaping")).unwrap();
    let out = fx.dst_path("out");

    ccp()
        .arg("-r")
        .arg(fx.src.path())
        .arg(&out)
        .assert()
        .success();

    assert!(
        fs::symlink_metadata(out.join("link"))
            .unwrap()
            .file_type()
            .is_symlink()
    );
    assert_eq!(
        fs::read_link(out.join("link")).unwrap(),
        Path::new("target.txt")
    );
    assert_eq!(
        fs::read_link(out.join("escaping")).unwrap(),
        Path::new("../outside")
    );
}

#[test]
fn test_single_symlink_source() {
    let fx = TestFixture::new();
    symlink("/etc/hostname", fx.src_path("link")).unwrap();

    ccp()
        .arg(fx.src_path("link"))
        .arg(fx.dst.path())
        .assert()
        .success();

    assert_eq!(
        fs::read_link(fx.dst_path("link")).unwrap(),
        Path::new("/etc/hostname")
    );
}

#[test]
fn test_follow_symlinks_copies_content() {
    let fx = TestFixture::new();
    fx.write_src("data/real.txt", "real content");
    symlink("data", fx.src_path("alias")).unwrap();
    let out = fx.dst_path("out");

    ccp()
        .args(["-r", "-L"])
        .arg(fx.src.path())
        .arg(&out)
        .assert()
        .success();

    let alias = fs::symlink_metadata(out.join("alias")).unwrap();
    assert!(alias.is_dir());
    fx.assert_file_content(&out.join("alias/real.txt"), "real content");
}

#[test]
fn test_follow_symlinks_reports_broken_link() {
    let fx = TestFixture::new();
    fx.write_src("ok.txt", "ok");
    symlink("/nonexistent/target", fx.src_path("broken")).unwrap();
    let out = fx.dst_path("out");

    ccp()
        .args(["-r", "--follow-symlinks"])
        .arg(fx.src.path())
        .arg(&out)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Broken symlink"));

    fx.assert_file_content(&out.join("ok.txt"), "ok");
    assert!(fs::symlink_metadata(out.join("broken")).is_err());
}

#[test]
fn test_follow_symlinks_detects_loop() {
    let fx = TestFixture::new();
    fx.write_src("sub/file.txt", "x");
    symlink(fx.src.path(), fx.src_path("sub/loop")).unwrap();
    let out = fx.dst_path("out");

    ccp()
        .args(["-r", "-L"])
        .arg(fx.src.path())
        .arg(&out)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Symlink loop detected"));

    fx.assert_file_content(&out.join("sub/file.txt"), "x");
}

#[test]
fn test_destination_link_to_directory_receives_tree() {
    let fx = TestFixture::new();
    fx.create_sample_tree();
    fs::create_dir(fx.dst_path("real")).unwrap();
    symlink(fx.dst_path("real"), fx.dst_path("backup")).unwrap();

    ccp()
        .args(["-r", "--overwrite"])
        .arg(fx.src.path())
        .arg(fx.dst_path("backup"))
        .assert()
        .success();

    assert!(
        fs::symlink_metadata(fx.dst_path("backup"))
            .unwrap()
            .file_type()
            .is_symlink()
    );
    fx.assert_file_content(&fx.dst_path("real/docs/deep/note.txt"), "note");
}
