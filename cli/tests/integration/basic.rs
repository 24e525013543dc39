//! Basic functionality integration tests for the ccp CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{TestFixture, ccp};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_basic_file_copy() {
    let fx = TestFixture::new();
    let src = fx.write_src("test.txt", "hello world");

    ccp()
        .arg(&src)
        .arg(fx.dst_path("test.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied 1 entries"));

    fx.assert_file_content(&fx.dst_path("test.txt"), "hello world");
}

#[test]
fn test_file_into_existing_directory() {
    let fx = TestFixture::new();
    let src = fx.write_src("test.txt", "content");

    ccp().arg(&src).arg(fx.dst.path()).assert().success();

    fx.assert_file_content(&fx.dst_path("test.txt"), "content");
}

#[test]
fn test_recursive_directory_copy() {
    let fx = TestFixture::new();
    fx.create_sample_tree();
    let out = fx.dst_path("copied");

    ccp()
        .arg("-r")
        .arg(fx.src.path())
        .arg(&out)
        .assert()
        .success();

    fx.assert_file_content(&out.join("a.txt"), "alpha");
    fx.assert_file_content(&out.join("docs/readme.md"), "# readme");
    fx.assert_file_content(&out.join("docs/deep/note.txt"), "note");
    assert!(out.join("empty").is_dir());
}

#[test]
fn test_many_files_with_thread_counts() {
    for threads in ["1", "3", "16"] {
        let fx = TestFixture::new();
        fx.create_files(50, 128);
        let out = fx.dst_path("out");

        ccp()
            .args(["-r", "-t", threads])
            .arg(fx.src.path())
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("Copied 51 entries"));

        assert_eq!(fx.count_files_recursive(&out), 50);
    }
}

#[test]
fn test_no_metadata_still_copies() {
    let fx = TestFixture::new();
    fx.create_sample_tree();
    let out = fx.dst_path("out");

    ccp()
        .args(["-r", "--no-metadata"])
        .arg(fx.src.path())
        .arg(&out)
        .assert()
        .success();

    fx.assert_file_content(&out.join("docs/deep/note.txt"), "note");
}

#[cfg(unix)]
#[test]
fn test_preserves_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let fx = TestFixture::new();
    let script = fx.write_src("run.sh", "#!/bin/sh\n");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o751)).unwrap();

    ccp()
        .arg(&script)
        .arg(fx.dst_path("run.sh"))
        .assert()
        .success();

    let mode = fs::metadata(fx.dst_path("run.sh"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o751);
}

#[test]
fn test_quiet_mode_prints_nothing() {
    let fx = TestFixture::new();
    let src = fx.write_src("test.txt", "content");

    ccp()
        .arg("--quiet")
        .arg(&src)
        .arg(fx.dst_path("test.txt"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(fx.dst_path("test.txt").exists());
}

#[test]
fn test_debug_logging_goes_to_stderr() {
    let fx = TestFixture::new();
    let src = fx.write_src("test.txt", "content");

    cargo_bin_cmd!("ccp")
        .args(["--level", "debug", "--quiet"])
        .arg(&src)
        .arg(fx.dst_path("test.txt"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("copy finished"));
}

#[test]
fn test_help_flag() {
    cargo_bin_cmd!("ccp")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ccp"))
        .stdout(predicate::str::contains("--skip-existing"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("ccp")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ccp"));
}
