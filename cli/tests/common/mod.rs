//! Common test utilities for integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test fixture that provides source and destination directories.
pub struct TestFixture {
    pub src: TempDir,
    pub dst: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with fresh source and destination directories.
    pub fn new() -> Self {
        Self {
            src: TempDir::new().expect("Failed to create temp source dir"),
            dst: TempDir::new().expect("Failed to create temp dest dir"),
        }
    }

    /// Path inside the source directory.
    pub fn src_path(&self, rel: &str) -> PathBuf {
        self.src.path().join(rel)
    }

    /// Path inside the destination directory.
    pub fn dst_path(&self, rel: &str) -> PathBuf {
        self.dst.path().join(rel)
    }

    /// Write a source file, creating parent directories.
    pub fn write_src(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.src_path(rel), content)
    }

    /// Write a destination file, creating parent directories.
    pub fn write_dst(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.dst_path(rel), content)
    }

    /// Populate the source with a small nested tree.
    ///
    /// ```text
    /// a.txt
    /// docs/readme.md
    /// docs/deep/note.txt
    /// empty/
    /// ```
    pub fn create_sample_tree(&self) {
        self.write_src("a.txt", "alpha");
        self.write_src("docs/readme.md", "# readme");
        self.write_src("docs/deep/note.txt", "note");
        fs::create_dir_all(self.src_path("empty")).expect("Failed to create directory");
    }

    /// Create `count` files of `size` bytes at the source root.
    pub fn create_files(&self, count: usize, size: usize) {
        for i in 0..count {
            self.write_src(&format!("file{i}.txt"), &"x".repeat(size));
        }
    }

    /// Count all non-directory entries under `dir`, recursively.
    pub fn count_files_recursive(&self, dir: &Path) -> usize {
        let mut count = 0;
        for entry in fs::read_dir(dir).expect("Failed to read directory") {
            let path = entry.expect("Failed to read entry").path();
            let meta = fs::symlink_metadata(&path).expect("Failed to stat entry");
            if meta.is_dir() {
                count += self.count_files_recursive(&path);
            } else {
                count += 1;
            }
        }
        count
    }

    /// Check if a file exists and has the expected content.
    pub fn assert_file_content(&self, path: &Path, expected: &str) {
        assert!(path.exists(), "File does not exist: {:?}", path);
        let actual = fs::read_to_string(path).expect("Failed to read file");
        assert_eq!(actual, expected, "File content mismatch");
    }
}

/// `ccp` with logging off, so stderr only carries errors.
pub fn ccp() -> Command {
    let mut cmd = cargo_bin_cmd!("ccp");
    cmd.args(["--level", "off", "--no-sync"]);
    cmd
}

fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write file");
    path.to_path_buf()
}
