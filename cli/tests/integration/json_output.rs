//! JSON output integration tests for the ccp CLI.

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, ccp};
use serde_json::Value;

fn run_json(cmd: &mut assert_cmd::Command) -> (Option<i32>, Value) {
    let output = cmd.arg("--output").arg("json").output().unwrap();
    let value = serde_json::from_slice(&output.stdout).unwrap();
    (output.status.code(), value)
}

#[test]
fn test_json_summary_and_records() {
    let fx = TestFixture::new();
    fx.create_sample_tree();
    let out = fx.dst_path("out");

    let (code, value) = run_json(ccp().args(["-r", "-t", "2"]).arg(fx.src.path()).arg(&out));

    assert_eq!(code, Some(0));
    assert_eq!(value["schema_version"], "1.0");
    assert_eq!(value["threads"], 2);
    assert_eq!(value["policy"]["recursive"], true);
    assert_eq!(value["summary"]["succeeded"], 7);
    assert_eq!(value["summary"]["failed"], 0);

    let records = value["records"].as_array().unwrap();
    assert_eq!(records.len(), 7);
    // Planning order: the root directory comes first
    assert_eq!(records[0]["destination"], out.to_string_lossy().as_ref());
    assert_eq!(records[0]["kind"], "Directory");
    assert!(records.iter().all(|r| r["outcome"] == "copied"));
}

#[test]
fn test_json_reports_conflict() {
    let fx = TestFixture::new();
    let src = fx.write_src("test.txt", "new");
    fx.write_dst("test.txt", "old");

    let (code, value) = run_json(ccp().arg(&src).arg(fx.dst_path("test.txt")));

    assert_eq!(code, Some(1));
    assert_eq!(value["summary"]["failed"], 1);
    let record = &value["records"][0];
    assert_eq!(record["outcome"], "failed");
    assert_eq!(record["error_code"], "destination_exists");
    assert!(
        record["error_message"]
            .as_str()
            .unwrap()
            .contains("Destination already exists")
    );
}

#[test]
fn test_json_reports_skip_reason() {
    let fx = TestFixture::new();
    let src = fx.write_src("test.txt", "new");
    fx.write_dst("test.txt", "old");

    let (code, value) = run_json(
        ccp()
            .arg("--skip-existing")
            .arg(&src)
            .arg(fx.dst_path("test.txt")),
    );

    assert_eq!(code, Some(0));
    assert_eq!(value["policy"]["skip_existing"], true);
    assert_eq!(value["records"][0]["outcome"], "skipped");
    assert_eq!(value["records"][0]["reason"], "already_exists");
}

#[test]
fn test_json_bytes_copied() {
    let fx = TestFixture::new();
    let src = fx.write_src("data.bin", &"z".repeat(4096));

    let (code, value) = run_json(ccp().arg(&src).arg(fx.dst_path("data.bin")));

    assert_eq!(code, Some(0));
    assert_eq!(value["summary"]["bytes_copied"], 4096);
    assert_eq!(value["records"][0]["bytes_copied"], 4096);
    assert_eq!(value["records"][0]["kind"], "File");
}
