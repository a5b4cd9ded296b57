//! Integration tests for the pmp-review CLI
//!
//! These tests run the compiled binary end-to-end. Interactive review paths
//! need a terminal and are covered by unit tests with mock input instead.

use std::fs;
use std::process::Command;

const CAPTURED_APPLY: &str = r#"
Terraform used the selected providers to generate the following execution
plan. Resource actions are indicated with the following symbols:
  + create
  - destroy

Terraform will perform the following actions:

  # aws_instance.example will be created
  + resource "aws_instance" "example" {
      + ami           = "ami-12345678"
      + instance_type = "t3.micro"
    }

  # aws_instance.legacy will be destroyed
  - resource "aws_instance" "legacy" {
      - ami = "ami-old"
    }

Plan: 1 to add, 0 to change, 1 to destroy.

Do you want to perform these actions?
  Terraform will perform the actions described above.
  Only 'yes' will be accepted to approve.

  Enter a value: "#;

/// Run pmp-review and return output
fn run_pmp_review(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_pmp-review"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute pmp-review")
}

fn captured_file(dir: &tempfile::TempDir) -> String {
    let path = dir.path().join("apply.log");
    fs::write(&path, CAPTURED_APPLY).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_version() {
    let output = run_pmp_review(&["--version"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pmp-review"));
}

#[test]
fn test_help() {
    let output = run_pmp_review(&["--help"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("apply"));
    assert!(stdout.contains("show"));
    assert!(stdout.contains("review"));
}

#[test]
fn test_apply_help_lists_policy_flags() {
    let output = run_pmp_review(&["apply", "--help"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--require-review-all"));
    assert!(stdout.contains("--no-auto-collapse"));
    assert!(stdout.contains("--command"));
}

#[test]
fn test_show_lists_resources() {
    let dir = tempfile::tempdir().unwrap();
    let file = captured_file(&dir);

    let output = run_pmp_review(&["show", &file]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("aws_instance.example"));
    assert!(stdout.contains("aws_instance.legacy"));
    assert!(stdout.contains("To destroy"));
}

#[test]
fn test_show_json() {
    let dir = tempfile::tempdir().unwrap();
    let file = captured_file(&dir);

    let output = run_pmp_review(&["show", &file, "--json"]);
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["summary"]["to_add"], 1);
    assert_eq!(plan["summary"]["to_destroy"], 1);

    let blocks = plan["blocks"].as_array().unwrap();
    let resources: Vec<&str> = blocks
        .iter()
        .filter(|b| b["kind"]["type"] == "resource_change")
        .map(|b| b["kind"]["resource"]["address"].as_str().unwrap())
        .collect();
    assert_eq!(resources, vec!["aws_instance.example", "aws_instance.legacy"]);

    // Blocks cover every line, in order
    let mut next = 1;
    for block in blocks {
        assert_eq!(block["start_index"], next);
        next = block["end_index"].as_u64().unwrap() + 1;
    }
    assert_eq!(next as usize, CAPTURED_APPLY.lines().count() + 1);
}

#[test]
fn test_show_missing_file() {
    let output = run_pmp_review(&["show", "/definitely/not/here.log"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read file"));
}

#[test]
fn test_apply_unknown_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_string_lossy().into_owned();

    let output = run_pmp_review(&[
        "apply",
        "--path",
        &path,
        "--command",
        "pmp-review-no-such-binary apply",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to execute"));
}

#[test]
fn test_apply_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".pmp.review.yaml"), "review: [unterminated").unwrap();
    let path = dir.path().to_string_lossy().into_owned();

    let output = run_pmp_review(&["apply", "--path", &path]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load project configuration"));
}
