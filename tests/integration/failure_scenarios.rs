//! Failure tests for the orchestrator
//!
//! These tests verify that failures stay contained to one file:
//! - Provider errors while listing VMs
//! - VMs without network interfaces
//! - Missing network resources
//! - Output that cannot be written
//! - Inputs that cannot be removed or quarantined

use std::sync::Arc;

use assert_matches::assert_matches;
use vm_profiler::config::ProfileConfig;
use vm_profiler::orchestrator::{FileOutcome, Orchestrator};

use crate::helpers::*;

#[tokio::test]
async fn test_listing_failure_skips_only_that_file() {
    let dirs = TestDirs::new();
    let broken = dirs.write_input("a.json", &create_alert_json("vm1", "sub-down"));
    dirs.write_input("b.json", &create_alert_json("vm2", "sub-up"));

    let cloud = Arc::new(
        FakeCloud::new()
            .with_failing_listing("sub-down")
            .with_vm("sub-up", "vm2", "10.0.0.9", None),
    );

    let summary = dirs.orchestrator(cloud).run().await.unwrap();

    assert_eq!(summary.written, 1);
    assert_eq!(summary.skipped, 1);
    assert!(broken.exists(), "failed lookup must leave the alert in place");
    assert!(dirs.output_for("b.json").exists());
    assert!(!dirs.output_for("a.json").exists());
}

#[tokio::test]
async fn test_vm_without_nic_is_skipped() {
    let dirs = TestDirs::new();
    let input = dirs.write_input("alert.json", &create_alert_json("bare", "sub-123"));

    let cloud = Arc::new(FakeCloud::new().with_bare_vm("sub-123", "bare"));
    let outcome = dirs.orchestrator(cloud.clone()).process_file(&input).await;

    assert_matches!(outcome, FileOutcome::SkippedLookupFailure(msg) if msg.contains("no network interfaces"));
    assert!(input.exists());
    assert_eq!(dir_entries(&dirs.directories.output), 0);
    assert_eq!(cloud.calls(), vec!["list sub-123".to_string()]);
}

#[tokio::test]
async fn test_missing_nic_is_skipped() {
    let dirs = TestDirs::new();
    let input = dirs.write_input("alert.json", &create_alert_json("vm1", "sub-123"));

    let cloud = Arc::new(FakeCloud::new().with_dangling_nic("sub-123", "vm1"));
    let outcome = dirs.orchestrator(cloud.clone()).process_file(&input).await;

    assert_matches!(outcome, FileOutcome::SkippedLookupFailure(msg) if msg.contains("404"));
    assert!(input.exists());
    assert_eq!(
        cloud.calls(),
        vec![
            "list sub-123".to_string(),
            "nic rg-vm1/vm1-deleted-nic".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_unwritable_output_keeps_input() {
    let dirs = TestDirs::new();
    let input = dirs.write_input("alert.json", &create_alert_json("vm1", "sub-123"));

    // A directory squatting on the output path makes the write fail.
    std::fs::create_dir_all(dirs.output_for("alert.json")).unwrap();

    let cloud = Arc::new(FakeCloud::new().with_vm("sub-123", "vm1", "10.0.0.4", None));
    let outcome = dirs.orchestrator(cloud).process_file(&input).await;

    assert_matches!(outcome, FileOutcome::WriteFailed(msg) if msg.contains("failed to write"));
    assert!(input.exists());
}

#[tokio::test]
async fn test_undeletable_input_rolls_back_profile() {
    let dirs = TestDirs::new();
    let input = dirs.write_input("alert.json", &create_alert_json("vm1", "sub-123"));

    // Swap the alert for a directory mid-lookup so removing it fails.
    let swapped = input.clone();
    let cloud = Arc::new(
        FakeCloud::new()
            .with_vm("sub-123", "vm1", "10.0.0.4", None)
            .with_subscription("sub-123", "Production")
            .with_hook("subscription", move || {
                if swapped.is_file() {
                    std::fs::remove_file(&swapped).unwrap();
                    std::fs::create_dir(&swapped).unwrap();
                }
            }),
    );

    let summary = dirs.orchestrator(cloud).run().await.unwrap();

    assert_eq!(summary.written, 0);
    assert_eq!(summary.skipped, 1);
    assert!(input.exists(), "input must stay in place");
    assert!(
        !dirs.output_for("alert.json").exists(),
        "profile must not outlive a failed delete"
    );
    assert_eq!(dir_entries(&dirs.directories.output), 0);
}

#[tokio::test]
async fn test_missing_input_directory_fails_the_run() {
    let dirs = TestDirs::new();
    let mut directories = dirs.directories.clone();
    directories.input = directories.input.join("does-not-exist");

    let orchestrator = Orchestrator::new(
        Arc::new(FakeCloud::new()),
        directories,
        ProfileConfig::default(),
    );

    let result = orchestrator.run().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_quarantine_without_error_directory_keeps_input() {
    let dirs = TestDirs::new();
    let input = dirs.write_input("bad.json", "{}");

    // process_file does not prepare directories, so the move has nowhere to go.
    let outcome = dirs
        .orchestrator(Arc::new(FakeCloud::new()))
        .process_file(&input)
        .await;

    assert_matches!(outcome, FileOutcome::QuarantineFailed(_));
    assert!(input.exists());
}
