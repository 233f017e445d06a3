//! CLI integration tests for the Synapse command-line interface.
//!
//! These tests verify help output and argument handling only; none of
//! them reach a Cortex.

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a command for the synapse binary with no connection settings inherited.
fn synapse() -> Command {
    let mut cmd = Command::cargo_bin("synapse").unwrap();
    for var in [
        "SYNAPSE_HOST",
        "SYNAPSE_PORT",
        "SYNAPSE_API_KEY",
        "SYNAPSE_VIEW_ID",
        "SYNAPSE_USER",
        "SYNAPSE_PASSWORD",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    synapse()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Synapse Cortex"));
}

#[test]
fn test_version_displays() {
    synapse()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("synapse"));
}

#[test]
fn test_help_lists_subcommands() {
    synapse()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("storm"))
        .stdout(predicate::str::contains("query"))
        .stdout(predicate::str::contains("health"))
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("vars"))
        .stdout(predicate::str::contains("axon"));
}

#[test]
fn test_help_mentions_env_vars() {
    synapse()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SYNAPSE_HOST"))
        .stdout(predicate::str::contains("SYNAPSE_VIEW_ID"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument Validation Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_subcommand_rejected() {
    synapse().arg("frobnicate").assert().failure();
}

#[test]
fn test_query_requires_text() {
    synapse()
        .arg("query")
        .assert()
        .failure()
        .stderr(predicate::str::contains("QUERY"));
}

#[test]
fn test_axon_del_requires_hash() {
    synapse().args(["axon", "del"]).assert().failure();
}

#[test]
fn test_health_requires_view() {
    synapse()
        .arg("health")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SYNAPSE_VIEW_ID"));
}

#[test]
fn test_health_requires_credentials() {
    synapse()
        .args(["--view", "abc", "health"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SYNAPSE_API_KEY"));
}

#[test]
fn test_storm_help_shows_output_default() {
    synapse()
        .args(["storm", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("storm_results.json"));
}
