//! CLI output integration tests.

mod support;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

use support::files::{rule_file, temp_file};

fn assetflow() -> Command {
    cargo_bin_cmd!("assetflow")
}

#[test]
fn test_help() {
    assetflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("assetflow"))
        .stdout(predicate::str::contains("estimate"))
        .stdout(predicate::str::contains("split"))
        .stdout(predicate::str::contains("stake-preview"))
        .stdout(predicate::str::contains("check-config"));
}

#[test]
fn test_estimate_prints_json() {
    assetflow()
        .args([
            "estimate",
            "--asset-type",
            "nft",
            "--region",
            "mumbai",
            "--reputation",
            "50",
            "--demand",
            "0.5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"final_price\""))
        .stdout(predicate::str::contains("2.4"))
        .stdout(predicate::str::contains("utility_bonus"));
}

#[test]
fn test_estimate_rejects_unknown_asset_type() {
    assetflow()
        .args([
            "estimate",
            "--asset-type",
            "painting",
            "--region",
            "mumbai",
            "--reputation",
            "50",
            "--demand",
            "0.5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown asset type"));
}

#[test]
fn test_split_with_royalties() {
    assetflow()
        .args([
            "split",
            "--creator",
            "alice:1:0",
            "--creator",
            "bob:1:0",
            "--revenue",
            "100",
            "--royalty-rate",
            "0.1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"alice\""))
        .stdout(predicate::str::contains("\"bob\""))
        .stdout(predicate::str::contains("0.5"))
        .stdout(predicate::str::contains("distribution"));
}

#[test]
fn test_split_requires_royalty_rate_with_revenue() {
    assetflow()
        .args(["split", "--creator", "alice:1:0", "--revenue", "100"])
        .assert()
        .failure();
}

#[test]
fn test_split_rejects_out_of_range_reputation() {
    assetflow()
        .args(["split", "--creator", "alice:1:150"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_stake_preview() {
    assetflow()
        .args([
            "stake-preview",
            "--asset-type",
            "nft",
            "--principal",
            "1000",
            "--lock-days",
            "365",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("projected_reward"))
        .stdout(predicate::str::contains("apr.lock.year"));
}

#[test]
fn test_stake_preview_rejects_bad_principal() {
    assetflow()
        .args([
            "stake-preview",
            "--asset-type",
            "nft",
            "--principal",
            "0",
            "--lock-days",
            "30",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("principal"));
}

#[test]
fn test_check_config_defaults() {
    assetflow()
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("built-in defaults"))
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_check_config_with_rule_file() {
    let rules = temp_file(&rule_file(3, "1.1"));
    let config = temp_file(&format!(
        "[rules]\npath = \"{}\"\n",
        rules.path().display()
    ));

    assetflow()
        .args(["check-config", "--config"])
        .arg(config.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Rule set version"))
        .stdout(predicate::str::contains("3"));
}

#[test]
fn test_check_config_rejects_invalid_values() {
    let config = temp_file("[staking]\nmax_apr = 0\n");

    assetflow()
        .args(["check-config", "--config"])
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("staking.max_apr"));
}

#[test]
fn test_split_rejects_weights_beyond_decimal_range() {
    assetflow()
        .args([
            "split",
            "--creator",
            "alice:50000000000000000000000000000:100",
            "--creator",
            "bob:50000000000000000000000000000:100",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("skill_weight"));
}
