//! CLI and basic command tests

mod common;

use common::{
    create_test_product, create_test_provider, json, setup_test_project, tender, tender_in,
};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    tender()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("quotations"));
}

#[test]
fn test_version_displays() {
    tender()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tender"));
}

#[test]
fn test_unknown_command_fails() {
    tender()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_generate() {
    tender()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tender"));
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();

    tender_in(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".tender").is_dir());
    assert!(tmp.path().join(".tender/config.yaml").is_file());
    assert!(tmp.path().join(".tender/tender.db").is_file());
}

#[test]
fn test_init_twice_warns() {
    let tmp = setup_test_project();

    tender_in(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_init_force_keeps_data() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Paper");

    tender_in(&tmp).args(["init", "--force"]).assert().success();

    tender_in(&tmp)
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paper"));
}

// ============================================================================
// Not In Project Test
// ============================================================================

#[test]
fn test_not_in_project_fails() {
    let tmp = TempDir::new().unwrap();

    tender_in(&tmp)
        .args(["req", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a tender project"));
}

#[test]
fn test_commands_work_from_subdirectory() {
    let tmp = setup_test_project();
    let nested = tmp.path().join("a/b");
    fs::create_dir_all(&nested).unwrap();

    tender_in(&tmp)
        .current_dir(&nested)
        .args(["product", "new", "--name", "Paper"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PROD-1"));
}

// ============================================================================
// Config Command Tests
// ============================================================================

#[test]
fn test_config_show() {
    let tmp = setup_test_project();

    tender_in(&tmp)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_quotations: 3"))
        .stdout(predicate::str::contains("author: tester"));
}

#[test]
fn test_config_project_file_overrides_default() {
    let tmp = setup_test_project();
    fs::write(
        tmp.path().join(".tender/config.yaml"),
        "max_quotations: 7\ncompany: Acme Corp\n",
    )
    .unwrap();

    let config = json(&tmp, &["config", "show"]);
    assert_eq!(config["max_quotations"], 7);
    assert_eq!(config["company"], "Acme Corp");
}

#[test]
fn test_config_env_overrides_project_file() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join(".tender/config.yaml"), "max_quotations: 7\n").unwrap();

    tender_in(&tmp)
        .env("TENDER_MAX_QUOTATIONS", "2")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_quotations: 2"));
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[test]
fn test_product_new_and_show() {
    let tmp = setup_test_project();

    tender_in(&tmp)
        .args(["product", "new", "--name", "Paper A4", "--type", "goods"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created product"))
        .stdout(predicate::str::contains("PROD-1"));

    let product = json(&tmp, &["product", "show", "PROD-1"]);
    assert_eq!(product["name"], "Paper A4");
    assert_eq!(product["product_type"], "goods");
    assert_eq!(product["active"], true);
}

#[test]
fn test_product_empty_name_rejected() {
    let tmp = setup_test_project();

    tender_in(&tmp)
        .args(["product", "new", "--name", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("name cannot be empty"));
}

#[test]
fn test_product_show_missing() {
    let tmp = setup_test_project();

    tender_in(&tmp)
        .args(["product", "show", "PROD-9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Product not found: PROD-9"));
}

#[test]
fn test_product_update_deactivates() {
    let tmp = setup_test_project();
    let id = create_test_product(&tmp, "Paper");

    tender_in(&tmp)
        .args(["product", "update", &id, "--active", "false"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated product"));

    let product = json(&tmp, &["product", "show", &id]);
    assert_eq!(product["active"], false);
}

#[test]
fn test_product_list_search_is_case_insensitive() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Paper A4");
    create_test_product(&tmp, "Toner");

    tender_in(&tmp)
        .args(["product", "list", "--search", "PAPER"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paper A4"))
        .stdout(predicate::str::contains("Toner").not());
}

#[test]
fn test_provider_duplicate_ruc_rejected() {
    let tmp = setup_test_project();

    tender_in(&tmp)
        .args(["provider", "new", "--name", "Acme", "--ruc", "20100070970"])
        .assert()
        .success();

    tender_in(&tmp)
        .args(["provider", "new", "--name", "Copy", "--ruc", "20100070970"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("registered"));
}

#[test]
fn test_provider_list_searches_ruc() {
    let tmp = setup_test_project();
    tender_in(&tmp)
        .args(["provider", "new", "--name", "Acme", "--ruc", "20555"])
        .assert()
        .success();
    create_test_provider(&tmp, "Globex");

    let providers = json(&tmp, &["provider", "list", "--search", "205"]);
    let providers = providers.as_array().unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0]["name"], "Acme");
}

#[test]
fn test_provider_list_count_and_paging() {
    let tmp = setup_test_project();
    for name in ["A", "B", "C"] {
        create_test_provider(&tmp, name);
    }

    tender_in(&tmp)
        .args(["provider", "list", "--count"])
        .assert()
        .success()
        .stdout("3\n");

    // Newest first
    tender_in(&tmp)
        .args(["-f", "id", "provider", "list", "--limit", "2", "--page", "2"])
        .assert()
        .success()
        .stdout("PROV-1\n");
}
