//! Shared test helpers for integration tests

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// A tender command isolated from the user's config and environment
pub fn tender() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("tender"));
    cmd.env_remove("TENDER_LOG")
        .env_remove("TENDER_MAX_QUOTATIONS")
        .env("TENDER_AUTHOR", "tester");
    cmd
}

/// A tender command running inside `tmp`, with user config under `tmp`
pub fn tender_in(tmp: &TempDir) -> Command {
    let mut cmd = tender();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".xdg"))
        .env("HOME", tmp.path());
    cmd
}

/// Helper to create a test project in a temp directory
pub fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tender_in(&tmp).arg("init").assert().success();
    tmp
}

/// Run a creation command with `-f id` and return the printed id
pub fn created_id(tmp: &TempDir, args: &[&str]) -> String {
    let output = tender_in(tmp).args(["-f", "id"]).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn create_test_product(tmp: &TempDir, name: &str) -> String {
    created_id(tmp, &["product", "new", "--name", name])
}

pub fn create_test_provider(tmp: &TempDir, name: &str) -> String {
    created_id(tmp, &["provider", "new", "--name", name])
}

/// Create a requirement; `lines` are `PRODUCT:AMOUNT[...]` specs
pub fn create_test_requirement(tmp: &TempDir, name: &str, lines: &[String]) -> String {
    let mut args = vec!["req", "new", "--name", name];
    for line in lines {
        args.push("--line");
        args.push(line);
    }
    created_id(tmp, &args)
}

/// Create a quotation with prices in line order
pub fn create_test_quotation(tmp: &TempDir, req: &str, provider: &str, prices: &[f64]) -> String {
    let prices: Vec<String> = prices.iter().map(|p| p.to_string()).collect();
    let joined = prices.join(",");
    created_id(
        tmp,
        &[
            "quote",
            "new",
            "--requirement",
            req,
            "--provider",
            provider,
            "--price",
            &joined,
        ],
    )
}

/// Run a command with `-f json` and parse stdout
pub fn json(tmp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = tender_in(tmp).args(["-f", "json"]).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Two-line requirement (10 and 5 units) quoted by A (3, 4) and B (2, 5)
///
/// Returns (requirement, quotation A, quotation B).
pub fn setup_two_provider_scenario(tmp: &TempDir) -> (String, String, String) {
    let paper = create_test_product(tmp, "Paper");
    let toner = create_test_product(tmp, "Toner");
    let req = create_test_requirement(
        tmp,
        "Office supplies",
        &[format!("{}:10:box", paper), format!("{}:5", toner)],
    );
    let a = create_test_provider(tmp, "Provider A");
    let b = create_test_provider(tmp, "Provider B");
    let qa = create_test_quotation(tmp, &req, &a, &[3.0, 4.0]);
    let qb = create_test_quotation(tmp, &req, &b, &[2.0, 5.0]);
    (req, qa, qb)
}
