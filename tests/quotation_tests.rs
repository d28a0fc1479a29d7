//! Quotation intake, ranking and winner selection tests

mod common;

use common::{
    create_test_product, create_test_provider, create_test_quotation, create_test_requirement,
    json, setup_test_project, setup_two_provider_scenario, tender_in,
};
use predicates::prelude::*;

// ============================================================================
// Ranking
// ============================================================================

#[test]
fn test_quotations_ranked_by_summation() {
    let tmp = setup_test_project();
    let (req, qa, qb) = setup_two_provider_scenario(&tmp);

    let list = json(&tmp, &["quote", "list", "--requirement", &req]);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);

    assert_eq!(list[0]["id"], qb.trim_start_matches("QUOT-").parse::<i64>().unwrap());
    assert_eq!(list[0]["summation"], 45.0);
    assert_eq!(list[0]["winner_level"], 1);
    assert_eq!(list[0]["provider_name"], "Provider B");

    assert_eq!(list[1]["id"], qa.trim_start_matches("QUOT-").parse::<i64>().unwrap());
    assert_eq!(list[1]["summation"], 50.0);
    assert_eq!(list[1]["winner_level"], 2);
    assert_eq!(list[1]["lines"], 2);
}

#[test]
fn test_first_quotation_moves_requirement_to_quoted() {
    let tmp = setup_test_project();
    let (req, _, _) = setup_two_provider_scenario(&tmp);

    let shown = json(&tmp, &["req", "show", &req]);
    assert_eq!(shown["state"], "quoted");
}

#[test]
fn test_price_update_reranks() {
    let tmp = setup_test_project();
    let (req, qa, _) = setup_two_provider_scenario(&tmp);

    // A's second line: 5 * 4 -> 5 * 2, total 40
    let quotation = json(&tmp, &["quote", "show", &qa]);
    let detail = quotation["details"][1]["id"].as_i64().unwrap().to_string();

    tender_in(&tmp)
        .args(["quote", "price", "--detail", &detail, "--price", "2"])
        .assert()
        .success();

    let list = json(&tmp, &["quote", "list", "--requirement", &req]);
    assert_eq!(list[0]["provider_name"], "Provider A");
    assert_eq!(list[0]["summation"], 40.0);
    assert_eq!(list[1]["winner_level"], 2);
}

#[test]
fn test_negative_price_rejected() {
    let tmp = setup_test_project();
    let paper = create_test_product(&tmp, "Paper");
    let req = create_test_requirement(&tmp, "Paper", &[format!("{}:1", paper)]);
    let provider = create_test_provider(&tmp, "Acme");

    tender_in(&tmp)
        .args(["quote", "new", "-r", &req, "-p", &provider, "--price=-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-negative"));

    let shown = json(&tmp, &["req", "show", &req]);
    assert_eq!(shown["state"], "draft");
}

#[test]
fn test_price_count_must_match_lines() {
    let tmp = setup_test_project();
    let (req, _, _) = setup_two_provider_scenario(&tmp);
    let provider = create_test_provider(&tmp, "Provider C");

    tender_in(&tmp)
        .args(["quote", "new", "-r", &req, "-p", &provider, "--price", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("price(s)"));
}

#[test]
fn test_quotation_limit_exceeded() {
    let tmp = setup_test_project();
    let paper = create_test_product(&tmp, "Paper");
    let req = create_test_requirement(&tmp, "Paper", &[format!("{}:1", paper)]);
    for name in ["A", "B", "C"] {
        let provider = create_test_provider(&tmp, name);
        create_test_quotation(&tmp, &req, &provider, &[1.0]);
    }
    let late = create_test_provider(&tmp, "Late");

    tender_in(&tmp)
        .env("TENDER_MAX_QUOTATIONS", "3")
        .args(["quote", "new", "-r", &req, "-p", &late, "--price", "0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("maximum"));

    let list = json(&tmp, &["quote", "list", "--requirement", &req]);
    assert_eq!(list.as_array().unwrap().len(), 3);
}

#[test]
fn test_delete_quotation_reranks_remaining() {
    let tmp = setup_test_project();
    let (req, qa, qb) = setup_two_provider_scenario(&tmp);

    tender_in(&tmp)
        .args(["quote", "delete", &qb])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted quotation"));

    let list = json(&tmp, &["quote", "list", "--requirement", &req]);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], qa.trim_start_matches("QUOT-").parse::<i64>().unwrap());
    assert_eq!(list[0]["winner_level"], 1);
}

// ============================================================================
// Winner selection
// ============================================================================

#[test]
fn test_automatic_winner_is_cheapest() {
    let tmp = setup_test_project();
    let (req, _, qb) = setup_two_provider_scenario(&tmp);

    tender_in(&tmp)
        .args(["winner", "--requirement", &req])
        .assert()
        .success()
        .stdout(predicate::str::contains(qb.as_str()))
        .stdout(predicate::str::contains("automatic"));

    let shown = json(&tmp, &["req", "show", &req]);
    assert_eq!(shown["state"], "winner_set");

    let list = json(&tmp, &["quote", "list", "--requirement", &req]);
    assert_eq!(list[0]["winner"], true);
    assert_eq!(list[1]["winner"], false);
}

#[test]
fn test_manual_reselection_keeps_single_winner() {
    let tmp = setup_test_project();
    let (req, qa, qb) = setup_two_provider_scenario(&tmp);

    tender_in(&tmp)
        .args(["winner", "-r", &req, "-q", &qa])
        .assert()
        .success();

    let outcome = json(&tmp, &["winner", "-r", &req, "-q", &qb]);
    assert_eq!(outcome["mode"], "manual");
    assert_eq!(outcome["summation"], 45.0);
    assert_eq!(
        outcome["previous_winner"],
        qa.trim_start_matches("QUOT-").parse::<i64>().unwrap()
    );

    let list = json(&tmp, &["quote", "list", "--requirement", &req]);
    let winners: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .filter(|q| q["winner"] == true)
        .collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0]["provider_name"], "Provider B");
}

#[test]
fn test_manual_winner_from_other_requirement() {
    let tmp = setup_test_project();
    let (req, _, _) = setup_two_provider_scenario(&tmp);
    let paper = create_test_product(&tmp, "Stapler");
    let other = create_test_requirement(&tmp, "Other", &[format!("{}:1", paper)]);
    let provider = create_test_provider(&tmp, "Other provider");
    let foreign = create_test_quotation(&tmp, &other, &provider, &[1.0]);

    tender_in(&tmp)
        .args(["winner", "-r", &req, "-q", &foreign])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Integrity violation"));
}

#[test]
fn test_winner_on_draft_fails() {
    let tmp = setup_test_project();
    let paper = create_test_product(&tmp, "Paper");
    let req = create_test_requirement(&tmp, "Paper", &[format!("{}:1", paper)]);

    tender_in(&tmp)
        .args(["winner", "-r", &req])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid state transition"));
}

#[test]
fn test_quote_show_pretty() {
    let tmp = setup_test_project();
    let (_, qa, _) = setup_two_provider_scenario(&tmp);

    tender_in(&tmp)
        .args(["quote", "show", &qa])
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider A"))
        .stdout(predicate::str::contains("50.00"));
}
