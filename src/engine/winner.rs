//! Winner selection
//!
//! Exactly one quotation per requirement carries the winner flag after a
//! successful selection. Selection either names a quotation (manual) or
//! takes the current level-1 quotation after a fresh re-rank (automatic).

use serde::Serialize;
use std::fmt;
use tracing::info;

use super::rank::rerank;
use super::{expect_rows, load_quotation, load_requirement, EngineError, EngineResult};
use crate::core::identity::{ProviderId, QuotationId, RequirementId};
use crate::core::lifecycle::{transition, RequirementState};
use crate::core::store::{QuotationStore, RequirementStore};

/// Which quotation to mark as winner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinnerChoice {
    /// The cheapest quotation
    Automatic,
    /// A specific quotation
    Manual(QuotationId),
}

impl WinnerChoice {
    /// Interpret a raw id where zero or negative means automatic
    pub fn from_raw(id: i64) -> Self {
        if id <= 0 {
            WinnerChoice::Automatic
        } else {
            WinnerChoice::Manual(QuotationId(id))
        }
    }
}

impl From<Option<QuotationId>> for WinnerChoice {
    fn from(id: Option<QuotationId>) -> Self {
        match id {
            Some(id) => WinnerChoice::from_raw(id.0),
            None => WinnerChoice::Automatic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Automatic,
    Manual,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Automatic => write!(f, "automatic"),
            SelectionMode::Manual => write!(f, "manual"),
        }
    }
}

/// Result of a winner selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinnerOutcome {
    pub requirement_id: RequirementId,
    pub quotation_id: QuotationId,
    pub provider_id: ProviderId,
    pub summation: f64,
    pub winner_level: u32,
    pub mode: SelectionMode,
    /// Winner replaced by this selection, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_winner: Option<QuotationId>,
    pub state: RequirementState,
}

/// Mark the winning quotation of a requirement
pub fn select_winner<S>(
    store: &S,
    requirement: RequirementId,
    choice: WinnerChoice,
) -> EngineResult<WinnerOutcome>
where
    S: RequirementStore + QuotationStore,
{
    let req = load_requirement(store, requirement)?;
    let next = transition(req.state, RequirementState::WinnerSet).map_err(|source| {
        EngineError::InvalidTransition {
            id: requirement,
            source,
        }
    })?;

    let ranking = rerank(store, requirement)?;

    let (chosen, mode) = match choice {
        WinnerChoice::Automatic => {
            let first = ranking
                .iter()
                .find(|r| r.winner_level == 1)
                .ok_or_else(|| EngineError::not_found("Quotation for requirement", requirement))?;
            (*first, SelectionMode::Automatic)
        }
        WinnerChoice::Manual(id) => {
            let quotation = load_quotation(store, id)?;
            if quotation.requirement_id != requirement {
                return Err(EngineError::IntegrityViolation(format!(
                    "{} belongs to {}, not {}",
                    id, quotation.requirement_id, requirement
                )));
            }
            let ranked = ranking
                .iter()
                .find(|r| r.quotation_id == id)
                .ok_or_else(|| EngineError::not_found("Quotation", id))?;
            (*ranked, SelectionMode::Manual)
        }
    };

    let previous_winner = store
        .winner_of(requirement)?
        .map(|q| q.id)
        .filter(|&id| id != chosen.quotation_id);

    store.clear_winners(requirement)?;
    expect_rows(
        store.set_winner(chosen.quotation_id, true)?,
        "quotation",
        chosen.quotation_id,
    )?;
    expect_rows(store.set_state(requirement, next)?, "requirement", requirement)?;

    info!(
        requirement = %requirement,
        quotation = %chosen.quotation_id,
        summation = chosen.summation,
        mode = %mode,
        "winner selected"
    );

    Ok(WinnerOutcome {
        requirement_id: requirement,
        quotation_id: chosen.quotation_id,
        provider_id: chosen.provider_id,
        summation: chosen.summation,
        winner_level: chosen.winner_level,
        mode,
        previous_winner,
        state: next,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{CatalogStore, Database};
    use crate::engine::quotations::create_quotation;
    use crate::engine::requirements::create_requirement;
    use crate::entities::product::NewProduct;
    use crate::entities::provider::NewProvider;
    use crate::entities::quotation::{NewQuotation, NewQuotationDetail, Quotation};
    use crate::entities::requirement::{NewRequirement, NewRequirementLine, Requirement};

    fn create_req(db: &mut Database, amounts: &[f64]) -> Requirement {
        db.write(|store| -> EngineResult<_> {
            let product = store.create_product(&NewProduct::new("Paper"))?;
            create_requirement(
                store,
                &NewRequirement {
                    name: "Paper".to_string(),
                    author: "test".to_string(),
                    lines: amounts
                        .iter()
                        .map(|&a| NewRequirementLine::new(product, a))
                        .collect(),
                    ..NewRequirement::default()
                },
            )
        })
        .unwrap()
    }

    fn quote(db: &mut Database, req: &Requirement, name: &str, prices: &[f64]) -> Quotation {
        let details = req
            .lines
            .iter()
            .zip(prices)
            .map(|(l, &unit_price)| NewQuotationDetail {
                line_id: l.id,
                unit_price,
            })
            .collect();
        db.write(|store| -> EngineResult<_> {
            let provider = store.create_provider(&NewProvider::new(name))?;
            create_quotation(
                store,
                &NewQuotation::new(req.id, provider, "test", details),
                10,
            )
        })
        .unwrap()
    }

    fn winners(db: &Database, req: RequirementId) -> Vec<QuotationId> {
        db.read()
            .list_by_requirement(req)
            .unwrap()
            .into_iter()
            .filter(|q| q.winner)
            .map(|q| q.id)
            .collect()
    }

    #[test]
    fn test_automatic_selection_picks_cheapest() {
        let mut db = Database::open_in_memory().unwrap();
        let req = create_req(&mut db, &[10.0, 5.0]);
        // A = 10*3 + 5*4 = 50, B = 10*2 + 5*5 = 45
        let a = quote(&mut db, &req, "A", &[3.0, 4.0]);
        let b = quote(&mut db, &req, "B", &[2.0, 5.0]);

        let outcome = db
            .write(|store| select_winner(store, req.id, WinnerChoice::Automatic))
            .unwrap();

        assert_eq!(outcome.quotation_id, b.id);
        assert_eq!(outcome.summation, 45.0);
        assert_eq!(outcome.winner_level, 1);
        assert_eq!(outcome.mode, SelectionMode::Automatic);
        assert_eq!(outcome.state, RequirementState::WinnerSet);
        assert_eq!(winners(&db, req.id), vec![b.id]);
        let a_level = db.read().get_quotation(a.id).unwrap().unwrap().winner_level;
        assert_eq!(a_level, 2);
    }

    #[test]
    fn test_manual_reselection_leaves_single_winner() {
        let mut db = Database::open_in_memory().unwrap();
        let req = create_req(&mut db, &[1.0]);
        let a = quote(&mut db, &req, "A", &[10.0]);
        let b = quote(&mut db, &req, "B", &[20.0]);

        db.write(|store| select_winner(store, req.id, WinnerChoice::Manual(a.id)))
            .unwrap();
        let outcome = db
            .write(|store| select_winner(store, req.id, WinnerChoice::Manual(b.id)))
            .unwrap();

        assert_eq!(outcome.mode, SelectionMode::Manual);
        assert_eq!(outcome.previous_winner, Some(a.id));
        assert_eq!(outcome.winner_level, 2);
        assert_eq!(winners(&db, req.id), vec![b.id]);
    }

    #[test]
    fn test_manual_selection_of_foreign_quotation() {
        let mut db = Database::open_in_memory().unwrap();
        let req = create_req(&mut db, &[1.0]);
        let other = create_req(&mut db, &[1.0]);
        quote(&mut db, &req, "A", &[10.0]);
        let foreign = quote(&mut db, &other, "B", &[5.0]);

        let result =
            db.write(|store| select_winner(store, req.id, WinnerChoice::Manual(foreign.id)));
        assert!(matches!(result, Err(EngineError::IntegrityViolation(_))));
        assert!(winners(&db, req.id).is_empty());
    }

    #[test]
    fn test_manual_selection_of_missing_quotation() {
        let mut db = Database::open_in_memory().unwrap();
        let req = create_req(&mut db, &[1.0]);
        quote(&mut db, &req, "A", &[10.0]);

        let result =
            db.write(|store| select_winner(store, req.id, WinnerChoice::Manual(QuotationId(999))));
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[test]
    fn test_selection_on_draft_is_invalid() {
        let mut db = Database::open_in_memory().unwrap();
        let req = create_req(&mut db, &[1.0]);

        let result = db.write(|store| select_winner(store, req.id, WinnerChoice::Automatic));
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn test_selection_without_quotations_from_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        let req = create_req(&mut db, &[1.0]);
        db.write(|store| store.set_state(req.id, RequirementState::Rejected))
            .unwrap();

        let result = db.write(|store| select_winner(store, req.id, WinnerChoice::Automatic));
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
        // Rolled back: state unchanged
        let state = db.read().get_requirement(req.id).unwrap().unwrap().state;
        assert_eq!(state, RequirementState::Rejected);
    }

    #[test]
    fn test_selection_on_closed_is_invalid() {
        let mut db = Database::open_in_memory().unwrap();
        let req = create_req(&mut db, &[1.0]);
        quote(&mut db, &req, "A", &[10.0]);
        db.write(|store| select_winner(store, req.id, WinnerChoice::Automatic))
            .unwrap();
        db.write(|store| store.set_state(req.id, RequirementState::Closed))
            .unwrap();

        let result = db.write(|store| select_winner(store, req.id, WinnerChoice::Automatic));
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn test_choice_from_raw() {
        assert_eq!(WinnerChoice::from_raw(0), WinnerChoice::Automatic);
        assert_eq!(WinnerChoice::from_raw(-1), WinnerChoice::Automatic);
        assert_eq!(
            WinnerChoice::from_raw(7),
            WinnerChoice::Manual(QuotationId(7))
        );
        assert_eq!(WinnerChoice::from(None), WinnerChoice::Automatic);
    }
}
