//! Requirement and line maintenance
//!
//! Lines are only editable while the requirement is a draft with no
//! quotations, since quotations price every line.

use tracing::info;

use super::catalog::load_product;
use super::{expect_rows, load_requirement, EngineError, EngineResult};
use crate::core::identity::{LineId, RequirementId};
use crate::core::lifecycle::{transition, RequirementState};
use crate::core::store::{CatalogStore, Page, PageRequest, QuotationStore, RequirementStore};
use crate::entities::requirement::{
    LinePatch, NewRequirement, NewRequirementLine, Requirement, RequirementLine,
    RequirementPatch,
};

fn validate_amount(amount: f64) -> EngineResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(EngineError::Validation(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

fn validate_suggested(price: Option<f64>) -> EngineResult<()> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(EngineError::Validation(format!(
            "suggested price must be non-negative, got {}",
            p
        ))),
        _ => Ok(()),
    }
}

fn validate_line<S: CatalogStore>(store: &S, line: &NewRequirementLine) -> EngineResult<()> {
    validate_amount(line.amount)?;
    validate_suggested(line.suggested_price)?;
    load_product(store, line.product_id)?;
    Ok(())
}

/// Fail unless lines of `requirement` may still change
fn ensure_lines_editable<S>(store: &S, requirement: &Requirement) -> EngineResult<()>
where
    S: QuotationStore,
{
    let quotations = store.count_by_requirement(requirement.id)?;
    if requirement.state != RequirementState::Draft || quotations > 0 {
        return Err(EngineError::IntegrityViolation(format!(
            "lines of {} cannot change: requirement is {} with {} quotation(s)",
            requirement.id, requirement.state, quotations
        )));
    }
    Ok(())
}

fn load_line<S: RequirementStore>(store: &S, id: LineId) -> EngineResult<RequirementLine> {
    store
        .get_line(id)?
        .ok_or_else(|| EngineError::not_found("Requirement line", id))
}

pub fn create_requirement<S>(store: &S, new: &NewRequirement) -> EngineResult<Requirement>
where
    S: RequirementStore + CatalogStore,
{
    if new.name.trim().is_empty() {
        return Err(EngineError::Validation(
            "requirement name cannot be empty".to_string(),
        ));
    }
    if new.lines.is_empty() {
        return Err(EngineError::Validation(
            "a requirement needs at least one line".to_string(),
        ));
    }
    if let (Some(from), Some(to)) = (new.emission_date, new.expiration_date) {
        if to < from {
            return Err(EngineError::Validation(format!(
                "expiration date {} is before emission date {}",
                to, from
            )));
        }
    }
    for line in &new.lines {
        validate_line(store, line)?;
    }

    let id = store.create_requirement(new)?;
    info!(requirement = %id, lines = new.lines.len(), "created requirement");
    load_requirement(store, id)
}

pub fn list_requirements<S: RequirementStore>(
    store: &S,
    states: &[RequirementState],
    page: &PageRequest,
) -> EngineResult<Page<Requirement>> {
    Ok(store.list_requirements(states, page)?)
}

pub fn update_requirement<S: RequirementStore>(
    store: &S,
    id: RequirementId,
    patch: &RequirementPatch,
) -> EngineResult<Requirement> {
    let requirement = load_requirement(store, id)?;
    if !requirement.state.is_open() {
        return Err(EngineError::IntegrityViolation(format!(
            "{} is {} and can no longer be edited",
            id, requirement.state
        )));
    }
    if matches!(&patch.name, Some(n) if n.trim().is_empty()) {
        return Err(EngineError::Validation(
            "requirement name cannot be empty".to_string(),
        ));
    }

    expect_rows(store.update_requirement(id, patch)?, "requirement", id)?;
    load_requirement(store, id)
}

fn move_to<S: RequirementStore>(
    store: &S,
    id: RequirementId,
    to: RequirementState,
) -> EngineResult<Requirement> {
    let requirement = load_requirement(store, id)?;
    let next = transition(requirement.state, to)
        .map_err(|source| EngineError::InvalidTransition { id, source })?;

    expect_rows(store.set_state(id, next)?, "requirement", id)?;
    info!(requirement = %id, from = %requirement.state, to = %next, "requirement state changed");
    load_requirement(store, id)
}

/// Administrator refusal of a quoted requirement
pub fn reject_requirement<S: RequirementStore>(
    store: &S,
    id: RequirementId,
) -> EngineResult<Requirement> {
    move_to(store, id, RequirementState::Rejected)
}

/// Close a requirement whose winner has been chosen
pub fn close_requirement<S: RequirementStore>(
    store: &S,
    id: RequirementId,
) -> EngineResult<Requirement> {
    move_to(store, id, RequirementState::Closed)
}

pub fn add_line<S>(
    store: &S,
    requirement: RequirementId,
    line: &NewRequirementLine,
) -> EngineResult<RequirementLine>
where
    S: RequirementStore + QuotationStore + CatalogStore,
{
    let req = load_requirement(store, requirement)?;
    ensure_lines_editable(store, &req)?;
    validate_line(store, line)?;

    let id = store.add_line(requirement, line)?;
    info!(requirement = %requirement, line = %id, "added line");
    load_line(store, id)
}

pub fn update_line<S>(store: &S, id: LineId, patch: &LinePatch) -> EngineResult<RequirementLine>
where
    S: RequirementStore + QuotationStore,
{
    let line = load_line(store, id)?;
    let req = load_requirement(store, line.requirement_id)?;
    ensure_lines_editable(store, &req)?;
    if let Some(amount) = patch.amount {
        validate_amount(amount)?;
    }
    validate_suggested(patch.suggested_price)?;

    expect_rows(store.update_line(id, patch)?, "requirement line", id)?;
    load_line(store, id)
}

pub fn delete_line<S>(store: &S, id: LineId) -> EngineResult<()>
where
    S: RequirementStore + QuotationStore,
{
    let line = load_line(store, id)?;

    let references = store.detail_references(id)?;
    if references > 0 {
        return Err(EngineError::IntegrityViolation(format!(
            "{} is priced by {} quotation detail(s)",
            id, references
        )));
    }

    let req = load_requirement(store, line.requirement_id)?;
    ensure_lines_editable(store, &req)?;
    if req.lines.len() <= 1 {
        return Err(EngineError::IntegrityViolation(format!(
            "{} is the last line of {}",
            id, req.id
        )));
    }

    expect_rows(store.delete_line(id)?, "requirement line", id)?;
    info!(requirement = %req.id, line = %id, "deleted line");
    Ok(())
}

pub fn delete_requirement<S>(store: &S, id: RequirementId) -> EngineResult<()>
where
    S: RequirementStore + QuotationStore,
{
    load_requirement(store, id)?;
    let quotations = store.count_by_requirement(id)?;
    if quotations > 0 {
        return Err(EngineError::IntegrityViolation(format!(
            "{} has {} quotation(s)",
            id, quotations
        )));
    }

    expect_rows(store.delete_requirement(id)?, "requirement", id)?;
    info!(requirement = %id, "deleted requirement");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::ProductId;
    use crate::core::store::Database;
    use crate::entities::product::NewProduct;

    fn setup() -> (Database, ProductId) {
        let mut db = Database::open_in_memory().unwrap();
        let product = db
            .write(|store| store.create_product(&NewProduct::new("Paper")))
            .unwrap();
        (db, product)
    }

    fn new_requirement(product: ProductId, amounts: &[f64]) -> NewRequirement {
        NewRequirement {
            name: "Office supplies".to_string(),
            author: "test".to_string(),
            lines: amounts
                .iter()
                .map(|&a| NewRequirementLine::new(product, a))
                .collect(),
            ..NewRequirement::default()
        }
    }

    #[test]
    fn test_create_requirement_starts_draft() {
        let (mut db, product) = setup();
        let req = db
            .write(|store| create_requirement(store, &new_requirement(product, &[2.0, 5.0])))
            .unwrap();

        assert_eq!(req.state, RequirementState::Draft);
        assert_eq!(req.lines.len(), 2);
        assert_eq!(req.lines[1].amount, 5.0);
    }

    #[test]
    fn test_create_requirement_without_lines() {
        let (mut db, product) = setup();
        let result = db.write(|store| create_requirement(store, &new_requirement(product, &[])));
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_create_requirement_rejects_bad_amount() {
        let (mut db, product) = setup();
        let result =
            db.write(|store| create_requirement(store, &new_requirement(product, &[2.0, 0.0])));
        assert!(matches!(result, Err(EngineError::Validation(_))));
        // Nothing written
        assert_eq!(
            db.read()
                .list_requirements(&[], &PageRequest::default())
                .unwrap()
                .total,
            0
        );
    }

    #[test]
    fn test_create_requirement_unknown_product() {
        let (mut db, _) = setup();
        let result =
            db.write(|store| create_requirement(store, &new_requirement(ProductId(99), &[1.0])));
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[test]
    fn test_reject_draft_is_invalid_transition() {
        let (mut db, product) = setup();
        let req = db
            .write(|store| create_requirement(store, &new_requirement(product, &[1.0])))
            .unwrap();

        let result = db.write(|store| reject_requirement(store, req.id));
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn test_reject_quoted_requirement() {
        let (mut db, product) = setup();
        let req = db
            .write(|store| create_requirement(store, &new_requirement(product, &[1.0])))
            .unwrap();
        db.write(|store| store.set_state(req.id, RequirementState::Quoted))
            .unwrap();

        let rejected = db.write(|store| reject_requirement(store, req.id)).unwrap();
        assert_eq!(rejected.state, RequirementState::Rejected);
    }

    #[test]
    fn test_line_add_and_delete_on_draft() {
        let (mut db, product) = setup();
        let req = db
            .write(|store| create_requirement(store, &new_requirement(product, &[1.0])))
            .unwrap();

        let line = db
            .write(|store| add_line(store, req.id, &NewRequirementLine::new(product, 3.0)))
            .unwrap();
        assert_eq!(line.amount, 3.0);

        db.write(|store| delete_line(store, line.id)).unwrap();
        assert_eq!(db.read().lines(req.id).unwrap().len(), 1);
    }

    #[test]
    fn test_cannot_delete_last_line() {
        let (mut db, product) = setup();
        let req = db
            .write(|store| create_requirement(store, &new_requirement(product, &[1.0])))
            .unwrap();

        let result = db.write(|store| delete_line(store, req.lines[0].id));
        assert!(matches!(result, Err(EngineError::IntegrityViolation(_))));
    }

    #[test]
    fn test_update_line_validates_amount() {
        let (mut db, product) = setup();
        let req = db
            .write(|store| create_requirement(store, &new_requirement(product, &[1.0])))
            .unwrap();

        let patch = LinePatch {
            amount: Some(-2.0),
            ..LinePatch::default()
        };
        let result = db.write(|store| update_line(store, req.lines[0].id, &patch));
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_update_closed_requirement_refused() {
        let (mut db, product) = setup();
        let req = db
            .write(|store| create_requirement(store, &new_requirement(product, &[1.0])))
            .unwrap();
        db.write(|store| store.set_state(req.id, RequirementState::Closed))
            .unwrap();

        let patch = RequirementPatch {
            place: Some("Warehouse".to_string()),
            ..RequirementPatch::default()
        };
        let result = db.write(|store| update_requirement(store, req.id, &patch));
        assert!(matches!(result, Err(EngineError::IntegrityViolation(_))));
    }

    #[test]
    fn test_delete_requirement_without_quotations() {
        let (mut db, product) = setup();
        let req = db
            .write(|store| create_requirement(store, &new_requirement(product, &[1.0, 2.0])))
            .unwrap();

        db.write(|store| delete_requirement(store, req.id)).unwrap();
        assert!(db.read().get_requirement(req.id).unwrap().is_none());
    }
}
