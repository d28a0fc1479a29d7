//! Quotation intake, revision and listing
//!
//! Every change to prices re-ranks the requirement's quotations inside the
//! same transaction.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use super::aggregate::summations;
use super::catalog::load_provider;
use super::rank::rerank;
use super::{expect_rows, load_quotation, load_requirement, EngineError, EngineResult};
use crate::core::identity::{DetailId, ProviderId, QuotationId, RequirementId};
use crate::core::lifecycle::{transition, RequirementState};
use crate::core::store::{CatalogStore, QuotationStore, RequirementStore};
use crate::entities::quotation::{NewQuotation, Quotation, QuotationPatch};
use crate::entities::requirement::Requirement;

/// Listing row for a requirement's quotations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotationSummary {
    pub id: QuotationId,
    pub provider_id: ProviderId,
    pub provider_name: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deliver_date: Option<NaiveDate>,
    /// Number of priced lines
    pub lines: usize,
    pub winner_level: u32,
    pub winner: bool,
    pub suggest_winner: bool,
    pub summation: f64,
}

fn validate_price(price: f64) -> EngineResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(EngineError::Validation(format!(
            "unit price must be non-negative, got {}",
            price
        )));
    }
    Ok(())
}

/// Require the requirement to be in a state that accepts price changes
fn ensure_quoted(requirement: &Requirement) -> EngineResult<()> {
    transition(requirement.state, RequirementState::Quoted)
        .map(|_| ())
        .map_err(|source| EngineError::InvalidTransition {
            id: requirement.id,
            source,
        })
}

/// Details must price every line of the requirement exactly once
fn check_coverage(requirement: &Requirement, new: &NewQuotation) -> EngineResult<()> {
    let lines: HashSet<_> = requirement.lines.iter().map(|l| l.id).collect();
    let mut seen = HashSet::new();

    for detail in &new.details {
        if !lines.contains(&detail.line_id) {
            return Err(EngineError::IntegrityViolation(format!(
                "{} does not belong to {}",
                detail.line_id, requirement.id
            )));
        }
        if !seen.insert(detail.line_id) {
            return Err(EngineError::IntegrityViolation(format!(
                "{} is priced more than once",
                detail.line_id
            )));
        }
        validate_price(detail.unit_price)?;
    }

    if seen.len() != lines.len() {
        let mut missing: Vec<_> = lines.difference(&seen).copied().collect();
        missing.sort();
        let missing: Vec<String> = missing.iter().map(|l| l.to_string()).collect();
        return Err(EngineError::IntegrityViolation(format!(
            "quotation for {} is missing prices for {}",
            requirement.id,
            missing.join(", ")
        )));
    }

    Ok(())
}

/// Register a quotation and re-rank
///
/// Fails with `LimitExceeded` when the requirement already holds `max`
/// quotations. The first quotation moves the requirement to `quoted`.
pub fn create_quotation<S>(store: &S, new: &NewQuotation, max: u32) -> EngineResult<Quotation>
where
    S: RequirementStore + QuotationStore + CatalogStore,
{
    let requirement = load_requirement(store, new.requirement_id)?;
    let next = transition(requirement.state, RequirementState::Quoted).map_err(|source| {
        EngineError::InvalidTransition {
            id: requirement.id,
            source,
        }
    })?;
    load_provider(store, new.provider_id)?;

    let existing = store.count_by_requirement(requirement.id)?;
    if existing >= max as i64 {
        warn!(requirement = %requirement.id, existing, max, "quotation limit reached");
        return Err(EngineError::LimitExceeded {
            requirement: requirement.id,
            max,
        });
    }

    check_coverage(&requirement, new)?;

    let id = store.create_quotation(new)?;
    if requirement.state != next {
        expect_rows(
            store.set_state(requirement.id, next)?,
            "requirement",
            requirement.id,
        )?;
    }
    rerank(store, requirement.id)?;

    info!(
        requirement = %requirement.id,
        quotation = %id,
        provider = %new.provider_id,
        "created quotation"
    );
    load_quotation(store, id)
}

/// Change one detail's unit price and re-rank
pub fn update_detail_price<S>(store: &S, id: DetailId, unit_price: f64) -> EngineResult<Quotation>
where
    S: RequirementStore + QuotationStore,
{
    validate_price(unit_price)?;
    let detail = store
        .get_detail(id)?
        .ok_or_else(|| EngineError::not_found("Quotation detail", id))?;
    let quotation = load_quotation(store, detail.quotation_id)?;
    let requirement = load_requirement(store, quotation.requirement_id)?;
    ensure_quoted(&requirement)?;

    expect_rows(
        store.update_detail_price(id, unit_price)?,
        "quotation detail",
        id,
    )?;
    rerank(store, requirement.id)?;

    info!(
        quotation = %quotation.id,
        detail = %id,
        from = detail.unit_price,
        to = unit_price,
        "revised price"
    );
    load_quotation(store, quotation.id)
}

/// Edit header fields; prices are unaffected
pub fn update_quotation<S>(
    store: &S,
    id: QuotationId,
    patch: &QuotationPatch,
) -> EngineResult<Quotation>
where
    S: RequirementStore + QuotationStore,
{
    let quotation = load_quotation(store, id)?;
    let requirement = load_requirement(store, quotation.requirement_id)?;
    if !requirement.state.is_open() {
        return Err(EngineError::IntegrityViolation(format!(
            "{} is {}; its quotations can no longer be edited",
            requirement.id, requirement.state
        )));
    }

    expect_rows(store.update_quotation(id, patch)?, "quotation", id)?;
    load_quotation(store, id)
}

/// Remove a quotation and its details, then re-rank the rest
pub fn delete_quotation<S>(store: &S, id: QuotationId) -> EngineResult<()>
where
    S: RequirementStore + QuotationStore,
{
    let quotation = load_quotation(store, id)?;
    let requirement = load_requirement(store, quotation.requirement_id)?;
    ensure_quoted(&requirement)?;

    expect_rows(store.delete_quotation(id)?, "quotation", id)?;
    rerank(store, requirement.id)?;

    info!(requirement = %requirement.id, quotation = %id, "deleted quotation");
    Ok(())
}

/// A requirement's quotations with provider names and totals, by rank
pub fn quotation_overview<S>(
    store: &S,
    requirement: RequirementId,
) -> EngineResult<Vec<QuotationSummary>>
where
    S: RequirementStore + QuotationStore + CatalogStore,
{
    load_requirement(store, requirement)?;
    let quotations = store.list_by_requirement(requirement)?;
    let totals: HashMap<QuotationId, f64> = summations(store, requirement)?
        .into_iter()
        .map(|t| (t.quotation_id, t.summation))
        .collect();

    let mut detail_counts: HashMap<QuotationId, usize> = HashMap::new();
    for detail in store.details_by_requirement(requirement)? {
        *detail_counts.entry(detail.quotation_id).or_insert(0) += 1;
    }

    let mut rows = Vec::with_capacity(quotations.len());
    for q in quotations {
        let provider_name = store
            .get_provider(q.provider_id)?
            .map(|p| p.name)
            .unwrap_or_default();
        rows.push(QuotationSummary {
            id: q.id,
            provider_id: q.provider_id,
            provider_name,
            author: q.author,
            deliver_date: q.deliver_date,
            lines: detail_counts.get(&q.id).copied().unwrap_or(0),
            winner_level: q.winner_level,
            winner: q.winner,
            suggest_winner: q.suggest_winner,
            summation: totals.get(&q.id).copied().unwrap_or(0.0),
        });
    }

    rows.sort_by_key(|r| (r.winner_level, r.id));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::LineId;
    use crate::core::store::Database;
    use crate::engine::requirements::create_requirement;
    use crate::entities::product::NewProduct;
    use crate::entities::provider::NewProvider;
    use crate::entities::quotation::NewQuotationDetail;
    use crate::entities::requirement::{NewRequirement, NewRequirementLine};

    struct Fixture {
        db: Database,
        requirement: RequirementId,
        lines: Vec<LineId>,
        providers: Vec<ProviderId>,
    }

    /// Two lines with amounts 2 and 5, three providers
    fn fixture() -> Fixture {
        let mut db = Database::open_in_memory().unwrap();
        let (requirement, lines, providers) = db
            .write(|store| -> EngineResult<_> {
                let paper = store.create_product(&NewProduct::new("Paper"))?;
                let pens = store.create_product(&NewProduct::new("Pens"))?;
                let providers = vec![
                    store.create_provider(&NewProvider::new("Acme"))?,
                    store.create_provider(&NewProvider::new("Globex"))?,
                    store.create_provider(&NewProvider::new("Initech"))?,
                ];
                let req = create_requirement(
                    store,
                    &NewRequirement {
                        name: "Office supplies".to_string(),
                        author: "test".to_string(),
                        lines: vec![
                            NewRequirementLine::new(paper, 2.0),
                            NewRequirementLine::new(pens, 5.0),
                        ],
                        ..NewRequirement::default()
                    },
                )?;
                let lines = req.lines.iter().map(|l| l.id).collect();
                Ok((req.id, lines, providers))
            })
            .unwrap();
        Fixture {
            db,
            requirement,
            lines,
            providers,
        }
    }

    impl Fixture {
        fn new_quotation(&self, provider: usize, prices: &[f64]) -> NewQuotation {
            let details = self
                .lines
                .iter()
                .zip(prices)
                .map(|(&line_id, &unit_price)| NewQuotationDetail {
                    line_id,
                    unit_price,
                })
                .collect();
            NewQuotation::new(self.requirement, self.providers[provider], "test", details)
        }

        fn quote(&mut self, provider: usize, prices: &[f64], max: u32) -> EngineResult<Quotation> {
            let new = self.new_quotation(provider, prices);
            self.db.write(|store| create_quotation(store, &new, max))
        }
    }

    #[test]
    fn test_first_quotation_moves_to_quoted() {
        let mut f = fixture();
        let q = f.quote(0, &[3.0, 4.0], 3).unwrap();

        assert_eq!(q.winner_level, 1);
        let req = f.db.read().get_requirement(f.requirement).unwrap().unwrap();
        assert_eq!(req.state, RequirementState::Quoted);
    }

    #[test]
    fn test_cheaper_quotation_takes_level_one() {
        let mut f = fixture();
        // A = 2*3 + 5*4 = 26, B = 2*2 + 5*5 = 29, C = 2*1 + 5*3 = 17
        let a = f.quote(0, &[3.0, 4.0], 3).unwrap();
        let b = f.quote(1, &[2.0, 5.0], 3).unwrap();
        let c = f.quote(2, &[1.0, 3.0], 3).unwrap();

        let overview = quotation_overview(&f.db.read(), f.requirement).unwrap();
        let order: Vec<_> = overview.iter().map(|r| (r.id, r.winner_level)).collect();
        assert_eq!(order, vec![(c.id, 1), (a.id, 2), (b.id, 3)]);
        assert_eq!(overview[0].summation, 17.0);
        assert_eq!(overview[0].provider_name, "Initech");
        assert_eq!(overview[0].lines, 2);
    }

    #[test]
    fn test_limit_exceeded_writes_nothing() {
        let mut f = fixture();
        f.quote(0, &[3.0, 4.0], 2).unwrap();
        f.quote(1, &[2.0, 5.0], 2).unwrap();

        let result = f.quote(2, &[1.0, 1.0], 2);
        assert!(matches!(
            result,
            Err(EngineError::LimitExceeded { max: 2, .. })
        ));
        assert_eq!(f.db.read().count_by_requirement(f.requirement).unwrap(), 2);
    }

    #[test]
    fn test_incomplete_quotation_rejected() {
        let mut f = fixture();
        let result = f.quote(0, &[3.0], 3);
        assert!(matches!(result, Err(EngineError::IntegrityViolation(_))));

        let req = f.db.read().get_requirement(f.requirement).unwrap().unwrap();
        assert_eq!(req.state, RequirementState::Draft);
    }

    #[test]
    fn test_duplicate_line_rejected() {
        let mut f = fixture();
        let mut new = f.new_quotation(0, &[3.0, 4.0]);
        new.details[1].line_id = new.details[0].line_id;

        let result = f.db.write(|store| create_quotation(store, &new, 3));
        assert!(matches!(result, Err(EngineError::IntegrityViolation(_))));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut f = fixture();
        let result = f.quote(0, &[3.0, -4.0], 3);
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_unknown_provider() {
        let mut f = fixture();
        let mut new = f.new_quotation(0, &[3.0, 4.0]);
        new.provider_id = ProviderId(99);

        let result = f.db.write(|store| create_quotation(store, &new, 3));
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[test]
    fn test_price_revision_reranks() {
        let mut f = fixture();
        let a = f.quote(0, &[3.0, 4.0], 3).unwrap();
        let b = f.quote(1, &[2.0, 5.0], 3).unwrap();
        assert_eq!(b.winner_level, 2);

        // B line 2: 5 -> 1, total 2*2 + 5*1 = 9
        let detail = b.details[1].id;
        let revised = f
            .db
            .write(|store| update_detail_price(store, detail, 1.0))
            .unwrap();
        assert_eq!(revised.winner_level, 1);
        assert_eq!(f.db.read().get_quotation(a.id).unwrap().unwrap().winner_level, 2);
    }

    #[test]
    fn test_delete_quotation_reranks_remaining() {
        let mut f = fixture();
        let a = f.quote(0, &[1.0, 1.0], 3).unwrap();
        let b = f.quote(1, &[2.0, 5.0], 3).unwrap();

        f.db.write(|store| delete_quotation(store, a.id)).unwrap();

        let remaining = f.db.read().get_quotation(b.id).unwrap().unwrap();
        assert_eq!(remaining.winner_level, 1);
        assert_eq!(f.db.read().count_by_requirement(f.requirement).unwrap(), 1);
    }

    #[test]
    fn test_rejected_requirement_refuses_quotations() {
        let mut f = fixture();
        f.quote(0, &[1.0, 1.0], 3).unwrap();
        f.db.write(|store| store.set_state(f.requirement, RequirementState::Rejected))
            .unwrap();

        let result = f.quote(1, &[2.0, 2.0], 3);
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn test_update_quotation_header() {
        let mut f = fixture();
        let q = f.quote(0, &[1.0, 1.0], 3).unwrap();
        let patch = QuotationPatch {
            suggest_winner: Some(true),
            observation: Some("Includes delivery".to_string()),
            ..QuotationPatch::default()
        };

        let updated = f.db.write(|store| update_quotation(store, q.id, &patch)).unwrap();
        assert!(updated.suggest_winner);
        assert_eq!(updated.winner_level, 1);
    }
}
