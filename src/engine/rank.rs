//! Dense ranking of quotations by total price

use serde::Serialize;
use tracing::debug;

use super::aggregate::{summations, QuotationTotal};
use super::{expect_rows, EngineResult};
use crate::core::identity::{ProviderId, QuotationId, RequirementId};
use crate::core::store::{QuotationStore, RequirementStore};

/// A quotation's total and its rank
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ranking {
    pub quotation_id: QuotationId,
    pub provider_id: ProviderId,
    pub summation: f64,
    /// 1 is the cheapest
    pub winner_level: u32,
}

/// Order totals ascending and number them from 1
///
/// The sort is stable, so equal totals keep quotation creation order.
pub fn rank(mut totals: Vec<QuotationTotal>) -> Vec<Ranking> {
    totals.sort_by(|a, b| a.summation.total_cmp(&b.summation));
    totals
        .into_iter()
        .enumerate()
        .map(|(pos, t)| Ranking {
            quotation_id: t.quotation_id,
            provider_id: t.provider_id,
            summation: t.summation,
            winner_level: pos as u32 + 1,
        })
        .collect()
}

/// Recompute and persist the level of every quotation of a requirement
pub fn rerank<S>(store: &S, requirement: RequirementId) -> EngineResult<Vec<Ranking>>
where
    S: RequirementStore + QuotationStore,
{
    let ranking = rank(summations(store, requirement)?);

    for r in &ranking {
        let rows = store.set_winner_level(r.quotation_id, r.winner_level)?;
        expect_rows(rows, "quotation", r.quotation_id)?;
        debug!(
            requirement = %requirement,
            quotation = %r.quotation_id,
            summation = r.summation,
            level = r.winner_level,
            "ranked quotation"
        );
    }

    Ok(ranking)
}
