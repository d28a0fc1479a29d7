//! Per-quotation price totals
//!
//! `summation = sum(detail.unit_price * line.amount)` over a quotation's
//! details. A detail pointing at a line outside the requirement contributes
//! nothing, and a quotation with no details totals 0 but is still reported.

use serde::Serialize;
use std::collections::HashMap;

use super::EngineResult;
use crate::core::identity::{LineId, ProviderId, QuotationId, RequirementId};
use crate::core::store::{QuotationStore, RequirementStore};
use crate::entities::quotation::{Quotation, QuotationDetail};
use crate::entities::requirement::RequirementLine;

/// Total price of one quotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuotationTotal {
    pub quotation_id: QuotationId,
    pub provider_id: ProviderId,
    pub summation: f64,
}

/// Compute totals in quotation order
pub fn aggregate(
    lines: &[RequirementLine],
    quotations: &[Quotation],
    details: &[QuotationDetail],
) -> Vec<QuotationTotal> {
    let amounts: HashMap<LineId, f64> = lines.iter().map(|l| (l.id, l.amount)).collect();

    let mut sums: HashMap<QuotationId, f64> = HashMap::new();
    for detail in details {
        if let Some(amount) = amounts.get(&detail.line_id) {
            *sums.entry(detail.quotation_id).or_insert(0.0) += detail.unit_price * amount;
        }
    }

    quotations
        .iter()
        .map(|q| QuotationTotal {
            quotation_id: q.id,
            provider_id: q.provider_id,
            summation: sums.get(&q.id).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Load a requirement's lines and quotations and total them
pub fn summations<S>(store: &S, requirement: RequirementId) -> EngineResult<Vec<QuotationTotal>>
where
    S: RequirementStore + QuotationStore,
{
    let lines = store.lines(requirement)?;
    let quotations = store.list_by_requirement(requirement)?;
    let details = store.details_by_requirement(requirement)?;
    Ok(aggregate(&lines, &quotations, &details))
}
