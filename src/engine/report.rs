//! Purchase orders and dashboard statistics

use chrono::NaiveDate;
use serde::Serialize;

use super::{load_requirement, EngineError, EngineResult, EngineSettings};
use crate::core::identity::{LineId, ProviderId, QuotationId, RequirementId};
use crate::core::lifecycle::RequirementState;
use crate::core::store::{
    CatalogStore, QuotationStore, RankedName, RequirementStore, StatisticsStore,
};

/// Entries per statistics ranking
pub const STATISTICS_LIMIT: u32 = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderProvider {
    pub id: ProviderId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ruc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub code: LineId,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_measure: Option<String>,
    pub description: String,
    pub unit_price: f64,
    pub total: f64,
}

/// Purchase order for the winning quotation of a requirement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseOrder {
    pub requirement_id: RequirementId,
    pub requirement_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    pub quotation_id: QuotationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deliver_date: Option<NaiveDate>,
    pub provider: OrderProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub lines: Vec<OrderLine>,
    pub total: f64,
}

/// Build the purchase order; fails with `NotFound` when no winner is set
pub fn purchase_order<S>(
    store: &S,
    requirement: RequirementId,
    settings: &EngineSettings,
) -> EngineResult<PurchaseOrder>
where
    S: RequirementStore + QuotationStore + CatalogStore,
{
    let req = load_requirement(store, requirement)?;
    let quotation = store
        .winner_of(requirement)?
        .ok_or_else(|| EngineError::not_found("Winning quotation for requirement", requirement))?;
    let provider = store
        .get_provider(quotation.provider_id)?
        .ok_or_else(|| EngineError::not_found("Provider", quotation.provider_id))?;

    let lines: Vec<OrderLine> = req
        .lines
        .iter()
        .filter_map(|line| {
            quotation.detail_for(line.id).map(|detail| OrderLine {
                code: line.id,
                amount: line.amount,
                unit_measure: line.unit_measure.clone(),
                description: line.product_name.clone(),
                unit_price: detail.unit_price,
                total: detail.unit_price * line.amount,
            })
        })
        .collect();
    let total = lines.iter().map(|l| l.total).sum();

    Ok(PurchaseOrder {
        requirement_id: req.id,
        requirement_name: req.name,
        destination: req.destination,
        quotation_id: quotation.id,
        deliver_date: quotation.deliver_date,
        provider: OrderProvider {
            id: provider.id,
            name: provider.name,
            ruc: provider.ruc,
            manager: provider.manager,
            address: provider.address,
        },
        company: settings.company.clone(),
        city: settings.city.clone(),
        lines,
        total,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateCount {
    pub state: RequirementState,
    pub count: i64,
}

/// Dashboard figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub top_providers: Vec<RankedName>,
    pub top_products: Vec<RankedName>,
    pub top_authors: Vec<RankedName>,
    pub by_state: Vec<StateCount>,
    pub total_requirements: i64,
}

pub fn statistics<S>(store: &S) -> EngineResult<Statistics>
where
    S: RequirementStore + StatisticsStore,
{
    let by_state: Vec<StateCount> = store
        .count_by_state()?
        .into_iter()
        .map(|(state, count)| StateCount { state, count })
        .collect();
    let total_requirements = by_state.iter().map(|s| s.count).sum();

    Ok(Statistics {
        top_providers: store.top_winning_providers(STATISTICS_LIMIT)?,
        top_products: store.top_requested_products(STATISTICS_LIMIT)?,
        top_authors: store.top_requesting_authors(STATISTICS_LIMIT)?,
        by_state,
        total_requirements,
    })
}
