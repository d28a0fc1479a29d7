//! Quotation entity type - a provider's priced answer to a requirement

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{DetailId, LineId, ProviderId, QuotationId, RequirementId};

/// Price offered for one requirement line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationDetail {
    pub id: DetailId,

    pub quotation_id: QuotationId,

    pub line_id: LineId,

    /// Price per unit, non-negative
    pub unit_price: f64,

    /// Per-line rank annotation; stored, not used by ranking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_level_provider: Option<u32>,

    /// Per-line winner annotation; stored, not used by ranking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_provider_id: Option<ProviderId>,
}

/// A provider quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: QuotationId,

    pub requirement_id: RequirementId,

    pub provider_id: ProviderId,

    /// Who registered the quotation
    pub author: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emission_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliver_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,

    /// Recommended by the person registering it
    #[serde(default)]
    pub suggest_winner: bool,

    /// Selected winner; at most one per requirement
    #[serde(default)]
    pub winner: bool,

    /// Dense rank by total price, 1 is cheapest
    pub winner_level: u32,

    pub created: DateTime<Utc>,

    /// Details in line order; empty in list projections
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<QuotationDetail>,
}

impl Quotation {
    pub fn detail_for(&self, line: LineId) -> Option<&QuotationDetail> {
        self.details.iter().find(|d| d.line_id == line)
    }
}

/// Price for one line of a new quotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewQuotationDetail {
    pub line_id: LineId,
    pub unit_price: f64,
}

/// Fields for a new quotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuotation {
    pub requirement_id: RequirementId,
    pub provider_id: ProviderId,
    pub author: String,
    pub emission_date: Option<NaiveDate>,
    pub deliver_date: Option<NaiveDate>,
    pub observation: Option<String>,
    pub suggest_winner: bool,
    pub details: Vec<NewQuotationDetail>,
}

impl NewQuotation {
    pub fn new(
        requirement_id: RequirementId,
        provider_id: ProviderId,
        author: impl Into<String>,
        details: Vec<NewQuotationDetail>,
    ) -> Self {
        Self {
            requirement_id,
            provider_id,
            author: author.into(),
            emission_date: None,
            deliver_date: None,
            observation: None,
            suggest_winner: false,
            details,
        }
    }
}

/// Partial header update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct QuotationPatch {
    pub emission_date: Option<NaiveDate>,
    pub deliver_date: Option<NaiveDate>,
    pub observation: Option<String>,
    pub suggest_winner: Option<bool>,
}

impl QuotationPatch {
    pub fn is_empty(&self) -> bool {
        self.emission_date.is_none()
            && self.deliver_date.is_none()
            && self.observation.is_none()
            && self.suggest_winner.is_none()
    }
}
