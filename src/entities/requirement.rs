//! Requirement entity type - a purchase request and its lines

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::entity::Entity;
use crate::core::identity::{EntityPrefix, LineId, ProductId, RequirementId};
use crate::core::lifecycle::RequirementState;

/// One requested product and quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementLine {
    pub id: LineId,

    pub requirement_id: RequirementId,

    pub product_id: ProductId,

    /// Product name, joined from the catalog
    #[serde(default)]
    pub product_name: String,

    /// Requested quantity, always positive
    pub amount: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_measure: Option<String>,

    /// Reference price per unit, non-negative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
}

/// A purchase requirement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: RequirementId,

    pub name: String,

    /// Where the goods are needed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,

    /// Department or project receiving the goods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emission_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,

    /// Person who asked for the purchase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimant: Option<String>,

    /// Who recorded the requirement
    pub author: String,

    pub state: RequirementState,

    pub created: DateTime<Utc>,

    /// Lines in creation order; empty in list projections
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<RequirementLine>,
}

impl Entity for Requirement {
    const PREFIX: EntityPrefix = EntityPrefix::Req;
    type Id = RequirementId;

    fn id(&self) -> RequirementId {
        self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

impl Requirement {
    pub fn summary(&self) -> RequirementSummary {
        RequirementSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }

    /// Sum of suggested prices times amounts, over lines that carry one
    pub fn suggested_total(&self) -> f64 {
        self.lines
            .iter()
            .filter_map(|l| l.suggested_price.map(|p| p * l.amount))
            .sum()
    }
}

/// Minimal listing projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementSummary {
    pub id: RequirementId,
    pub name: String,
}

/// Fields for a new requirement line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRequirementLine {
    pub product_id: ProductId,
    pub amount: f64,
    #[serde(default)]
    pub unit_measure: Option<String>,
    #[serde(default)]
    pub suggested_price: Option<f64>,
    #[serde(default)]
    pub observation: Option<String>,
}

impl NewRequirementLine {
    pub fn new(product_id: ProductId, amount: f64) -> Self {
        Self {
            product_id,
            amount,
            unit_measure: None,
            suggested_price: None,
            observation: None,
        }
    }
}

/// Parses `PRODUCT:AMOUNT[:UNIT[:SUGGESTED]]`, e.g. `PROD-2:10:box:4.50`
impl FromStr for NewRequirementLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        if parts.len() < 2 || parts.len() > 4 {
            return Err(format!(
                "Invalid line '{}': expected PRODUCT:AMOUNT[:UNIT[:SUGGESTED]]",
                s
            ));
        }

        let product_id: ProductId = parts[0].parse().map_err(|e| format!("{}", e))?;
        let amount: f64 = parts[1]
            .parse()
            .map_err(|_| format!("Invalid amount '{}' in line '{}'", parts[1], s))?;

        let unit_measure = parts
            .get(2)
            .filter(|u| !u.is_empty())
            .map(|u| u.to_string());

        let suggested_price = match parts.get(3).filter(|p| !p.is_empty()) {
            Some(p) => Some(
                p.parse::<f64>()
                    .map_err(|_| format!("Invalid suggested price '{}' in line '{}'", p, s))?,
            ),
            None => None,
        };

        Ok(Self {
            product_id,
            amount,
            unit_measure,
            suggested_price,
            observation: None,
        })
    }
}

/// Fields for a new requirement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRequirement {
    pub name: String,
    pub place: Option<String>,
    pub destination: Option<String>,
    pub emission_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub claimant: Option<String>,
    pub author: String,
    pub lines: Vec<NewRequirementLine>,
}

/// Partial header update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct RequirementPatch {
    pub name: Option<String>,
    pub place: Option<String>,
    pub destination: Option<String>,
    pub emission_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub claimant: Option<String>,
}

impl RequirementPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.place.is_none()
            && self.destination.is_none()
            && self.emission_date.is_none()
            && self.expiration_date.is_none()
            && self.claimant.is_none()
    }
}

/// Partial line update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct LinePatch {
    pub amount: Option<f64>,
    pub unit_measure: Option<String>,
    pub suggested_price: Option<f64>,
    pub observation: Option<String>,
}
