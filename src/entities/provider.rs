//! Provider entity type - vendors that submit quotations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityPrefix, ProviderId};

/// Maximum length of a taxpayer registration number
pub const RUC_MAX_LEN: usize = 15;

/// A provider (supplier)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,

    /// Legal or trading name
    pub name: String,

    /// Taxpayer registration number, unique across providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruc: Option<String>,

    /// Contact person
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,

    pub active: bool,

    pub created: DateTime<Utc>,
}

impl Entity for Provider {
    const PREFIX: EntityPrefix = EntityPrefix::Prov;
    type Id = ProviderId;

    fn id(&self) -> ProviderId {
        self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

/// Fields for a new provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProvider {
    pub name: String,
    pub ruc: Option<String>,
    pub manager: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub observation: Option<String>,
}

impl NewProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial provider update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ProviderPatch {
    pub name: Option<String>,
    pub ruc: Option<String>,
    pub manager: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub observation: Option<String>,
    pub active: Option<bool>,
}

impl ProviderPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.ruc.is_none()
            && self.manager.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.observation.is_none()
            && self.active.is_none()
    }
}
