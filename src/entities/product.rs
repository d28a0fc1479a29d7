//! Product entity type - catalog items requested by requirement lines

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityPrefix, ProductId};

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Free-form classification (e.g., "goods", "service")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,

    pub created: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Entity for Product {
    const PREFIX: EntityPrefix = EntityPrefix::Prod;
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

/// Fields for a new product
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub product_type: Option<String>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial product update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub product_type: Option<String>,
    pub active: Option<bool>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.product_type.is_none()
            && self.active.is_none()
    }
}
