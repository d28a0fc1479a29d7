//! Entity trait - common interface for stored records

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Display;

use crate::core::identity::EntityPrefix;

/// Common trait for top-level records (requirements, products, providers)
pub trait Entity: Serialize {
    /// The entity type prefix (e.g., REQ, PROV)
    const PREFIX: EntityPrefix;

    /// Typed identifier
    type Id: Copy + Display;

    /// Get the entity's unique ID
    fn id(&self) -> Self::Id;

    /// Get the entity's display title
    fn title(&self) -> &str;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;
}
