//! Entity type definitions

pub mod product;
pub mod provider;
pub mod quotation;
pub mod requirement;

pub use product::Product;
pub use provider::Provider;
pub use quotation::{Quotation, QuotationDetail};
pub use requirement::{Requirement, RequirementLine};
