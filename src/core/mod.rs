//! Core module - fundamental types and utilities

pub mod config;
pub mod entity;
pub mod identity;
pub mod lifecycle;
pub mod logging;
pub mod project;
pub mod store;

pub use config::Config;
pub use entity::Entity;
pub use identity::{EntityPrefix, IdParseError};
pub use lifecycle::{RequirementState, TransitionError};
pub use project::{Project, ProjectError};
pub use store::Database;
