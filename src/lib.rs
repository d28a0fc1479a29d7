//! Tender: purchase requirement and quotation evaluation toolkit
//!
//! Tracks purchase requirements, the price quotations providers submit
//! against them, and the ranking and winner selection that turns a set of
//! quotations into a purchase order. Records live in a SQLite database
//! inside a `.tender/` project directory.

pub mod cli;
pub mod core;
pub mod engine;
pub mod entities;
