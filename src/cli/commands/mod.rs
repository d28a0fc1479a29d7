//! CLI command implementations

pub mod compare;
pub mod config;
pub mod init;
pub mod order;
pub mod product;
pub mod provider;
pub mod quote;
pub mod req;
pub mod stats;
pub mod utils;
pub mod winner;
