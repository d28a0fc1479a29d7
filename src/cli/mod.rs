//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod entity_cmd;
pub mod filters;
pub mod helpers;
pub mod output;
pub mod table;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};
pub use filters::StateFilter;
