//! Shared helper functions for CLI commands

use console::style;
use miette::Result;

use crate::core::config::Config;
use crate::core::project::Project;
use crate::engine::{Engine, EngineError};

/// Discover the project, load its config and open the engine
pub fn open_engine() -> Result<(Engine, Config)> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load_for(Some(&project));
    let engine = Engine::open(&project, &config).map_err(engine_error)?;
    Ok((engine, config))
}

/// Convert an engine error into a diagnostic
pub fn engine_error(e: EngineError) -> miette::Report {
    miette::miette!("{}", e)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a labelled field, skipping absent values
pub fn print_field(label: &str, value: Option<impl std::fmt::Display>) {
    if let Some(value) = value {
        println!("{}: {}", style(label).bold(), value);
    }
}

/// Horizontal rule used by pretty output
pub fn print_rule() {
    println!("{}", style("─".repeat(60)).dim());
}
