//! `tender init` command - project initialization

use console::style;
use miette::{IntoDiagnostic, Result};
use std::time::Duration;

use crate::core::config::Config;
use crate::core::project::{Project, ProjectError};
use crate::core::store::Database;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Reinitialize an existing project (the database is kept)
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let cwd = std::env::current_dir().into_diagnostic()?;

    let project = match Project::init(&cwd, args.force) {
        Ok(project) => project,
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Tender project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!("   Use {} to reinitialize", style("--force").yellow());
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    let config = Config::load_for(Some(&project));
    Database::open(
        &project.database_path(),
        Duration::from_millis(config.busy_timeout_ms),
    )
    .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Initialized tender project in {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    println!("   {}", style(project.config_path().display()).dim());
    println!("   {}", style(project.database_path().display()).dim());

    Ok(())
}
