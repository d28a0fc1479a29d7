//! `tender config` command - effective configuration

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::output::print_serialized;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::project::Project;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration after merging all layers
    Show,

    /// Show the config file locations that are read
    Path,
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path => run_path(),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let project = Project::discover().ok();
    let config = Config::load_for(project.as_ref());

    let format = match global.format {
        OutputFormat::Json => OutputFormat::Json,
        _ => OutputFormat::Yaml,
    };
    print_serialized(&config, format)?;

    if global.format == OutputFormat::Auto {
        println!("# effective author: {}", config.author());
    }
    Ok(())
}

fn run_path() -> Result<()> {
    match Config::user_config_path() {
        Some(path) => println!("{}: {}", style("user").bold(), path.display()),
        None => println!("{}: -", style("user").bold()),
    }
    match Project::discover() {
        Ok(project) => println!(
            "{}: {}",
            style("project").bold(),
            project.config_path().display()
        ),
        Err(_) => println!("{}: -", style("project").bold()),
    }
    Ok(())
}
