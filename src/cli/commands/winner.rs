//! `tender winner` command - winner selection

use console::style;
use miette::Result;

use crate::cli::helpers::{engine_error, open_engine};
use crate::cli::output::{money, print_serialized};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{QuotationId, RequirementId};
use crate::engine::WinnerChoice;

#[derive(clap::Args, Debug)]
pub struct WinnerArgs {
    /// Requirement ID (REQ-N or N)
    #[arg(long, short = 'r')]
    pub requirement: RequirementId,

    /// Quotation to mark as winner; omit to pick the cheapest
    #[arg(long, short = 'q')]
    pub quotation: Option<QuotationId>,
}

pub fn run(args: WinnerArgs, global: &GlobalOpts) -> Result<()> {
    let (mut engine, _) = open_engine()?;
    let outcome = engine
        .select_winner(args.requirement, WinnerChoice::from(args.quotation))
        .map_err(engine_error)?;

    if print_serialized(&outcome, global.format)? {
        return Ok(());
    }

    match global.format {
        OutputFormat::Id => println!("{}", outcome.quotation_id),
        _ => {
            println!(
                "{} Winner of {}: {} ({} selection)",
                style("✓").green(),
                style(outcome.requirement_id).cyan(),
                style(outcome.quotation_id).cyan(),
                outcome.mode
            );
            println!(
                "   Provider {} | total {} | level {}",
                outcome.provider_id,
                style(money(outcome.summation)).yellow(),
                outcome.winner_level
            );
            if let Some(previous) = outcome.previous_winner {
                println!("   {} replaces {}", style("→").dim(), previous);
            }
        }
    }
    Ok(())
}
