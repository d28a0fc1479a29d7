//! `tender order` command - purchase order of the winning quotation

use console::style;
use miette::Result;

use crate::cli::helpers::{engine_error, open_engine, print_field, print_rule};
use crate::cli::output::{money, print_serialized, quantity};
use crate::cli::table::render_grid;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::RequirementId;

#[derive(clap::Args, Debug)]
pub struct OrderArgs {
    /// Requirement ID (REQ-N or N)
    #[arg(long, short = 'r')]
    pub requirement: RequirementId,
}

pub fn run(args: OrderArgs, global: &GlobalOpts) -> Result<()> {
    let (engine, _) = open_engine()?;
    let order = engine
        .purchase_order(args.requirement)
        .map_err(engine_error)?;

    if print_serialized(&order, global.format)? {
        return Ok(());
    }

    let headers: Vec<String> = ["CODE", "AMOUNT", "UNIT", "DESCRIPTION", "UNIT PRICE", "TOTAL"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<String>> = order
        .lines
        .iter()
        .map(|l| {
            vec![
                l.code.to_string(),
                quantity(l.amount),
                l.unit_measure.clone().unwrap_or_else(|| "-".to_string()),
                l.description.clone(),
                money(l.unit_price),
                money(l.total),
            ]
        })
        .collect();

    match global.format {
        OutputFormat::Csv | OutputFormat::Tsv => {
            print!("{}", render_grid(&headers, &rows, global.format)?);
        }
        OutputFormat::Id => println!("{}", order.quotation_id),
        _ => {
            print_rule();
            println!(
                "{} {}",
                style("Purchase order for").bold(),
                style(order.requirement_id).cyan()
            );
            println!("{}: {}", style("Requirement").bold(), style(&order.requirement_name).yellow());
            print_field("Company", order.company.as_deref());
            print_field("City", order.city.as_deref());
            print_field("Destination", order.destination.as_deref());
            print_rule();
            println!(
                "{}: {} ({})",
                style("Provider").bold(),
                style(&order.provider.name).yellow(),
                order.provider.id
            );
            print_field("RUC", order.provider.ruc.as_deref());
            print_field("Manager", order.provider.manager.as_deref());
            print_field("Address", order.provider.address.as_deref());
            print_field("Quotation", Some(order.quotation_id));
            print_field("Deliver", order.deliver_date);
            println!();
            print!("{}", render_grid(&headers, &rows, OutputFormat::Table)?);
            println!("{}: {}", style("Total").bold(), style(money(order.total)).green());
        }
    }
    Ok(())
}
