//! `tender stats` command - dashboard statistics

use console::style;
use miette::Result;

use crate::cli::helpers::{engine_error, open_engine};
use crate::cli::output::print_serialized;
use crate::cli::table::render_grid;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store::RankedName;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let (engine, _) = open_engine()?;
    let stats = engine.statistics().map_err(engine_error)?;

    if print_serialized(&stats, global.format)? {
        return Ok(());
    }

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Table,
        f => f,
    };

    println!(
        "{} ({} total)",
        style("Requirements by state").bold(),
        style(stats.total_requirements).cyan()
    );
    let rows: Vec<Vec<String>> = stats
        .by_state
        .iter()
        .map(|s| vec![s.state.to_string(), s.count.to_string()])
        .collect();
    print!(
        "{}",
        render_grid(&["STATE".to_string(), "COUNT".to_string()], &rows, format)?
    );

    print_ranking("Top winning providers", "PROVIDER", "WINS", &stats.top_providers, format)?;
    print_ranking("Most requested products", "PRODUCT", "LINES", &stats.top_products, format)?;
    print_ranking("Top requesting authors", "AUTHOR", "REQUIREMENTS", &stats.top_authors, format)?;

    Ok(())
}

fn print_ranking(
    title: &str,
    name_header: &str,
    count_header: &str,
    ranking: &[RankedName],
    format: OutputFormat,
) -> Result<()> {
    println!();
    println!("{}", style(title).bold());
    if ranking.is_empty() {
        println!("   {}", style("none yet").dim());
        return Ok(());
    }
    let rows: Vec<Vec<String>> = ranking
        .iter()
        .enumerate()
        .map(|(i, r)| vec![(i + 1).to_string(), r.name.clone(), r.count.to_string()])
        .collect();
    let headers = ["#".to_string(), name_header.to_string(), count_header.to_string()];
    print!("{}", render_grid(&headers, &rows, format)?);
    Ok(())
}
