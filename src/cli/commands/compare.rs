//! `tender compare` command - comparative pricing table

use console::style;
use miette::Result;

use crate::cli::helpers::{engine_error, open_engine};
use crate::cli::output::{money, print_serialized, quantity};
use crate::cli::table::render_grid;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::RequirementId;
use crate::engine::table::Grid;

#[derive(clap::Args, Debug)]
pub struct CompareArgs {
    /// Requirement ID (REQ-N or N)
    #[arg(long, short = 'r')]
    pub requirement: RequirementId,

    /// Provider columns per page
    #[arg(long, short = 'c', default_value_t = 3)]
    pub columns: usize,

    /// Page of provider columns to show (default: all columns)
    #[arg(long, short = 'p')]
    pub page: Option<usize>,
}

pub fn run(args: CompareArgs, global: &GlobalOpts) -> Result<()> {
    let (engine, _) = open_engine()?;
    let table = engine
        .comparative_table(args.requirement)
        .map_err(engine_error)?;

    let grid = match args.page {
        Some(page) => table.page(args.columns, page).ok_or_else(|| {
            miette::miette!(
                "page {} out of range: {} has {} page(s) of {} provider(s)",
                page,
                args.requirement,
                table.page_count(args.columns),
                args.columns.max(1)
            )
        })?,
        None => table.grid(),
    };

    // Whole table for JSON/YAML unless a page was asked for
    let serialized = match args.page {
        Some(_) => print_serialized(&grid, global.format)?,
        None => print_serialized(&table, global.format)?,
    };
    if serialized {
        return Ok(());
    }

    if global.format == OutputFormat::Id {
        for column in &grid.columns {
            println!("{}", column.quotation_id);
        }
        return Ok(());
    }

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Table,
        f => f,
    };
    let mark_best = format == OutputFormat::Table;
    let (headers, rows) = grid_cells(&grid, mark_best);

    if format == OutputFormat::Table {
        let page_info = match args.page {
            Some(page) => format!(" (page {} of {})", page, table.page_count(args.columns)),
            None => String::new(),
        };
        println!(
            "{} {}{}",
            style("Comparative table for").bold(),
            style(args.requirement).cyan(),
            page_info
        );
    }
    print!("{}", render_grid(&headers, &rows, format)?);
    if mark_best && !grid.columns.is_empty() {
        println!("{}", style("* lowest unit price for the line").dim());
    }
    Ok(())
}

/// Header and body cells: one row per line, then total and level rows
fn grid_cells(grid: &Grid, mark_best: bool) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers: Vec<String> = ["LINE", "PRODUCT", "AMOUNT", "UNIT"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    headers.extend(grid.columns.iter().map(|c| {
        let winner = if c.winner { " [winner]" } else { "" };
        format!("{} ({}){}", c.name, c.quotation_id, winner)
    }));

    let mut rows: Vec<Vec<String>> = grid
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                row.line.line_id.to_string(),
                row.line.product_name.clone(),
                quantity(row.line.amount),
                row.line.unit_measure.clone().unwrap_or_else(|| "-".to_string()),
            ];
            cells.extend(row.prices.iter().enumerate().map(|(i, price)| match price {
                Some(p) if mark_best && row.best == Some(i) => format!("{} *", money(*p)),
                Some(p) => money(*p),
                None => "-".to_string(),
            }));
            cells
        })
        .collect();

    let padding = || vec![String::new(); 3];

    let mut totals = vec!["TOTAL".to_string()];
    totals.extend(padding());
    totals.extend(grid.totals().into_iter().map(money));
    rows.push(totals);

    let mut levels = vec!["LEVEL".to_string()];
    levels.extend(padding());
    levels.extend(grid.columns.iter().map(|c| c.winner_level.to_string()));
    rows.push(levels);

    let mut delivery = vec!["DELIVER".to_string()];
    delivery.extend(padding());
    delivery.extend(grid.columns.iter().map(|c| {
        c.deliver_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    }));
    rows.push(delivery);

    (headers, rows)
}
