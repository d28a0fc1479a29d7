//! `tender req` command - purchase requirement management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::entity_cmd::{
    output_new_entity, output_updated_entity, print_created_footer, show_entity,
};
use crate::cli::filters::{print_page_footer, PageArgs, StateFilter};
use crate::cli::helpers::{engine_error, open_engine, print_field, print_rule, truncate_str};
use crate::cli::output::{effective_format, money, print_serialized, quantity};
use crate::cli::table::{render_grid, CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{LineId, RequirementId};
use crate::entities::requirement::{
    LinePatch, NewRequirement, NewRequirementLine, Requirement, RequirementPatch,
};

#[derive(Subcommand, Debug)]
pub enum ReqCommands {
    /// Create a requirement with at least one line
    New(NewArgs),

    /// List requirements, newest first
    List(ListArgs),

    /// Show a requirement with its lines
    Show(ShowArgs),

    /// Change header fields of an open requirement
    Update(UpdateArgs),

    /// Reject a quoted requirement
    Reject(IdArgs),

    /// Close a requirement whose winner is set
    Close(IdArgs),

    /// Add a line (only before any quotation exists)
    LineAdd(LineAddArgs),

    /// Change a line (only before any quotation exists)
    LineUpdate(LineUpdateArgs),

    /// Remove a line (only before any quotation exists)
    LineRm(LineRmArgs),

    /// Delete a requirement that has no quotations
    Delete(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Requirement name (required)
    #[arg(long, short = 'n')]
    pub name: String,

    /// Line as PRODUCT:AMOUNT[:UNIT[:SUGGESTED]], repeatable
    #[arg(long = "line", short = 'l', required = true)]
    pub lines: Vec<NewRequirementLine>,

    #[arg(long)]
    pub place: Option<String>,

    #[arg(long, short = 'd')]
    pub destination: Option<String>,

    /// Person or office requesting the purchase
    #[arg(long, short = 'c')]
    pub claimant: Option<String>,

    /// Emission date (YYYY-MM-DD, default today)
    #[arg(long)]
    pub emission: Option<NaiveDate>,

    /// Expiration date (YYYY-MM-DD)
    #[arg(long)]
    pub expiration: Option<NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by state
    #[arg(long, short = 's', default_value = "all")]
    pub state: StateFilter,

    /// Only id and name
    #[arg(long)]
    pub minimal: bool,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Requirement ID (REQ-N or N)
    pub id: RequirementId,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Requirement ID (REQ-N or N)
    pub id: RequirementId,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Requirement ID (REQ-N or N)
    pub id: RequirementId,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long)]
    pub place: Option<String>,

    #[arg(long, short = 'd')]
    pub destination: Option<String>,

    #[arg(long, short = 'c')]
    pub claimant: Option<String>,

    #[arg(long)]
    pub emission: Option<NaiveDate>,

    #[arg(long)]
    pub expiration: Option<NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct LineAddArgs {
    /// Requirement ID (REQ-N or N)
    pub id: RequirementId,

    /// Line as PRODUCT:AMOUNT[:UNIT[:SUGGESTED]]
    pub line: NewRequirementLine,

    #[arg(long)]
    pub observation: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct LineUpdateArgs {
    /// Line ID (LINE-N or N)
    pub line: LineId,

    #[arg(long)]
    pub amount: Option<f64>,

    #[arg(long)]
    pub unit: Option<String>,

    #[arg(long)]
    pub suggested: Option<f64>,

    #[arg(long)]
    pub observation: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct LineRmArgs {
    /// Line ID (LINE-N or N)
    pub line: LineId,
}

const REQ_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID"),
    ColumnDef::new("name", "NAME"),
    ColumnDef::new("state", "STATE"),
    ColumnDef::new("destination", "DESTINATION"),
    ColumnDef::new("claimant", "CLAIMANT"),
    ColumnDef::new("author", "AUTHOR"),
    ColumnDef::new("emission", "EMISSION"),
];

const REQ_MINIMAL_COLUMNS: &[ColumnDef] = &[ColumnDef::new("id", "ID"), ColumnDef::new("name", "NAME")];

pub fn run(cmd: ReqCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReqCommands::New(args) => run_new(args, global),
        ReqCommands::List(args) => run_list(args, global),
        ReqCommands::Show(args) => run_show(args, global),
        ReqCommands::Update(args) => run_update(args, global),
        ReqCommands::Reject(args) => run_reject(args, global),
        ReqCommands::Close(args) => run_close(args, global),
        ReqCommands::LineAdd(args) => run_line_add(args, global),
        ReqCommands::LineUpdate(args) => run_line_update(args, global),
        ReqCommands::LineRm(args) => run_line_rm(args),
        ReqCommands::Delete(args) => run_delete(args),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (mut engine, config) = open_engine()?;

    let new = NewRequirement {
        name: args.name,
        place: args.place,
        destination: args.destination,
        emission_date: Some(
            args.emission
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
        ),
        expiration_date: args.expiration,
        claimant: args.claimant,
        author: config.author(),
        lines: args.lines,
    };
    let req = engine.create_requirement(&new).map_err(engine_error)?;

    let info = format!(
        "{} ({} line{})",
        style(&req.name).yellow(),
        req.lines.len(),
        if req.lines.len() == 1 { "" } else { "s" }
    );
    output_new_entity(&req, "requirement", Some(&info), global)
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (engine, _) = open_engine()?;
    let states = args.state.states();
    let request = args.page.to_request();
    let format = effective_format(global.format, true);

    if args.minimal {
        let page = engine
            .list_requirement_summaries(&states, &request)
            .map_err(engine_error)?;
        if args.page.count {
            println!("{}", page.total);
            return Ok(());
        }
        if print_serialized(&page.items, format)? {
            return Ok(());
        }
        let rows: Vec<TableRow> = page
            .items
            .iter()
            .map(|s| TableRow::new(s.id).cell("name", CellValue::Text(s.name.clone())))
            .collect();
        TableFormatter::new(REQ_MINIMAL_COLUMNS, "requirements").output(&rows, format)?;
        if format == OutputFormat::Table {
            print_page_footer(&page);
        }
        return Ok(());
    }

    let page = engine
        .list_requirements(&states, &request)
        .map_err(engine_error)?;
    if args.page.count {
        println!("{}", page.total);
        return Ok(());
    }
    if print_serialized(&page.items, format)? {
        return Ok(());
    }

    let rows: Vec<TableRow> = page.items.iter().map(requirement_to_row).collect();
    TableFormatter::new(REQ_COLUMNS, "requirements").output(&rows, format)?;
    if format == OutputFormat::Table {
        print_page_footer(&page);
    }
    Ok(())
}

fn requirement_to_row(req: &Requirement) -> TableRow {
    TableRow::new(req.id)
        .cell("name", CellValue::Text(truncate_str(&req.name, 40)))
        .cell("state", CellValue::State(req.state))
        .cell("destination", CellValue::OptText(req.destination.clone()))
        .cell("claimant", CellValue::OptText(req.claimant.clone()))
        .cell("author", CellValue::Text(req.author.clone()))
        .cell("emission", CellValue::Date(req.emission_date))
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (engine, _) = open_engine()?;
    let req = engine.requirement(args.id).map_err(engine_error)?;

    let mut table = Ok(());
    show_entity(&req, global, |r| {
        print_rule();
        println!("{}: {}", style("ID").bold(), style(r.id).cyan());
        println!("{}: {}", style("Name").bold(), style(&r.name).yellow());
        println!("{}: {}", style("State").bold(), r.state);
        print_rule();
        print_field("Place", r.place.as_deref());
        print_field("Destination", r.destination.as_deref());
        print_field("Claimant", r.claimant.as_deref());
        print_field("Emission", r.emission_date);
        print_field("Expiration", r.expiration_date);

        println!();
        println!("{} ({}):", style("Lines").bold(), r.lines.len());
        table = print_lines(r);

        let suggested = r.suggested_total();
        if suggested > 0.0 {
            println!("{}: {}", style("Suggested total").bold(), money(suggested));
        }
        print_created_footer(r, Some(r.author.as_str()));
    })?;
    table
}

fn print_lines(req: &Requirement) -> Result<()> {
    let headers: Vec<String> = ["LINE", "PRODUCT", "AMOUNT", "UNIT", "SUGGESTED", "OBSERVATION"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<String>> = req
        .lines
        .iter()
        .map(|l| {
            vec![
                l.id.to_string(),
                l.product_name.clone(),
                quantity(l.amount),
                l.unit_measure.clone().unwrap_or_else(|| "-".to_string()),
                l.suggested_price.map(money).unwrap_or_else(|| "-".to_string()),
                l.observation.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print!("{}", render_grid(&headers, &rows, OutputFormat::Table)?);
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let patch = RequirementPatch {
        name: args.name,
        place: args.place,
        destination: args.destination,
        emission_date: args.emission,
        expiration_date: args.expiration,
        claimant: args.claimant,
    };
    if patch.is_empty() {
        return Err(miette::miette!("Nothing to update: pass at least one field"));
    }

    let (mut engine, _) = open_engine()?;
    let req = engine
        .update_requirement(args.id, &patch)
        .map_err(engine_error)?;
    output_updated_entity(&req, "requirement", global)
}

fn run_reject(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let (mut engine, _) = open_engine()?;
    let req = engine.reject_requirement(args.id).map_err(engine_error)?;
    print_state_change(&req, "Rejected", global)
}

fn run_close(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let (mut engine, _) = open_engine()?;
    let req = engine.close_requirement(args.id).map_err(engine_error)?;
    print_state_change(&req, "Closed", global)
}

fn print_state_change(req: &Requirement, verb: &str, global: &GlobalOpts) -> Result<()> {
    match global.format {
        OutputFormat::Id => println!("{}", req.id),
        OutputFormat::Json | OutputFormat::Yaml => {
            print_serialized(req, global.format)?;
        }
        _ => println!(
            "{} {} requirement {} (state: {})",
            style("✓").green(),
            verb,
            style(req.id).cyan(),
            req.state
        ),
    }
    Ok(())
}

fn run_line_add(args: LineAddArgs, global: &GlobalOpts) -> Result<()> {
    let line = NewRequirementLine {
        observation: args.observation,
        ..args.line
    };

    let (mut engine, _) = open_engine()?;
    let added = engine.add_line(args.id, &line).map_err(engine_error)?;

    match global.format {
        OutputFormat::Id => println!("{}", added.id),
        OutputFormat::Json | OutputFormat::Yaml => {
            print_serialized(&added, global.format)?;
        }
        _ => println!(
            "{} Added line {} to {}: {} x {}",
            style("✓").green(),
            style(added.id).cyan(),
            style(args.id).cyan(),
            quantity(added.amount),
            style(&added.product_name).yellow()
        ),
    }
    Ok(())
}

fn run_line_update(args: LineUpdateArgs, global: &GlobalOpts) -> Result<()> {
    let patch = LinePatch {
        amount: args.amount,
        unit_measure: args.unit,
        suggested_price: args.suggested,
        observation: args.observation,
    };

    let (mut engine, _) = open_engine()?;
    let line = engine
        .update_line(args.line, &patch)
        .map_err(engine_error)?;

    match global.format {
        OutputFormat::Id => println!("{}", line.id),
        OutputFormat::Json | OutputFormat::Yaml => {
            print_serialized(&line, global.format)?;
        }
        _ => println!("{} Updated line {}", style("✓").green(), style(line.id).cyan()),
    }
    Ok(())
}

fn run_line_rm(args: LineRmArgs) -> Result<()> {
    let (mut engine, _) = open_engine()?;
    engine.delete_line(args.line).map_err(engine_error)?;
    println!("{} Removed line {}", style("✓").green(), style(args.line).cyan());
    Ok(())
}

fn run_delete(args: IdArgs) -> Result<()> {
    let (mut engine, _) = open_engine()?;
    engine.delete_requirement(args.id).map_err(engine_error)?;
    println!(
        "{} Deleted requirement {}",
        style("✓").green(),
        style(args.id).cyan()
    );
    Ok(())
}
