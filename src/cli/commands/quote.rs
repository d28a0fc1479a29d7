//! `tender quote` command - provider quotations

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{engine_error, open_engine, print_field, print_rule};
use crate::cli::output::{effective_format, money, print_serialized, quantity};
use crate::cli::table::{render_grid, CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::{DetailId, ProviderId, QuotationId, RequirementId};
use crate::engine::Engine;
use crate::entities::quotation::{NewQuotation, NewQuotationDetail, Quotation, QuotationPatch};

#[derive(Subcommand, Debug)]
pub enum QuoteCommands {
    /// Register a provider's quotation for a requirement
    New(NewArgs),

    /// List a requirement's quotations by rank
    List(ListArgs),

    /// Show a quotation with its prices
    Show(ShowArgs),

    /// Change the unit price of one quotation detail
    Price(PriceArgs),

    /// Change quotation header fields
    Update(UpdateArgs),

    /// Delete a quotation and re-rank the rest
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Requirement ID (REQ-N or N)
    #[arg(long, short = 'r')]
    pub requirement: RequirementId,

    /// Provider ID (PROV-N or N)
    #[arg(long, short = 'p')]
    pub provider: ProviderId,

    /// Unit prices in requirement line order (repeat or comma-separate)
    #[arg(long = "price", required = true, value_delimiter = ',')]
    pub prices: Vec<f64>,

    /// Emission date (YYYY-MM-DD, default today)
    #[arg(long)]
    pub emission: Option<NaiveDate>,

    /// Promised delivery date (YYYY-MM-DD)
    #[arg(long)]
    pub deliver: Option<NaiveDate>,

    #[arg(long)]
    pub observation: Option<String>,

    /// Flag this quotation as the suggested winner
    #[arg(long)]
    pub suggest_winner: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Requirement ID (REQ-N or N)
    #[arg(long, short = 'r')]
    pub requirement: RequirementId,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Quotation ID (QUOT-N or N)
    pub id: QuotationId,
}

#[derive(clap::Args, Debug)]
pub struct PriceArgs {
    /// Detail ID (DET-N or N)
    #[arg(long, short = 'd')]
    pub detail: DetailId,

    /// New unit price
    #[arg(long)]
    pub price: f64,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Quotation ID (QUOT-N or N)
    pub id: QuotationId,

    #[arg(long)]
    pub emission: Option<NaiveDate>,

    #[arg(long)]
    pub deliver: Option<NaiveDate>,

    #[arg(long)]
    pub observation: Option<String>,

    /// Set or clear the suggested-winner flag
    #[arg(long)]
    pub suggest_winner: Option<bool>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Quotation ID (QUOT-N or N)
    pub id: QuotationId,
}

const QUOTE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID"),
    ColumnDef::new("level", "LEVEL"),
    ColumnDef::new("provider", "PROVIDER"),
    ColumnDef::new("author", "AUTHOR"),
    ColumnDef::new("lines", "LINES"),
    ColumnDef::new("deliver", "DELIVER"),
    ColumnDef::new("total", "TOTAL"),
    ColumnDef::new("suggested", "SUGGESTED"),
    ColumnDef::new("winner", "WINNER"),
];

pub fn run(cmd: QuoteCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        QuoteCommands::New(args) => run_new(args, global),
        QuoteCommands::List(args) => run_list(args, global),
        QuoteCommands::Show(args) => run_show(args, global),
        QuoteCommands::Price(args) => run_price(args, global),
        QuoteCommands::Update(args) => run_update(args, global),
        QuoteCommands::Delete(args) => run_delete(args),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (mut engine, config) = open_engine()?;
    let req = engine.requirement(args.requirement).map_err(engine_error)?;

    if args.prices.len() != req.lines.len() {
        return Err(miette::miette!(
            "{} has {} line(s) but {} price(s) were given",
            req.id,
            req.lines.len(),
            args.prices.len()
        ));
    }

    let details = req
        .lines
        .iter()
        .zip(&args.prices)
        .map(|(line, &unit_price)| NewQuotationDetail {
            line_id: line.id,
            unit_price,
        })
        .collect();

    let new = NewQuotation {
        emission_date: Some(
            args.emission
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
        ),
        deliver_date: args.deliver,
        observation: args.observation,
        suggest_winner: args.suggest_winner,
        ..NewQuotation::new(args.requirement, args.provider, config.author(), details)
    };
    let quotation = engine.create_quotation(&new).map_err(engine_error)?;

    match global.format {
        OutputFormat::Id => println!("{}", quotation.id),
        OutputFormat::Json | OutputFormat::Yaml => {
            print_serialized(&quotation, global.format)?;
        }
        _ => {
            let total = total_of(&engine, &quotation)?;
            println!(
                "{} Created quotation {}",
                style("✓").green(),
                style(quotation.id).cyan()
            );
            println!(
                "   {} from {} | total {} | level {}",
                quotation.requirement_id,
                quotation.provider_id,
                style(money(total)).yellow(),
                quotation.winner_level
            );
        }
    }
    Ok(())
}

fn total_of(engine: &Engine, quotation: &Quotation) -> Result<f64> {
    Ok(engine
        .summations(quotation.requirement_id)
        .map_err(engine_error)?
        .into_iter()
        .find(|t| t.quotation_id == quotation.id)
        .map(|t| t.summation)
        .unwrap_or(0.0))
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (engine, _) = open_engine()?;
    let quotations = engine.quotations(args.requirement).map_err(engine_error)?;

    let format = effective_format(global.format, true);
    if print_serialized(&quotations, format)? {
        return Ok(());
    }

    let rows: Vec<TableRow> = quotations
        .iter()
        .map(|q| {
            TableRow::new(q.id)
                .cell("level", CellValue::Int(q.winner_level as i64))
                .cell("provider", CellValue::Text(q.provider_name.clone()))
                .cell("author", CellValue::Text(q.author.clone()))
                .cell("lines", CellValue::Int(q.lines as i64))
                .cell("deliver", CellValue::Date(q.deliver_date))
                .cell("total", CellValue::Money(q.summation))
                .cell("suggested", CellValue::Flag(q.suggest_winner))
                .cell("winner", CellValue::Flag(q.winner))
        })
        .collect();
    TableFormatter::new(QUOTE_COLUMNS, "quotations").output(&rows, format)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (engine, _) = open_engine()?;
    let quotation = engine.quotation(args.id).map_err(engine_error)?;

    if print_serialized(&quotation, global.format)? {
        return Ok(());
    }
    if global.format == OutputFormat::Id {
        println!("{}", quotation.id);
        return Ok(());
    }

    let req = engine
        .requirement(quotation.requirement_id)
        .map_err(engine_error)?;
    let provider = engine
        .provider(quotation.provider_id)
        .map_err(engine_error)?;
    let total = total_of(&engine, &quotation)?;

    print_rule();
    println!("{}: {}", style("ID").bold(), style(quotation.id).cyan());
    println!(
        "{}: {} ({})",
        style("Requirement").bold(),
        style(&req.name).yellow(),
        req.id
    );
    println!(
        "{}: {} ({})",
        style("Provider").bold(),
        style(&provider.name).yellow(),
        provider.id
    );
    println!(
        "{}: {} | {}: {}{}",
        style("Level").bold(),
        quotation.winner_level,
        style("Total").bold(),
        style(money(total)).green(),
        if quotation.winner {
            format!(" | {}", style("WINNER").green().bold())
        } else {
            String::new()
        }
    );
    print_rule();
    print_field("Emission", quotation.emission_date);
    print_field("Deliver", quotation.deliver_date);
    if quotation.suggest_winner {
        println!("{}: yes", style("Suggested winner").bold());
    }
    print_field("Observation", quotation.observation.as_deref());

    let headers: Vec<String> = ["DETAIL", "LINE", "PRODUCT", "AMOUNT", "UNIT PRICE", "SUBTOTAL"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<String>> = req
        .lines
        .iter()
        .filter_map(|line| {
            quotation.detail_for(line.id).map(|d| {
                vec![
                    d.id.to_string(),
                    line.id.to_string(),
                    line.product_name.clone(),
                    quantity(line.amount),
                    money(d.unit_price),
                    money(d.unit_price * line.amount),
                ]
            })
        })
        .collect();
    println!();
    print!("{}", render_grid(&headers, &rows, OutputFormat::Table)?);

    print_rule();
    println!(
        "{}: {} | {}: {}",
        style("Author").dim(),
        quotation.author,
        style("Created").dim(),
        quotation.created.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}

fn run_price(args: PriceArgs, global: &GlobalOpts) -> Result<()> {
    let (mut engine, _) = open_engine()?;
    let quotation = engine
        .update_detail_price(args.detail, args.price)
        .map_err(engine_error)?;

    match global.format {
        OutputFormat::Id => println!("{}", quotation.id),
        OutputFormat::Json | OutputFormat::Yaml => {
            print_serialized(&quotation, global.format)?;
        }
        _ => {
            let total = total_of(&engine, &quotation)?;
            println!(
                "{} Updated {} of {}: unit price {}",
                style("✓").green(),
                style(args.detail).cyan(),
                style(quotation.id).cyan(),
                money(args.price)
            );
            println!(
                "   total {} | level {}",
                style(money(total)).yellow(),
                quotation.winner_level
            );
        }
    }
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let patch = QuotationPatch {
        emission_date: args.emission,
        deliver_date: args.deliver,
        observation: args.observation,
        suggest_winner: args.suggest_winner,
    };
    if patch.is_empty() {
        return Err(miette::miette!("Nothing to update: pass at least one field"));
    }

    let (mut engine, _) = open_engine()?;
    let quotation = engine
        .update_quotation(args.id, &patch)
        .map_err(engine_error)?;

    match global.format {
        OutputFormat::Id => println!("{}", quotation.id),
        OutputFormat::Json | OutputFormat::Yaml => {
            print_serialized(&quotation, global.format)?;
        }
        _ => println!(
            "{} Updated quotation {}",
            style("✓").green(),
            style(quotation.id).cyan()
        ),
    }
    Ok(())
}

fn run_delete(args: DeleteArgs) -> Result<()> {
    let (mut engine, _) = open_engine()?;
    engine.delete_quotation(args.id).map_err(engine_error)?;
    println!(
        "{} Deleted quotation {}",
        style("✓").green(),
        style(args.id).cyan()
    );
    Ok(())
}
