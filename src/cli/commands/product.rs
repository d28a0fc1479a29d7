//! `tender product` command - product catalog

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::entity_cmd::{
    output_new_entity, output_updated_entity, print_created_footer, show_entity,
};
use crate::cli::filters::{print_page_footer, PageArgs};
use crate::cli::helpers::{engine_error, open_engine, print_field, print_rule};
use crate::cli::output::{effective_format, print_serialized};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::ProductId;
use crate::entities::product::{NewProduct, Product, ProductPatch};

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// Add a product to the catalog
    New(NewArgs),

    /// List products, newest first
    List(ListArgs),

    /// Show a product
    Show(ShowArgs),

    /// Change product fields
    Update(UpdateArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Product name (required)
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Classification, e.g. goods or service
    #[arg(long = "type", short = 't')]
    pub product_type: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Product ID (PROD-N or N)
    pub id: ProductId,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Product ID (PROD-N or N)
    pub id: ProductId,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long = "type", short = 't')]
    pub product_type: Option<String>,

    /// Mark active or inactive
    #[arg(long)]
    pub active: Option<bool>,
}

const PRODUCT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID"),
    ColumnDef::new("name", "NAME"),
    ColumnDef::new("type", "TYPE"),
    ColumnDef::new("active", "ACTIVE"),
    ColumnDef::new("created", "CREATED"),
];

pub fn run(cmd: ProductCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProductCommands::New(args) => run_new(args, global),
        ProductCommands::List(args) => run_list(args, global),
        ProductCommands::Show(args) => run_show(args, global),
        ProductCommands::Update(args) => run_update(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (mut engine, _) = open_engine()?;
    let product = engine
        .create_product(&NewProduct {
            name: args.name,
            description: args.description,
            product_type: args.product_type,
        })
        .map_err(engine_error)?;

    output_new_entity(&product, "product", None, global)
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (engine, _) = open_engine()?;
    let page = engine
        .list_products(&args.page.to_request())
        .map_err(engine_error)?;

    if args.page.count {
        println!("{}", page.total);
        return Ok(());
    }

    let format = effective_format(global.format, true);
    if print_serialized(&page.items, format)? {
        return Ok(());
    }

    let rows: Vec<TableRow> = page.items.iter().map(product_to_row).collect();
    TableFormatter::new(PRODUCT_COLUMNS, "products").output(&rows, format)?;
    if format == OutputFormat::Table {
        print_page_footer(&page);
    }
    Ok(())
}

fn product_to_row(product: &Product) -> TableRow {
    TableRow::new(product.id)
        .cell("name", CellValue::Text(product.name.clone()))
        .cell("type", CellValue::OptText(product.product_type.clone()))
        .cell("active", CellValue::Flag(product.active))
        .cell("created", CellValue::Date(Some(product.created.date_naive())))
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (engine, _) = open_engine()?;
    let product = engine.product(args.id).map_err(engine_error)?;

    show_entity(&product, global, |p| {
        print_rule();
        println!("{}: {}", style("ID").bold(), style(p.id).cyan());
        println!("{}: {}", style("Name").bold(), style(&p.name).yellow());
        print_field("Type", p.product_type.as_deref());
        println!(
            "{}: {}",
            style("Active").bold(),
            if p.active { "yes" } else { "no" }
        );
        if let Some(ref description) = p.description {
            println!();
            println!("{}", style("Description:").bold());
            println!("{}", description);
        }
        print_created_footer(p, None);
    })
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let patch = ProductPatch {
        name: args.name,
        description: args.description,
        product_type: args.product_type,
        active: args.active,
    };
    if patch.is_empty() {
        return Err(miette::miette!("Nothing to update: pass at least one field"));
    }

    let (mut engine, _) = open_engine()?;
    let product = engine
        .update_product(args.id, &patch)
        .map_err(engine_error)?;
    output_updated_entity(&product, "product", global)
}
