//! `tender provider` command - provider management

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
use crate::core::identity::ProviderId;
use crate::entities::provider::{NewProvider, Provider, ProviderPatch};

#[derive(Subcommand, Debug)]
pub enum ProviderCommands {
    /// Register a provider
    New(NewArgs),

    /// List providers, newest first (search matches name or RUC)
    List(ListArgs),

    /// Show a provider
    Show(ShowArgs),

    /// Change provider fields
    Update(UpdateArgs),
}

/// Contact and tax fields shared by `new` and `update`
#[derive(clap::Args, Debug)]
pub struct ContactArgs {
    /// Taxpayer registration number (unique, up to 15 characters)
    #[arg(long)]
    pub ruc: Option<String>,

    /// Contact person
    #[arg(long, short = 'm')]
    pub manager: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub observation: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Provider name (required)
    #[arg(long, short = 'n')]
    pub name: String,

    #[command(flatten)]
    pub contact: ContactArgs,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Provider ID (PROV-N or N)
    pub id: ProviderId,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Provider ID (PROV-N or N)
    pub id: ProviderId,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[command(flatten)]
    pub contact: ContactArgs,

    /// Mark active or inactive
    #[arg(long)]
    pub active: Option<bool>,
}

const PROVIDER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID"),
    ColumnDef::new("name", "NAME"),
    ColumnDef::new("ruc", "RUC"),
    ColumnDef::new("manager", "MANAGER"),
    ColumnDef::new("phone", "PHONE"),
    ColumnDef::new("active", "ACTIVE"),
];

pub fn run(cmd: ProviderCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProviderCommands::New(args) => run_new(args, global),
        ProviderCommands::List(args) => run_list(args, global),
        ProviderCommands::Show(args) => run_show(args, global),
        ProviderCommands::Update(args) => run_update(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (mut engine, _) = open_engine()?;
    let contact = args.contact;
    let provider = engine
        .create_provider(&NewProvider {
            name: args.name,
            ruc: contact.ruc,
            manager: contact.manager,
            email: contact.email,
            phone: contact.phone,
            address: contact.address,
            observation: contact.observation,
        })
        .map_err(engine_error)?;

    let info = provider
        .ruc
        .as_ref()
        .map(|ruc| format!("{} (RUC {})", style(&provider.name).yellow(), ruc));
    output_new_entity(&provider, "provider", info.as_deref(), global)
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (engine, _) = open_engine()?;
    let page = engine
        .list_providers(&args.page.to_request())
        .map_err(engine_error)?;

    if args.page.count {
        println!("{}", page.total);
        return Ok(());
    }

    let format = effective_format(global.format, true);
    if print_serialized(&page.items, format)? {
        return Ok(());
    }

    let rows: Vec<TableRow> = page.items.iter().map(provider_to_row).collect();
    TableFormatter::new(PROVIDER_COLUMNS, "providers").output(&rows, format)?;
    if format == OutputFormat::Table {
        print_page_footer(&page);
    }
    Ok(())
}

fn provider_to_row(provider: &Provider) -> TableRow {
    TableRow::new(provider.id)
        .cell("name", CellValue::Text(provider.name.clone()))
        .cell("ruc", CellValue::OptText(provider.ruc.clone()))
        .cell("manager", CellValue::OptText(provider.manager.clone()))
        .cell("phone", CellValue::OptText(provider.phone.clone()))
        .cell("active", CellValue::Flag(provider.active))
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (engine, _) = open_engine()?;
    let provider = engine.provider(args.id).map_err(engine_error)?;

    show_entity(&provider, global, |p| {
        print_rule();
        println!("{}: {}", style("ID").bold(), style(p.id).cyan());
        println!("{}: {}", style("Name").bold(), style(&p.name).yellow());
        print_field("RUC", p.ruc.as_deref());
        println!(
            "{}: {}",
            style("Active").bold(),
            if p.active { "yes" } else { "no" }
        );
        print_rule();
        print_field("Manager", p.manager.as_deref());
        print_field("Email", p.email.as_deref());
        print_field("Phone", p.phone.as_deref());
        print_field("Address", p.address.as_deref());
        if let Some(ref observation) = p.observation {
            println!();
            println!("{}", style("Observation:").bold());
            println!("{}", observation);
        }
        print_created_footer(p, None);
    })
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let contact = args.contact;
    let patch = ProviderPatch {
        name: args.name,
        ruc: contact.ruc,
        manager: contact.manager,
        email: contact.email,
        phone: contact.phone,
        address: contact.address,
        observation: contact.observation,
        active: args.active,
    };
    if patch.is_empty() {
        return Err(miette::miette!("Nothing to update: pass at least one field"));
    }

    let (mut engine, _) = open_engine()?;
    let provider = engine
        .update_provider(args.id, &patch)
        .map_err(engine_error)?;
    output_updated_entity(&provider, "provider", global)
}
