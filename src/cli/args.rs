//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::compare::CompareArgs;
use crate::cli::commands::config::ConfigCommands;
use crate::cli::commands::init::InitArgs;
use crate::cli::commands::order::OrderArgs;
use crate::cli::commands::product::ProductCommands;
use crate::cli::commands::provider::ProviderCommands;
use crate::cli::commands::quote::QuoteCommands;
use crate::cli::commands::req::ReqCommands;
use crate::cli::commands::utils::CompletionsArgs;
use crate::cli::commands::winner::WinnerArgs;

#[derive(Parser, Debug)]
#[command(name = "tender")]
#[command(author, version)]
#[command(about = "Purchase requirements, provider quotations and winner selection")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Enable debug logging on stderr (overridden by TENDER_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// TSV for lists, YAML for single records
    #[default]
    Auto,
    /// Boxed table
    Table,
    Tsv,
    Csv,
    Json,
    Yaml,
    /// Ids only, one per line
    Id,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a tender project in the current directory
    Init(InitArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Manage the product catalog
    #[command(subcommand)]
    Product(ProductCommands),

    /// Manage providers
    #[command(subcommand)]
    Provider(ProviderCommands),

    /// Manage purchase requirements
    #[command(subcommand)]
    Req(ReqCommands),

    /// Manage provider quotations
    #[command(subcommand)]
    Quote(QuoteCommands),

    /// Select the winning quotation of a requirement
    Winner(WinnerArgs),

    /// Show the comparative pricing table of a requirement
    Compare(CompareArgs),

    /// Show the purchase order of a requirement's winning quotation
    Order(OrderArgs),

    /// Show dashboard statistics
    Stats,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
