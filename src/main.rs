use clap::Parser;
use miette::Result;
use tender::cli::commands;
use tender::cli::{Cli, Commands};
use tender::core::logging;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let global = &cli.global;
    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Config(cmd) => commands::config::run(cmd, global),
        Commands::Product(cmd) => commands::product::run(cmd, global),
        Commands::Provider(cmd) => commands::provider::run(cmd, global),
        Commands::Req(cmd) => commands::req::run(cmd, global),
        Commands::Quote(cmd) => commands::quote::run(cmd, global),
        Commands::Winner(args) => commands::winner::run(args, global),
        Commands::Compare(args) => commands::compare::run(args, global),
        Commands::Order(args) => commands::order::run(args, global),
        Commands::Stats => commands::stats::run(global),
        Commands::Completions(args) => commands::utils::run_completions(args),
    }
}
