//! Shared entity command infrastructure
//!
//! Creation and show output common to products, providers and requirements.

use console::style;
use miette::Result;

use crate::cli::output::print_serialized;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;

// =========================================================================
// Common New Output
// =========================================================================

/// Report a newly created entity in the requested format
pub fn output_new_entity<E: Entity>(
    entity: &E,
    entity_name: &str,
    extra_info: Option<&str>,
    global: &GlobalOpts,
) -> Result<()> {
    match global.format {
        OutputFormat::Id => println!("{}", entity.id()),
        OutputFormat::Json | OutputFormat::Yaml => {
            print_serialized(entity, global.format)?;
        }
        _ => {
            println!(
                "{} Created {} {}",
                style("✓").green(),
                entity_name,
                style(entity.id()).cyan()
            );
            match extra_info {
                Some(info) => println!("   {}", info),
                None => println!("   {}", style(entity.title()).yellow()),
            }
        }
    }
    Ok(())
}

/// Report an updated entity in the requested format
pub fn output_updated_entity<E: Entity>(
    entity: &E,
    entity_name: &str,
    global: &GlobalOpts,
) -> Result<()> {
    match global.format {
        OutputFormat::Id => println!("{}", entity.id()),
        OutputFormat::Json | OutputFormat::Yaml => {
            print_serialized(entity, global.format)?;
        }
        _ => println!(
            "{} Updated {} {}",
            style("✓").green(),
            entity_name,
            style(entity.id()).cyan()
        ),
    }
    Ok(())
}

// =========================================================================
// Common Show
// =========================================================================

/// Show an entity: serialized for JSON/YAML, its id for `id`, otherwise
/// the entity-specific pretty printer
pub fn show_entity<E: Entity>(
    entity: &E,
    global: &GlobalOpts,
    pretty: impl FnOnce(&E),
) -> Result<()> {
    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => {
            print_serialized(entity, global.format)?;
        }
        OutputFormat::Id => println!("{}", entity.id()),
        _ => pretty(entity),
    }
    Ok(())
}

/// Footer line with the record's creation time
pub fn print_created_footer<E: Entity>(entity: &E, author: Option<&str>) {
    crate::cli::helpers::print_rule();
    match author {
        Some(author) => println!(
            "{}: {} | {}: {}",
            style("Author").dim(),
            author,
            style("Created").dim(),
            entity.created().format("%Y-%m-%d %H:%M")
        ),
        None => println!(
            "{}: {}",
            style("Created").dim(),
            entity.created().format("%Y-%m-%d %H:%M")
        ),
    }
}
