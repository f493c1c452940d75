//! Entity and relationship listings

use crate::context::AppContext;
use crate::output::{edges_table, nodes_table, to_json, OutputFormat};
use crate::Cli;

pub async fn run_entities(cli: &Cli) -> anyhow::Result<()> {
    let ctx = AppContext::new(cli)?;
    let entities = ctx.service.entities().await?;
    tracing::info!("Found {} entities", entities.len());

    match OutputFormat::from(cli.format.as_str()) {
        OutputFormat::Json => println!("{}", to_json(&entities)?),
        OutputFormat::Table if entities.is_empty() => println!("No entities found"),
        OutputFormat::Table => {
            if !cli.quiet {
                println!("Entities ({} found):", entities.len());
            }
            println!("{}", nodes_table(&entities));
        }
    }

    Ok(())
}

pub async fn run_relationships(cli: &Cli) -> anyhow::Result<()> {
    let ctx = AppContext::new(cli)?;
    let relationships = ctx.service.relationships().await?;
    tracing::info!("Found {} relationships", relationships.len());

    match OutputFormat::from(cli.format.as_str()) {
        OutputFormat::Json => println!("{}", to_json(&relationships)?),
        OutputFormat::Table if relationships.is_empty() => println!("No relationships found"),
        OutputFormat::Table => {
            if !cli.quiet {
                println!("Relationships ({} found):", relationships.len());
            }
            println!("{}", edges_table(&relationships));
        }
    }

    Ok(())
}
