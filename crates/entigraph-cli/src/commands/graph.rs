//! Graph command

use clap::Args;
use entigraph_core::{positive_limit, EntityGraph, FilterPolicy};
use entigraph_server::handlers::GraphResponse;

use crate::context::AppContext;
use crate::output::{edges_table, nodes_table, to_json, OutputFormat};
use crate::Cli;

/// Filter options shared by `graph` and `export`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Filter mode: core_custom (default), business, custom, all
    #[arg(long)]
    pub filter_mode: Option<String>,

    /// Comma separated prefixes (core_custom only), e.g. qrt_,msdyn_
    #[arg(long)]
    pub prefixes: Option<String>,

    /// Keep at most this many entities (ignored unless positive)
    #[arg(short, long)]
    pub limit: Option<i64>,
}

impl FilterArgs {
    pub fn policy(&self) -> entigraph_core::Result<FilterPolicy> {
        FilterPolicy::parse(self.filter_mode.as_deref(), self.prefixes.as_deref())
    }

    /// Validate the filter, then assemble the graph
    pub async fn assemble(&self, ctx: &AppContext) -> anyhow::Result<(FilterPolicy, EntityGraph)> {
        let policy = self.policy()?;
        let graph = ctx.service.graph(&policy, positive_limit(self.limit)).await?;
        Ok((policy, graph))
    }
}

#[derive(Args)]
pub struct GraphArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

pub async fn run(args: &GraphArgs, cli: &Cli) -> anyhow::Result<()> {
    // Reject a bad filter before building the source
    args.filter.policy()?;

    let ctx = AppContext::new(cli)?;
    let (policy, graph) = args.filter.assemble(&ctx).await?;

    match OutputFormat::from(cli.format.as_str()) {
        OutputFormat::Json => println!("{}", to_json(&GraphResponse::from(graph))?),
        OutputFormat::Table => {
            if !cli.quiet {
                println!(
                    "Graph ({}): {} entities, {} relationships",
                    policy,
                    graph.node_count(),
                    graph.edge_count()
                );
                println!();
            }
            println!("{}", nodes_table(&graph.nodes));
            if !graph.edges.is_empty() {
                println!();
                println!("{}", edges_table(&graph.edges));
            }
        }
    }

    Ok(())
}
