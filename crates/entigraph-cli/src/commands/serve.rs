//! Serve command

use clap::Args;

use crate::context::AppContext;
use crate::Cli;

#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind (default from config, 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (default from config, 8000)
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub async fn run(args: &ServeArgs, cli: &Cli) -> anyhow::Result<()> {
    let ctx = AppContext::new(cli)?;

    let mut server = ctx.config.server.clone();
    if let Some(host) = &args.host {
        server.host = host.clone();
    }
    if let Some(port) = args.port {
        server.port = port;
    }

    match ctx.service.health_check().await {
        Ok(true) => tracing::info!("Entity source is reachable"),
        Ok(false) => tracing::warn!("Entity source reported unhealthy"),
        Err(e) => tracing::warn!("Entity source health check failed: {}", e),
    }

    entigraph_server::run_server(ctx.service.clone(), &server).await
}
