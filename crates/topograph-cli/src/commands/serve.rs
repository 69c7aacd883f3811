//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use topograph_graph::{GraphBackend, GraphConfig};

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "8000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Mirror logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (defaults to ./topograph-serve.log)
    #[arg(long, requires = "log")]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, config: &GraphConfig) -> Result<()> {
    let client = super::connect(config).await?;
    let graph: Arc<dyn GraphBackend> = Arc::new(client);

    println!();
    println!("  {} {}", "Topograph".cyan().bold(), "Web Server".bold());
    println!();
    println!("  {}     {}", "Neo4j".green(), config.uri);
    println!(
        "  {}       http://{}:{}/graph",
        "API".green(),
        args.host,
        args.port
    );
    println!(
        "  {}    http://{}:{}/health",
        "Health".green(),
        args.host,
        args.port
    );
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    topograph_web::run_server(graph, &args.host, args.port).await?;

    Ok(())
}
