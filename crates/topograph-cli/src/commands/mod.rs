//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use topograph_graph::{GraphClient, GraphConfig};

pub mod query;
pub mod serve;

/// Topograph - topology and dependency queries over the operations graph
#[derive(Parser)]
#[command(name = "topograph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML file with a [graph] table (NEO4J_* variables still override it)
    #[arg(short, long, global = true, env = "TOPOGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(serve::ServeArgs),

    /// Show an entity and its direct neighbors
    Entity(query::EntityArgs),

    /// Show what an entity depends on
    Deps(query::WalkArgs),

    /// Show what depends on an entity
    Dependents(query::WalkArgs),

    /// Show everything impacted if an entity fails
    Blast(query::BlastArgs),

    /// Search entities by id, name or title
    Search(query::SearchArgs),

    /// Show aggregate counts, global or scoped
    Summary(query::SummaryArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = GraphConfig::load(self.config.as_deref())?;

        match self.command {
            Commands::Serve(args) => serve::execute(args, &config).await,
            Commands::Entity(args) => query::entity(args, &connect(&config).await?).await,
            Commands::Deps(args) => query::deps(args, &connect(&config).await?).await,
            Commands::Dependents(args) => query::dependents(args, &connect(&config).await?).await,
            Commands::Blast(args) => query::blast(args, &connect(&config).await?).await,
            Commands::Search(args) => query::search(args, &connect(&config).await?).await,
            Commands::Summary(args) => query::summary(args, &connect(&config).await?).await,
        }
    }
}

/// Open the pool and fail fast if Neo4j is unreachable.
pub async fn connect(config: &GraphConfig) -> Result<GraphClient> {
    let client = GraphClient::connect(config).await?;
    client.verify().await?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_walk_defaults() {
        let cli = Cli::try_parse_from(["topograph", "deps", "Service", "checkout"]).unwrap();
        match cli.command {
            Commands::Deps(args) => {
                assert_eq!(args.entity_type, "Service");
                assert_eq!(args.entity_id, "checkout");
                assert_eq!(args.depth, 2);
                assert!(!args.json);
            }
            _ => panic!("expected deps"),
        }
    }

    #[test]
    fn test_parse_blast_and_global_config() {
        let cli = Cli::try_parse_from([
            "topograph",
            "blast",
            "database",
            "payments-db",
            "--max-depth",
            "4",
            "--json",
            "--config",
            "topograph.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("topograph.toml")));
        match cli.command {
            Commands::Blast(args) => {
                assert_eq!(args.max_depth, 4);
                assert!(args.json);
            }
            _ => panic!("expected blast"),
        }
    }

    #[test]
    fn test_parse_search_and_summary() {
        let cli =
            Cli::try_parse_from(["topograph", "search", "order", "--type", "Service"]).unwrap();
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.query, "order");
                assert_eq!(args.entity_type.as_deref(), Some("Service"));
                assert_eq!(args.limit, 50);
            }
            _ => panic!("expected search"),
        }

        let cli = Cli::try_parse_from(["topograph", "summary", "--scope", "plant:p1"]).unwrap();
        match cli.command {
            Commands::Summary(args) => assert_eq!(args.scope.as_deref(), Some("plant:p1")),
            _ => panic!("expected summary"),
        }
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["topograph", "serve", "--port", "9000", "--log"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, 9000);
                assert_eq!(args.host, "127.0.0.1");
                assert!(args.log);
                assert!(args.log_file.is_none());
            }
            _ => panic!("expected serve"),
        }
    }
}
