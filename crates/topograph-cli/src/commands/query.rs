//! Read-only topology query commands.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use topograph_graph::GraphBackend;
use topograph_graph::queries::{self, DEFAULT_SEARCH_LIMIT};

use crate::output;

#[derive(Args)]
pub struct EntityArgs {
    /// Entity label (Service, Machine, Database, ...)
    pub entity_type: String,
    /// Value of the entity's id property
    pub entity_id: String,
    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct WalkArgs {
    /// Entity label
    pub entity_type: String,
    /// Value of the entity's id property
    pub entity_id: String,
    /// Traversal depth (1-4)
    #[arg(long, default_value = "2")]
    pub depth: u32,
    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct BlastArgs {
    /// Entity label
    pub entity_type: String,
    /// Value of the entity's id property
    pub entity_id: String,
    /// Maximum traversal depth (1-4)
    #[arg(long, default_value = "3")]
    pub max_depth: u32,
    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Case-insensitive substring of id, name or title
    pub query: String,
    /// Restrict to one label
    #[arg(long = "type")]
    pub entity_type: Option<String>,
    /// Maximum number of results
    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub limit: usize,
    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct SummaryArgs {
    /// plant:<id> or service:<id>; omit for global counts
    #[arg(long)]
    pub scope: Option<String>,
    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn entity<B: GraphBackend + ?Sized>(args: EntityArgs, graph: &B) -> Result<()> {
    let ctx = queries::entity_context(graph, &args.entity_type, &args.entity_id).await?;
    if args.json {
        return print_json(&ctx);
    }
    output::print_entity_context(&ctx);
    Ok(())
}

pub async fn deps<B: GraphBackend + ?Sized>(args: WalkArgs, graph: &B) -> Result<()> {
    let result =
        queries::dependencies(graph, &args.entity_type, &args.entity_id, args.depth).await?;
    if args.json {
        return print_json(&result);
    }
    output::print_dependency_graph(&result, "Dependencies of");
    Ok(())
}

pub async fn dependents<B: GraphBackend + ?Sized>(args: WalkArgs, graph: &B) -> Result<()> {
    let result =
        queries::dependents(graph, &args.entity_type, &args.entity_id, args.depth).await?;
    if args.json {
        return print_json(&result);
    }
    output::print_dependency_graph(&result, "Dependents of");
    Ok(())
}

pub async fn blast<B: GraphBackend + ?Sized>(args: BlastArgs, graph: &B) -> Result<()> {
    let result =
        queries::blast_radius(graph, &args.entity_type, &args.entity_id, args.max_depth).await?;
    if args.json {
        return print_json(&result);
    }
    output::print_blast_radius(&result);
    Ok(())
}

pub async fn search<B: GraphBackend + ?Sized>(args: SearchArgs, graph: &B) -> Result<()> {
    let results = queries::search_entities(
        graph,
        &args.query,
        args.entity_type.as_deref(),
        args.limit,
    )
    .await?;
    if args.json {
        return print_json(&results);
    }
    output::print_search_results(&results);
    Ok(())
}

pub async fn summary<B: GraphBackend + ?Sized>(args: SummaryArgs, graph: &B) -> Result<()> {
    let result = queries::topology_summary(graph, args.scope.as_deref()).await?;
    if args.json {
        return print_json(&result);
    }
    output::print_summary(&result);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use topograph_graph::{Label, MemoryGraph, RelType};

    fn graph() -> MemoryGraph {
        let g = MemoryGraph::new();
        let checkout = g.add_entity(Label::Service, "checkout");
        let payments = g.add_entity(Label::Service, "payments");
        g.relate(&checkout, RelType::DependsOn, &payments);
        g
    }

    #[tokio::test]
    async fn test_commands_render_against_memory_graph() {
        let g = graph();
        let walk = |json| WalkArgs {
            entity_type: "Service".into(),
            entity_id: "checkout".into(),
            depth: 1,
            json,
        };
        deps(walk(false), &g).await.unwrap();
        deps(walk(true), &g).await.unwrap();

        summary(SummaryArgs { scope: Some("service:checkout".into()), json: false }, &g)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_command_errors_propagate() {
        let g = graph();
        let err = entity(
            EntityArgs { entity_type: "Service".into(), entity_id: "ghost".into(), json: false },
            &g,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("ghost"));

        let err = blast(
            BlastArgs {
                entity_type: "Widget".into(),
                entity_id: "x".into(),
                max_depth: 3,
                json: true,
            },
            &g,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Widget"));
    }
}
