//! Dependency and dependent walks over runtime-dependency edges.

use serde::Serialize;
use tracing::debug;

use crate::backend::GraphBackend;
use crate::dedup::{uniq_nodes, uniq_rels};
use crate::error::TopologyResult;
use crate::model::{NodeRecord, Path, RelRecord};
use crate::query::{Direction, GraphQuery};
use crate::vocab::{Label, sanitize_label, validate_depth};

use super::{EntityRef, PATH_LIMIT};

/// Flattened, deduplicated nodes and relationships.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphSlice {
    pub nodes: Vec<NodeRecord>,
    pub rels: Vec<RelRecord>,
}

/// Result of [`dependencies`] and [`dependents`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyGraph {
    pub entity: EntityRef,
    pub depth: u32,
    pub graph: GraphSlice,
}

/// What the entity depends on, up to `depth` hops.
pub async fn dependencies<B>(
    backend: &B,
    entity_type: &str,
    entity_id: &str,
    depth: u32,
) -> TopologyResult<DependencyGraph>
where
    B: GraphBackend + ?Sized,
{
    walk(backend, entity_type, entity_id, depth, Direction::Outgoing).await
}

/// What depends on the entity, up to `depth` hops.
pub async fn dependents<B>(
    backend: &B,
    entity_type: &str,
    entity_id: &str,
    depth: u32,
) -> TopologyResult<DependencyGraph>
where
    B: GraphBackend + ?Sized,
{
    walk(backend, entity_type, entity_id, depth, Direction::Incoming).await
}

/// Fetch dependency paths of at most `depth` hops from the anchor.
///
/// The traversal itself always spans `1..MAX_DEPTH`; `depth` only filters the
/// resulting paths.
async fn dependency_paths<B>(
    backend: &B,
    label: Label,
    entity_id: &str,
    depth: u32,
    direction: Direction,
    limit: usize,
) -> TopologyResult<Vec<Path>>
where
    B: GraphBackend + ?Sized,
{
    let rows = backend
        .run(&GraphQuery::DependencyPaths {
            label,
            id: entity_id.to_string(),
            direction,
            depth,
            limit,
        })
        .await?;

    let mut paths = Vec::with_capacity(rows.len());
    for row in &rows {
        let path = row.path("p")?;
        if path.len() as u32 <= depth {
            paths.push(path.clone());
        }
    }
    paths.truncate(limit);
    Ok(paths)
}

async fn walk<B>(
    backend: &B,
    entity_type: &str,
    entity_id: &str,
    depth: u32,
    direction: Direction,
) -> TopologyResult<DependencyGraph>
where
    B: GraphBackend + ?Sized,
{
    let depth = validate_depth(depth)?;
    let label = sanitize_label(entity_type)?;

    let paths = dependency_paths(backend, label, entity_id, depth, direction, PATH_LIMIT).await?;
    debug!(%label, id = entity_id, depth, ?direction, paths = paths.len(), "dependency walk");

    // Every path starts at the anchor; it is reported in `entity`, not among the results.
    let nodes = paths.iter().flat_map(|p| {
        let anchor_id = p.start().map(|n| n.element_id.as_str());
        p.nodes
            .iter()
            .filter(move |n| Some(n.element_id.as_str()) != anchor_id)
    });
    let rels = paths.iter().flat_map(|p| p.relationships.iter());

    Ok(DependencyGraph {
        entity: EntityRef::new(label, entity_id),
        depth,
        graph: GraphSlice { nodes: uniq_nodes(nodes), rels: uniq_rels(rels) },
    })
}
