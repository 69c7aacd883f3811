//! Entity context: a node plus its one-hop neighborhood.

use serde::Serialize;
use tracing::debug;

use crate::backend::GraphBackend;
use crate::dedup::{uniq_nodes, uniq_rels};
use crate::error::{TopologyError, TopologyResult};
use crate::model::{NodeRecord, RelRecord, node_to_record};
use crate::query::{Direction, GraphQuery};
use crate::vocab::{Label, sanitize_label};

use super::{EntityRef, NEIGHBOR_LIMIT};

/// Deduplicated neighbors in one direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NeighborSet {
    pub nodes: Vec<NodeRecord>,
    pub rels: Vec<RelRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbors {
    pub outgoing: NeighborSet,
    pub incoming: NeighborSet,
}

/// Result of [`entity_context`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityContext {
    pub entity: EntityRef,
    pub node: NodeRecord,
    pub neighbors: Neighbors,
}

/// Read a node and up to [`NEIGHBOR_LIMIT`] edges in each direction.
///
/// When several nodes share the label and id, the anchor is whichever the
/// backend returns first, while neighbors are gathered for all of them.
/// High-degree nodes are truncated at the limit.
pub async fn entity_context<B>(
    backend: &B,
    entity_type: &str,
    entity_id: &str,
) -> TopologyResult<EntityContext>
where
    B: GraphBackend + ?Sized,
{
    let label = sanitize_label(entity_type)?;

    let anchor = backend
        .run(&GraphQuery::Anchor { label, id: entity_id.to_string() })
        .await?;
    let node = match anchor.first() {
        Some(record) => node_to_record(record.node("n")?),
        None => {
            return Err(TopologyError::not_found(format!(
                "{} with id '{}' not found",
                label, entity_id
            )))
        }
    };

    let outgoing = neighbor_set(backend, label, entity_id, Direction::Outgoing).await?;
    let incoming = neighbor_set(backend, label, entity_id, Direction::Incoming).await?;
    debug!(
        %label,
        id = entity_id,
        outgoing = outgoing.rels.len(),
        incoming = incoming.rels.len(),
        "entity context"
    );

    Ok(EntityContext {
        entity: EntityRef::new(label, entity_id),
        node,
        neighbors: Neighbors { outgoing, incoming },
    })
}

async fn neighbor_set<B>(
    backend: &B,
    label: Label,
    entity_id: &str,
    direction: Direction,
) -> TopologyResult<NeighborSet>
where
    B: GraphBackend + ?Sized,
{
    let rows = backend
        .run(&GraphQuery::Neighbors {
            label,
            id: entity_id.to_string(),
            direction,
            limit: NEIGHBOR_LIMIT,
        })
        .await?;

    let mut nodes = Vec::with_capacity(rows.len());
    let mut rels = Vec::with_capacity(rows.len());
    for row in &rows {
        rels.push(row.relationship("r")?);
        nodes.push(row.node("m")?);
    }

    Ok(NeighborSet { nodes: uniq_nodes(nodes), rels: uniq_rels(rels) })
}
