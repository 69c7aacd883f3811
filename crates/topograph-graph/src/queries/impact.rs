//! Blast-radius analysis.
//!
//! Walks dependency edges backwards from a seed to find everything that
//! transitively depends on it, and flags entities reachable through at least
//! one `strength: "critical"` edge.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::backend::GraphBackend;
use crate::dedup::node_key;
use crate::error::TopologyResult;
use crate::model::{NodeRecord, node_to_record};
use crate::query::GraphQuery;
use crate::vocab::{Label, sanitize_label, validate_depth};

use super::{BLAST_RADIUS_LIMIT, EntityRef};

/// Summary buckets, in priority order. Nodes matching none fall into "Other".
pub const BUCKET_PRIORITY: [Label; 8] = [
    Label::Service,
    Label::Machine,
    Label::Line,
    Label::Plant,
    Label::Database,
    Label::Api,
    Label::Server,
    Label::Topic,
];

/// An entity affected by the seed failing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactedNode {
    #[serde(flatten)]
    pub node: NodeRecord,
    pub critical_impacted: bool,
}

/// Result of [`blast_radius`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlastRadius {
    pub entity: EntityRef,
    pub max_depth: u32,
    pub summary: BTreeMap<String, usize>,
    pub impacted: Vec<ImpactedNode>,
}

/// Bucket for a label set: the first [`BUCKET_PRIORITY`] label present.
pub fn bucket_for(labels: &[String]) -> &'static str {
    BUCKET_PRIORITY
        .iter()
        .find(|bucket| labels.iter().any(|l| l == bucket.as_str()))
        .map(|bucket| bucket.as_str())
        .unwrap_or("Other")
}

/// Entities that transitively depend on the seed, up to `max_depth` hops.
///
/// The backend groups paths by their farthest node before the
/// [`BLAST_RADIUS_LIMIT`] cap applies, so the cap counts impacted nodes and
/// every path still contributes to the flags. A node is `critical_impacted`
/// when any path reaching it crosses a critical edge. Rows are grouped again
/// by node content, since duplicate anchors can surface one node twice.
pub async fn blast_radius<B>(
    backend: &B,
    entity_type: &str,
    entity_id: &str,
    max_depth: u32,
) -> TopologyResult<BlastRadius>
where
    B: GraphBackend + ?Sized,
{
    let max_depth = validate_depth(max_depth)?;
    let label = sanitize_label(entity_type)?;

    let rows = backend
        .run(&GraphQuery::BlastRadius {
            label,
            id: entity_id.to_string(),
            depth: max_depth,
            limit: BLAST_RADIUS_LIMIT,
        })
        .await?;

    // node identity -> position in `impacted`
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut impacted: Vec<ImpactedNode> = Vec::new();

    for row in &rows {
        let node = node_to_record(row.node("impacted")?);
        let critical = row.count("critical")? > 0;
        let key = node_key(&node);

        match index.get(&key) {
            Some(&i) => impacted[i].critical_impacted |= critical,
            None => {
                index.insert(key, impacted.len());
                impacted.push(ImpactedNode { node, critical_impacted: critical });
            }
        }
    }
    impacted.truncate(BLAST_RADIUS_LIMIT);

    let mut summary = BTreeMap::new();
    for item in &impacted {
        *summary.entry(bucket_for(&item.node.labels).to_string()).or_insert(0) += 1;
    }

    debug!(
        %label,
        id = entity_id,
        max_depth,
        rows = rows.len(),
        impacted = impacted.len(),
        "blast radius"
    );

    Ok(BlastRadius {
        entity: EntityRef::new(label, entity_id),
        max_depth,
        summary,
        impacted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TopologyError;
    use crate::memory::MemoryGraph;
    use crate::queries::fixtures::payments_graph;
    use crate::value::Value;
    use crate::vocab::RelType;

    fn labels(ls: &[&str]) -> Vec<String> {
        ls.iter().map(|l| l.to_string()).collect()
    }

    fn flag(result: &BlastRadius, id: &str) -> Option<bool> {
        result
            .impacted
            .iter()
            .find(|n| n.node.props["id"] == Value::from(id))
            .map(|n| n.critical_impacted)
    }

    #[test]
    fn test_bucket_priority() {
        assert_eq!(bucket_for(&labels(&["Service", "Internal"])), "Service");
        assert_eq!(bucket_for(&labels(&["Database", "Service"])), "Service");
        assert_eq!(bucket_for(&labels(&["Topic", "Server"])), "Server");
        assert_eq!(bucket_for(&labels(&["API"])), "API");
        assert_eq!(bucket_for(&labels(&["Gizmo"])), "Other");
        assert_eq!(bucket_for(&[]), "Other");
    }

    #[tokio::test]
    async fn test_blast_radius_criticality() {
        let fx = payments_graph(true);
        let result = blast_radius(&fx.graph, "Database", "payments-db", 2).await.unwrap();

        assert_eq!(result.impacted.len(), 2);
        assert_eq!(flag(&result, "payments"), Some(false));
        assert_eq!(flag(&result, "checkout"), Some(true));
        assert_eq!(result.summary.get("Service"), Some(&2));
        assert_eq!(result.max_depth, 2);
    }

    #[tokio::test]
    async fn test_blast_radius_depth_filter() {
        let fx = payments_graph(true);
        let result = blast_radius(&fx.graph, "Database", "payments-db", 1).await.unwrap();

        assert_eq!(result.impacted.len(), 1);
        assert_eq!(flag(&result, "payments"), Some(false));
        assert_eq!(flag(&result, "checkout"), None);
    }

    #[tokio::test]
    async fn test_critical_flag_is_or_across_paths() {
        // web reaches db directly (normal) and via cache (critical).
        let g = MemoryGraph::new();
        let db = g.add_entity(Label::Database, "db");
        let cache = g.add_entity(Label::Service, "cache");
        let web = g.add_entity(Label::Service, "web");
        g.relate(&web, RelType::UsesDb, &db);
        g.relate(&cache, RelType::UsesDb, &db);
        g.add_rel(&web, RelType::DependsOn, &cache, [("strength", Value::from("critical"))]);

        let result = blast_radius(&g, "Database", "db", 3).await.unwrap();
        assert_eq!(result.impacted.len(), 2);
        assert_eq!(flag(&result, "web"), Some(true));
        assert_eq!(flag(&result, "cache"), Some(false));
    }

    #[tokio::test]
    async fn test_summary_buckets_other() {
        let g = MemoryGraph::new();
        let topic = g.add_entity(Label::Topic, "orders");
        let producer = g.add_entity(Label::Service, "producer");
        let gizmo = g.add_node(&["Gizmo"], [("id", Value::from("g-1"))]);
        g.relate(&producer, RelType::PublishesTo, &topic);
        g.relate(&gizmo, RelType::ConsumesFrom, &topic);

        let result = blast_radius(&g, "Topic", "orders", 1).await.unwrap();
        assert_eq!(result.summary.get("Service"), Some(&1));
        assert_eq!(result.summary.get("Other"), Some(&1));
        assert!(result.impacted.iter().all(|n| !n.critical_impacted));
    }

    #[tokio::test]
    async fn test_seed_is_not_its_own_dependent() {
        let g = MemoryGraph::new();
        let a = g.add_entity(Label::Service, "a");
        let b = g.add_entity(Label::Service, "b");
        g.relate(&a, RelType::DependsOn, &b);
        g.relate(&b, RelType::DependsOn, &a);

        let result = blast_radius(&g, "Service", "a", 4).await.unwrap();
        assert_eq!(result.impacted.len(), 1);
        assert_eq!(flag(&result, "b"), Some(false));
    }

    #[tokio::test]
    async fn test_blast_radius_validation() {
        let fx = payments_graph(false);
        assert!(matches!(
            blast_radius(&fx.graph, "Database", "payments-db", 0).await,
            Err(TopologyError::Validation(_))
        ));
        assert!(matches!(
            blast_radius(&fx.graph, "Tablespace", "payments-db", 2).await,
            Err(TopologyError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_parallel_paths_do_not_hide_critical_dependents() {
        let g = MemoryGraph::new();
        let db = g.add_entity(Label::Database, "db");
        let web = g.add_entity(Label::Service, "web");
        let filler = g.add_entity(Label::Service, "filler");
        let cache = g.add_entity(Label::Service, "cache");
        g.relate(&web, RelType::UsesDb, &db);
        for _ in 0..BLAST_RADIUS_LIMIT {
            g.relate(&filler, RelType::UsesDb, &db);
        }
        g.relate(&cache, RelType::UsesDb, &db);
        g.add_rel(&web, RelType::DependsOn, &cache, [("strength", Value::from("critical"))]);

        let result = blast_radius(&g, "Database", "db", 2).await.unwrap();
        assert_eq!(result.impacted.len(), 3);
        assert_eq!(flag(&result, "web"), Some(true));
        assert_eq!(flag(&result, "filler"), Some(false));
        assert_eq!(flag(&result, "cache"), Some(false));
    }

    #[tokio::test]
    async fn test_cap_counts_impacted_nodes() {
        let g = MemoryGraph::new();
        let db = g.add_entity(Label::Database, "db");
        let web = g.add_entity(Label::Service, "web");
        g.relate(&web, RelType::UsesDb, &db);
        let mut others = Vec::new();
        for i in 0..(BLAST_RADIUS_LIMIT + 5) {
            let svc = g.add_entity(Label::Service, &format!("svc-{i}"));
            g.relate(&svc, RelType::UsesDb, &db);
            others.push(svc);
        }
        // Discovered after every 1-hop path.
        g.add_rel(&web, RelType::DependsOn, &others[0], [("strength", Value::from("critical"))]);

        let result = blast_radius(&g, "Database", "db", 2).await.unwrap();
        assert_eq!(result.impacted.len(), BLAST_RADIUS_LIMIT);
        assert_eq!(result.summary.get("Service"), Some(&BLAST_RADIUS_LIMIT));
        assert_eq!(flag(&result, "web"), Some(true));
        assert_eq!(flag(&result, "svc-0"), Some(false));
    }

    #[test]
    fn test_impacted_serializes_flat() {
        let item = ImpactedNode {
            node: NodeRecord { labels: labels(&["Service"]), props: BTreeMap::new() },
            critical_impacted: true,
        };
        let json = serde_json::to_value(item).unwrap();
        assert_eq!(json["labels"][0], "Service");
        assert_eq!(json["critical_impacted"], true);
    }
}
