//! Topology read operations.
//!
//! Every operation validates its tokens, runs fixed templates through a
//! [`crate::GraphBackend`], and assembles a serializable response. None of
//! them keep state between calls, and multi-query operations are not wrapped
//! in a transaction: concurrent writers may be observed between queries.

pub mod context;
pub mod dependencies;
pub mod impact;
pub mod search;
pub mod summary;

use serde::Serialize;

use crate::vocab::Label;

/// Neighbor edges fetched per direction by entity context.
pub const NEIGHBOR_LIMIT: usize = 500;
/// Paths retained by dependency and dependent walks.
pub const PATH_LIMIT: usize = 500;
/// Path rows retained by blast radius.
pub const BLAST_RADIUS_LIMIT: usize = 1000;

/// The anchor an operation was asked about, echoed in responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRef {
    #[serde(rename = "type")]
    pub entity_type: Label,
    pub id: String,
}

impl EntityRef {
    pub fn new(entity_type: Label, id: &str) -> Self {
        Self { entity_type, id: id.to_string() }
    }
}

pub use context::{EntityContext, NeighborSet, Neighbors, entity_context};
pub use dependencies::{DependencyGraph, GraphSlice, dependencies, dependents};
pub use impact::{BUCKET_PRIORITY, BlastRadius, ImpactedNode, blast_radius, bucket_for};
pub use search::{DEFAULT_SEARCH_LABELS, DEFAULT_SEARCH_LIMIT, SearchResults, search_entities};
pub use summary::{Scope, SummaryCounts, TopologySummary, topology_summary};

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::memory::MemoryGraph;
    use crate::value::Value;
    use crate::vocab::{Label, RelType};

    /// checkout -DEPENDS_ON-> payments -USES_DB-> payments-db
    pub struct PaymentsGraph {
        pub graph: MemoryGraph,
        pub checkout: String,
        pub payments: String,
        pub payments_db: String,
    }

    pub fn payments_graph(critical_checkout_edge: bool) -> PaymentsGraph {
        let graph = MemoryGraph::new();
        let checkout = graph.add_node(
            &["Service"],
            [("id", Value::from("checkout")), ("name", Value::from("Checkout"))],
        );
        let payments = graph.add_node(
            &["Service"],
            [("id", Value::from("payments")), ("name", Value::from("Payments"))],
        );
        let payments_db = graph.add_entity(Label::Database, "payments-db");

        let strength = if critical_checkout_edge { "critical" } else { "normal" };
        graph.add_rel(
            &checkout,
            RelType::DependsOn,
            &payments,
            [("strength", Value::from(strength))],
        );
        graph.relate(&payments, RelType::UsesDb, &payments_db);

        PaymentsGraph { graph, checkout, payments, payments_db }
    }
}
