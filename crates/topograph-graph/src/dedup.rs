//! Content-keyed deduplication of nodes and relationships.
//!
//! Traversals that return paths repeat the same nodes and edges many times.
//! Items are compared by content (labels/type plus coerced properties), not
//! by backend identity, and the first occurrence wins.

use std::collections::HashSet;

use crate::model::{Node, NodeRecord, RelRecord, Relationship, node_to_record, rel_to_record};

/// Canonical identity of a node: sorted labels plus its key-sorted, coerced properties.
pub fn node_key(record: &NodeRecord) -> String {
    let mut labels = record.labels.clone();
    labels.sort();
    canonical(&(labels, &record.props))
}

/// Canonical identity of a relationship: type, endpoints, and coerced properties.
pub fn rel_key(record: &RelRecord) -> String {
    canonical(&(&record.rel_type, &record.start, &record.end, &record.props))
}

// Property maps are BTreeMaps, so the JSON encoding is key-sorted at every level.
fn canonical<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Serialize nodes, keeping the first occurrence of each identity.
pub fn uniq_nodes<'a, I>(nodes: I) -> Vec<NodeRecord>
where
    I: IntoIterator<Item = &'a Node>,
{
    let mut seen = HashSet::new();
    nodes
        .into_iter()
        .map(node_to_record)
        .filter(|record| seen.insert(node_key(record)))
        .collect()
}

/// Serialize relationships, keeping the first occurrence of each identity.
pub fn uniq_rels<'a, I>(rels: I) -> Vec<RelRecord>
where
    I: IntoIterator<Item = &'a Relationship>,
{
    let mut seen = HashSet::new();
    rels.into_iter()
        .map(rel_to_record)
        .filter(|record| seen.insert(rel_key(record)))
        .collect()
}
