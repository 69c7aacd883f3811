//! Read query templates.
//!
//! Each [`GraphQuery`] variant is a fixed Cypher template. Structural tokens
//! (labels, relationship types, hop bounds) come only from the vocabulary
//! enums and engine constants; everything else is bound as a parameter.
//! Backends either render the template ([`GraphQuery::cypher`]) or evaluate
//! the description directly, as [`crate::MemoryGraph`] does.

use crate::vocab::{Label, MAX_DEPTH, RelType};

/// Traversal direction relative to the anchor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// A bound query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Str(String),
    Int(i64),
    StrList(Vec<String>),
}

/// The engine's read queries.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphQuery {
    /// First node with the given label and business key. Column: `n`.
    Anchor { label: Label, id: String },
    /// One-hop edges of the anchor restricted to the full relationship
    /// vocabulary. Columns: `r`, `m`.
    Neighbors {
        label: Label,
        id: String,
        direction: Direction,
        limit: usize,
    },
    /// Dependency paths from the anchor. The pattern always spans
    /// `1..MAX_DEPTH` hops; `depth` filters path length. Column: `p`.
    DependencyPaths {
        label: Label,
        id: String,
        direction: Direction,
        depth: u32,
        limit: usize,
    },
    /// Nodes that reach the anchor over incoming dependency paths of at most
    /// `depth` hops, one row per node. `critical` is 1 when any such path
    /// crosses a critical edge. Grouping happens before `limit` applies.
    /// Columns: `impacted`, `critical`.
    BlastRadius {
        label: Label,
        id: String,
        depth: u32,
        limit: usize,
    },
    /// Case-insensitive substring match on `id`, `name`, `title`. Column: `n`.
    Search {
        label: Label,
        needle: String,
        limit: usize,
    },
    /// Columns: `plants`, `services`, `incidents`.
    GlobalCounts,
    /// Plant hierarchy counts; no row when the plant is absent.
    /// Columns: `lines`, `machines`, `incidents`.
    PlantSummary { id: String },
    /// Distinct nodes reachable from a service over dependency edges.
    /// Column: `reached`.
    ServiceReach { id: String, direction: Direction },
}

/// `usize` limits above `i64::MAX` saturate rather than wrap negative.
fn limit_param(limit: usize) -> Param {
    Param::Int(i64::try_from(limit).unwrap_or(i64::MAX))
}

impl GraphQuery {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            GraphQuery::Anchor { .. } => "anchor",
            GraphQuery::Neighbors { .. } => "neighbors",
            GraphQuery::DependencyPaths { .. } => "dependency_paths",
            GraphQuery::BlastRadius { .. } => "blast_radius",
            GraphQuery::Search { .. } => "search",
            GraphQuery::GlobalCounts => "global_counts",
            GraphQuery::PlantSummary { .. } => "plant_summary",
            GraphQuery::ServiceReach { .. } => "service_reach",
        }
    }

    /// Result columns, in order.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            GraphQuery::Anchor { .. } | GraphQuery::Search { .. } => &["n"],
            GraphQuery::Neighbors { .. } => &["r", "m"],
            GraphQuery::DependencyPaths { .. } => &["p"],
            GraphQuery::BlastRadius { .. } => &["impacted", "critical"],
            GraphQuery::GlobalCounts => &["plants", "services", "incidents"],
            GraphQuery::PlantSummary { .. } => &["lines", "machines", "incidents"],
            GraphQuery::ServiceReach { .. } => &["reached"],
        }
    }

    /// Cypher text for this query.
    pub fn cypher(&self) -> String {
        let deps = RelType::pattern(&RelType::DEPENDENCY);
        match self {
            GraphQuery::Anchor { label, .. } => format!(
                "MATCH (n:{label} {{id: $id}})
                 RETURN n
                 LIMIT 1"
            ),
            GraphQuery::Neighbors { label, direction: Direction::Outgoing, .. } => format!(
                "MATCH (n:{label} {{id: $id}})-[r]->(m)
                 WHERE type(r) IN $rels
                 RETURN r, m
                 LIMIT $limit"
            ),
            GraphQuery::Neighbors { label, direction: Direction::Incoming, .. } => format!(
                "MATCH (m)-[r]->(n:{label} {{id: $id}})
                 WHERE type(r) IN $rels
                 RETURN r, m
                 LIMIT $limit"
            ),
            GraphQuery::DependencyPaths { label, direction, .. } => {
                let hop = match direction {
                    Direction::Outgoing => format!("-[:{deps}*1..{MAX_DEPTH}]->"),
                    Direction::Incoming => format!("<-[:{deps}*1..{MAX_DEPTH}]-"),
                };
                format!(
                    "MATCH p = (n:{label} {{id: $id}}){hop}(m)
                     WHERE length(p) <= $depth
                     RETURN p
                     LIMIT $limit"
                )
            }
            GraphQuery::BlastRadius { label, .. } => format!(
                "MATCH p = (seed:{label} {{id: $id}})<-[:{deps}*1..{MAX_DEPTH}]-(impacted)
                 WHERE length(p) <= $depth AND impacted <> seed
                 WITH impacted,
                      any(r IN relationships(p)
                          WHERE coalesce(r.strength, 'normal') = 'critical') AS crit
                 RETURN impacted, max(CASE WHEN crit THEN 1 ELSE 0 END) AS critical
                 LIMIT $limit"
            ),
            GraphQuery::Search { label, .. } => format!(
                "MATCH (n:{label})
                 WHERE toLower(coalesce(n.id, '')) CONTAINS $q
                    OR toLower(coalesce(n.name, '')) CONTAINS $q
                    OR toLower(coalesce(n.title, '')) CONTAINS $q
                 RETURN n
                 LIMIT $limit"
            ),
            GraphQuery::GlobalCounts => format!(
                "CALL {{ MATCH (p:{plant}) RETURN count(p) AS plants }}
                 CALL {{ MATCH (s:{service}) RETURN count(s) AS services }}
                 CALL {{ MATCH (i:{incident}) RETURN count(i) AS incidents }}
                 RETURN plants, services, incidents",
                plant = Label::Plant,
                service = Label::Service,
                incident = Label::Incident,
            ),
            GraphQuery::PlantSummary { .. } => format!(
                "MATCH (p:{plant} {{id: $id}})
                 OPTIONAL MATCH (p)-[:{has_line}]->(l:{line})
                 OPTIONAL MATCH (l)-[:{has_machine}]->(m:{machine})
                 WITH p, collect(DISTINCT l) AS lines, collect(DISTINCT m) AS machines
                 OPTIONAL MATCH (i:{incident})-[:{affects}]->(x)
                 WHERE x IN machines OR x IN lines OR x = p
                 RETURN size(lines) AS lines, size(machines) AS machines,
                        count(DISTINCT i) AS incidents",
                plant = Label::Plant,
                line = Label::Line,
                machine = Label::Machine,
                incident = Label::Incident,
                has_line = RelType::HasLine,
                has_machine = RelType::HasMachine,
                affects = RelType::Affects,
            ),
            GraphQuery::ServiceReach { direction, .. } => {
                let hop = match direction {
                    Direction::Outgoing => format!("-[:{deps}*1..{MAX_DEPTH}]->"),
                    Direction::Incoming => format!("<-[:{deps}*1..{MAX_DEPTH}]-"),
                };
                format!(
                    "MATCH (s:{service} {{id: $id}}){hop}(x)
                     WHERE x <> s
                     RETURN count(DISTINCT x) AS reached",
                    service = Label::Service,
                )
            }
        }
    }

    /// Bound parameters for [`GraphQuery::cypher`].
    pub fn params(&self) -> Vec<(&'static str, Param)> {
        match self {
            GraphQuery::Anchor { id, .. } => vec![("id", Param::Str(id.clone()))],
            GraphQuery::Neighbors { id, limit, .. } => vec![
                ("id", Param::Str(id.clone())),
                (
                    "rels",
                    Param::StrList(RelType::ALL.iter().map(|r| r.as_str().to_string()).collect()),
                ),
                ("limit", limit_param(*limit)),
            ],
            GraphQuery::DependencyPaths { id, depth, limit, .. }
            | GraphQuery::BlastRadius { id, depth, limit, .. } => vec![
                ("id", Param::Str(id.clone())),
                ("depth", Param::Int(i64::from(*depth))),
                ("limit", limit_param(*limit)),
            ],
            GraphQuery::Search { needle, limit, .. } => vec![
                ("q", Param::Str(needle.to_lowercase())),
                ("limit", limit_param(*limit)),
            ],
            GraphQuery::GlobalCounts => Vec::new(),
            GraphQuery::PlantSummary { id } | GraphQuery::ServiceReach { id, .. } => {
                vec![("id", Param::Str(id.clone()))]
            }
        }
    }
}
