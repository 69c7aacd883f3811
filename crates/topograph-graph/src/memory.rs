//! In-memory graph backend.
//!
//! Evaluates [`GraphQuery`] descriptions directly against nodes and
//! relationships held in process, following the same matching rules as the
//! Cypher templates: variable-length patterns never reuse a relationship
//! within one path, every node matching an anchor pattern is expanded, and
//! row limits apply after filtering. Used by tests and offline demos.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::backend::GraphBackend;
use crate::error::TopologyResult;
use crate::model::{Cell, Node, Path, Record, Relationship};
use crate::query::{Direction, GraphQuery};
use crate::value::Value;
use crate::vocab::{Label, MAX_DEPTH, RelType};

#[derive(Debug, Default)]
struct GraphData {
    nodes: Vec<Node>,
    rels: Vec<Relationship>,
    next_id: u64,
}

/// A graph held in memory that answers engine queries.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    data: RwLock<GraphData>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node and return its element id.
    pub fn add_node<'a, I>(&self, labels: &[&str], props: I) -> String
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.next_id += 1;
        let element_id = format!("n{}", data.next_id);
        data.nodes.push(Node {
            element_id: element_id.clone(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties: props.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        });
        element_id
    }

    /// Insert a node carrying only a label and business key.
    pub fn add_entity(&self, label: Label, id: &str) -> String {
        self.add_node(&[label.as_str()], [("id", Value::from(id))])
    }

    /// Insert a relationship between two element ids and return its element id.
    pub fn add_rel<'a, I>(&self, start: &str, rel_type: RelType, end: &str, props: I) -> String
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.next_id += 1;
        let element_id = format!("r{}", data.next_id);
        data.rels.push(Relationship {
            element_id: element_id.clone(),
            rel_type: rel_type.as_str().to_string(),
            start_id: start.to_string(),
            end_id: end.to_string(),
            properties: props.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        });
        element_id
    }

    /// Insert a relationship without properties.
    pub fn relate(&self, start: &str, rel_type: RelType, end: &str) -> String {
        self.add_rel(start, rel_type, end, [])
    }
}

impl GraphData {
    fn node(&self, element_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.element_id == element_id)
    }

    fn anchors<'a>(&'a self, label: Label, id: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.has_label(label.as_str()) && n.prop_str("id") == Some(id))
    }

    fn count_label(&self, label: Label) -> i64 {
        self.nodes.iter().filter(|n| n.has_label(label.as_str())).count() as i64
    }

    /// Edges leaving `node_id` in `direction`, paired with the node on the far side.
    fn hops<'a>(
        &'a self,
        node_id: &'a str,
        direction: Direction,
    ) -> impl Iterator<Item = (&'a Relationship, &'a Node)> + 'a {
        self.rels.iter().filter_map(move |rel| {
            let far = match direction {
                Direction::Outgoing if rel.start_id == node_id => &rel.end_id,
                Direction::Incoming if rel.end_id == node_id => &rel.start_id,
                _ => return None,
            };
            self.node(far).map(|n| (rel, n))
        })
    }

    /// Every dependency path of 1..=MAX_DEPTH hops from `anchor`, depth-first.
    fn dependency_paths(&self, anchor: &Node, direction: Direction) -> Vec<Path> {
        let mut out = Vec::new();
        let start = Path { nodes: vec![anchor.clone()], relationships: Vec::new() };
        self.extend_paths(start, direction, &mut out);
        out
    }

    fn extend_paths(&self, path: Path, direction: Direction, out: &mut Vec<Path>) {
        if path.len() as u32 >= MAX_DEPTH {
            return;
        }
        let Some(tip) = path.end() else { return };
        for (rel, next) in self.hops(&tip.element_id, direction) {
            let is_dep = RelType::DEPENDENCY.iter().any(|t| t.as_str() == rel.rel_type);
            let reused = path.relationships.iter().any(|r| r.element_id == rel.element_id);
            if !is_dep || reused {
                continue;
            }
            let mut longer = path.clone();
            longer.relationships.push(rel.clone());
            longer.nodes.push(next.clone());
            out.push(longer.clone());
            self.extend_paths(longer, direction, out);
        }
    }

    /// Group incoming dependency paths of at most `depth` hops by their far
    /// node, ORing the critical flag. Appends to `grouped` in first-seen order.
    fn impacted(&self, anchor: &Node, depth: u32, grouped: &mut Vec<(String, bool)>) {
        let mut index: HashMap<String, usize> = grouped
            .iter()
            .enumerate()
            .map(|(i, (id, _))| (id.clone(), i))
            .collect();

        for path in self.dependency_paths(anchor, Direction::Incoming) {
            if path.len() as u32 > depth {
                continue;
            }
            let Some(far) = path.end() else { continue };
            if far.element_id == anchor.element_id {
                continue;
            }
            let critical = path.relationships.iter().any(|r| r.is_critical());
            match index.get(&far.element_id) {
                Some(&i) => grouped[i].1 |= critical,
                None => {
                    index.insert(far.element_id.clone(), grouped.len());
                    grouped.push((far.element_id.clone(), critical));
                }
            }
        }
    }

    fn matches_search(node: &Node, needle: &str) -> bool {
        ["id", "name", "title"].iter().any(|key| {
            node.prop_str(key)
                .unwrap_or("")
                .to_lowercase()
                .contains(needle)
        })
    }

    /// Distinct `label` children of `parents` over `rel`, in first-seen order.
    fn children(&self, parents: &[&Node], rel: RelType, label: Label) -> Vec<String> {
        let mut seen = Vec::new();
        for parent in parents {
            for (r, child) in self.hops(&parent.element_id, Direction::Outgoing) {
                if r.rel_type == rel.as_str()
                    && child.has_label(label.as_str())
                    && !seen.contains(&child.element_id)
                {
                    seen.push(child.element_id.clone());
                }
            }
        }
        seen
    }

    fn plant_summary(&self, plant: &Node) -> Record {
        let lines = self.children(&[plant], RelType::HasLine, Label::Line);
        let line_nodes: Vec<&Node> = lines.iter().filter_map(|id| self.node(id)).collect();
        let machines = self.children(&line_nodes, RelType::HasMachine, Label::Machine);

        let mut scope: HashSet<&str> = lines.iter().chain(&machines).map(String::as_str).collect();
        scope.insert(&plant.element_id);

        let incidents: HashSet<&str> = self
            .rels
            .iter()
            .filter(|r| r.rel_type == RelType::Affects.as_str() && scope.contains(r.end_id.as_str()))
            .filter_map(|r| self.node(&r.start_id))
            .filter(|n| n.has_label(Label::Incident.as_str()))
            .map(|n| n.element_id.as_str())
            .collect();

        Record::new()
            .with("lines", count(lines.len()))
            .with("machines", count(machines.len()))
            .with("incidents", count(incidents.len()))
    }

    /// Distinct nodes within MAX_DEPTH dependency hops of `anchor`, excluding it.
    fn reach(&self, anchor: &Node, direction: Direction) -> HashSet<String> {
        let mut reached = HashSet::new();
        let mut queue = VecDeque::from([(anchor.element_id.clone(), 0u32)]);
        let mut visited = HashSet::from([anchor.element_id.clone()]);

        while let Some((node_id, hops)) = queue.pop_front() {
            if hops == MAX_DEPTH {
                continue;
            }
            for (rel, next) in self.hops(&node_id, direction) {
                if !RelType::DEPENDENCY.iter().any(|t| t.as_str() == rel.rel_type) {
                    continue;
                }
                if next.element_id != anchor.element_id {
                    reached.insert(next.element_id.clone());
                }
                if visited.insert(next.element_id.clone()) {
                    queue.push_back((next.element_id.clone(), hops + 1));
                }
            }
        }
        reached
    }

    fn evaluate(&self, query: &GraphQuery) -> Vec<Record> {
        match query {
            GraphQuery::Anchor { label, id } => self
                .anchors(*label, id)
                .take(1)
                .map(|n| Record::new().with("n", Cell::Node(n.clone())))
                .collect(),
            GraphQuery::Neighbors { label, id, direction, limit } => self
                .anchors(*label, id)
                .flat_map(|anchor| self.hops(&anchor.element_id, *direction))
                .filter(|(rel, _)| RelType::ALL.iter().any(|t| t.as_str() == rel.rel_type))
                .take(*limit)
                .map(|(rel, node)| {
                    Record::new()
                        .with("r", Cell::Relationship(rel.clone()))
                        .with("m", Cell::Node(node.clone()))
                })
                .collect(),
            GraphQuery::DependencyPaths { label, id, direction, depth, limit } => self
                .anchors(*label, id)
                .flat_map(|anchor| self.dependency_paths(anchor, *direction))
                .filter(|p| p.len() as u32 <= *depth)
                .take(*limit)
                .map(|p| Record::new().with("p", Cell::Path(p)))
                .collect(),
            GraphQuery::BlastRadius { label, id, depth, limit } => {
                let mut grouped = Vec::new();
                for anchor in self.anchors(*label, id) {
                    self.impacted(anchor, *depth, &mut grouped);
                }
                grouped
                    .into_iter()
                    .take(*limit)
                    .filter_map(|(element_id, critical)| {
                        self.node(&element_id).map(|n| {
                            Record::new()
                                .with("impacted", Cell::Node(n.clone()))
                                .with("critical", count(usize::from(critical)))
                        })
                    })
                    .collect()
            }
            GraphQuery::Search { label, needle, limit } => {
                let needle = needle.to_lowercase();
                self.nodes
                    .iter()
                    .filter(|n| n.has_label(label.as_str()) && Self::matches_search(n, &needle))
                    .take(*limit)
                    .map(|n| Record::new().with("n", Cell::Node(n.clone())))
                    .collect()
            }
            GraphQuery::GlobalCounts => vec![Record::new()
                .with("plants", Cell::Value(Value::Int(self.count_label(Label::Plant))))
                .with("services", Cell::Value(Value::Int(self.count_label(Label::Service))))
                .with("incidents", Cell::Value(Value::Int(self.count_label(Label::Incident))))],
            GraphQuery::PlantSummary { id } => self
                .anchors(Label::Plant, id)
                .map(|plant| self.plant_summary(plant))
                .collect(),
            GraphQuery::ServiceReach { id, direction } => {
                let reached: HashSet<String> = self
                    .anchors(Label::Service, id)
                    .flat_map(|s| self.reach(s, *direction))
                    .collect();
                vec![Record::new().with("reached", count(reached.len()))]
            }
        }
    }
}

fn count(n: usize) -> Cell {
    Cell::Value(Value::Int(n as i64))
}

#[async_trait]
impl GraphBackend for MemoryGraph {
    async fn run(&self, query: &GraphQuery) -> TopologyResult<Vec<Record>> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data.evaluate(query))
    }
}
