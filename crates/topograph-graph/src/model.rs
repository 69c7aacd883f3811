//! Graph entities as returned by a backend, and their serialized records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{TopologyError, TopologyResult};
use crate::value::{Value, coerce_map};

/// A labeled node with its backend identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub element_id: String,
    pub labels: Vec<String>,
    pub properties: BTreeMap<String, Value>,
}

impl Node {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// A property as a string, if present and textual.
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

/// A directed, typed relationship between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub element_id: String,
    pub rel_type: String,
    pub start_id: String,
    pub end_id: String,
    pub properties: BTreeMap<String, Value>,
}

impl Relationship {
    /// `strength` property, defaulting to `"normal"`.
    pub fn strength(&self) -> &str {
        self.properties
            .get("strength")
            .and_then(Value::as_str)
            .unwrap_or("normal")
    }

    pub fn is_critical(&self) -> bool {
        self.strength() == "critical"
    }
}

/// Alternating sequence of nodes and relationships; `nodes.len() == relationships.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub nodes: Vec<Node>,
    pub relationships: Vec<Relationship>,
}

impl Path {
    /// Edge count.
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn start(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn end(&self) -> Option<&Node> {
        self.nodes.last()
    }
}

/// One cell of a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Value(Value),
    Node(Node),
    Relationship(Relationship),
    Path(Path),
}

/// One result row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Cell>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, cell: Cell) -> Self {
        self.fields.insert(column.to_string(), cell);
        self
    }

    pub fn insert(&mut self, column: &str, cell: Cell) {
        self.fields.insert(column.to_string(), cell);
    }

    pub fn get(&self, column: &str) -> TopologyResult<&Cell> {
        self.fields
            .get(column)
            .ok_or_else(|| TopologyError::malformed(format!("missing column '{}'", column)))
    }

    pub fn node(&self, column: &str) -> TopologyResult<&Node> {
        match self.get(column)? {
            Cell::Node(node) => Ok(node),
            other => Err(unexpected(column, "node", other)),
        }
    }

    pub fn relationship(&self, column: &str) -> TopologyResult<&Relationship> {
        match self.get(column)? {
            Cell::Relationship(rel) => Ok(rel),
            other => Err(unexpected(column, "relationship", other)),
        }
    }

    pub fn path(&self, column: &str) -> TopologyResult<&Path> {
        match self.get(column)? {
            Cell::Path(path) => Ok(path),
            other => Err(unexpected(column, "path", other)),
        }
    }

    /// A non-negative count column.
    pub fn count(&self, column: &str) -> TopologyResult<u64> {
        match self.get(column)? {
            Cell::Value(Value::Int(n)) => u64::try_from(*n)
                .map_err(|_| TopologyError::malformed(format!("negative count in '{}'", column))),
            other => Err(unexpected(column, "integer", other)),
        }
    }
}

fn unexpected(column: &str, expected: &str, got: &Cell) -> TopologyError {
    let kind = match got {
        Cell::Value(_) => "value",
        Cell::Node(_) => "node",
        Cell::Relationship(_) => "relationship",
        Cell::Path(_) => "path",
    };
    TopologyError::malformed(format!("column '{}': expected {}, got {}", column, expected, kind))
}

/// Transport-safe node: labels plus coerced properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub labels: Vec<String>,
    pub props: BTreeMap<String, Value>,
}

/// Transport-safe relationship; `start`/`end` are backend node identities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelRecord {
    #[serde(rename = "type")]
    pub rel_type: String,
    pub props: BTreeMap<String, Value>,
    pub start: String,
    pub end: String,
}

pub fn node_to_record(node: &Node) -> NodeRecord {
    NodeRecord {
        labels: node.labels.clone(),
        props: coerce_map(node.properties.clone()),
    }
}

pub fn rel_to_record(rel: &Relationship) -> RelRecord {
    RelRecord {
        rel_type: rel.rel_type.clone(),
        props: coerce_map(rel.properties.clone()),
        start: rel.start_id.clone(),
        end: rel.end_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn node(id: &str) -> Node {
        let mut properties = BTreeMap::new();
        properties.insert("id".to_string(), Value::from(id));
        properties.insert(
            "installed".to_string(),
            Value::Date(NaiveDate::from_ymd_opt(2021, 6, 30).unwrap()),
        );
        Node {
            element_id: format!("n-{}", id),
            labels: vec!["Machine".to_string()],
            properties,
        }
    }

    #[test]
    fn test_node_to_record_coerces_props() {
        let record = node_to_record(&node("press-7"));
        assert_eq!(record.labels, vec!["Machine"]);
        assert_eq!(record.props["installed"], Value::from("2021-06-30"));
        assert_eq!(record.props["id"], Value::from("press-7"));
    }

    #[test]
    fn test_rel_to_record_and_strength() {
        let mut rel = Relationship {
            element_id: "r-1".to_string(),
            rel_type: "DEPENDS_ON".to_string(),
            start_id: "n-a".to_string(),
            end_id: "n-b".to_string(),
            properties: BTreeMap::new(),
        };
        assert_eq!(rel.strength(), "normal");
        assert!(!rel.is_critical());

        rel.properties.insert("strength".to_string(), Value::from("critical"));
        assert!(rel.is_critical());

        let json = serde_json::to_value(rel_to_record(&rel)).unwrap();
        assert_eq!(json["type"], "DEPENDS_ON");
        assert_eq!(json["start"], "n-a");
        assert_eq!(json["end"], "n-b");
        assert_eq!(json["props"]["strength"], "critical");
    }

    #[test]
    fn test_record_accessors() {
        let record = Record::new()
            .with("n", Cell::Node(node("a")))
            .with("total", Cell::Value(Value::Int(3)));

        assert_eq!(record.node("n").unwrap().element_id, "n-a");
        assert_eq!(record.count("total").unwrap(), 3);
        assert!(matches!(record.path("n"), Err(TopologyError::MalformedRecord(_))));
        assert!(matches!(record.get("missing"), Err(TopologyError::MalformedRecord(_))));
    }
}
