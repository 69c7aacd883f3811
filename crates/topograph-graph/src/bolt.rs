//! Decoding of neo4rs rows into backend-neutral records.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use neo4rs::{BoltDuration, BoltMap, BoltNode, BoltPath, BoltRelation, BoltType, BoltUnboundedRelation, Row};

use crate::error::{TopologyError, TopologyResult};
use crate::model::{Cell, Node, Path, Record, Relationship};
use crate::value::{IsoDuration, Value};

/// Read the given columns of a row.
pub(crate) fn record_from_row(row: &Row, columns: &[&str]) -> TopologyResult<Record> {
    let mut record = Record::new();
    for column in columns {
        let value: BoltType = row
            .get(column)
            .map_err(|e| TopologyError::malformed(format!("column '{}': {}", column, e)))?;
        record.insert(column, cell_from_bolt(value)?);
    }
    Ok(record)
}

fn cell_from_bolt(value: BoltType) -> TopologyResult<Cell> {
    Ok(match value {
        BoltType::Node(node) => Cell::Node(node_from_bolt(node)?),
        BoltType::Relation(rel) => Cell::Relationship(rel_from_bolt(rel)?),
        BoltType::Path(path) => Cell::Path(path_from_bolt(path)?),
        other => Cell::Value(value_from_bolt(other)?),
    })
}

fn node_from_bolt(node: BoltNode) -> TopologyResult<Node> {
    let labels = node
        .labels
        .value
        .into_iter()
        .map(|label| match label {
            BoltType::String(s) => Ok(s.value),
            other => Err(TopologyError::malformed(format!("non-string label: {:?}", other))),
        })
        .collect::<TopologyResult<Vec<_>>>()?;

    Ok(Node {
        element_id: node.id.value.to_string(),
        labels,
        properties: map_from_bolt(node.properties)?,
    })
}

fn rel_from_bolt(rel: BoltRelation) -> TopologyResult<Relationship> {
    Ok(Relationship {
        element_id: rel.id.value.to_string(),
        rel_type: rel.typ.value,
        start_id: rel.start_node_id.value.to_string(),
        end_id: rel.end_node_id.value.to_string(),
        properties: map_from_bolt(rel.properties)?,
    })
}

/// Rebuild a path from Bolt's compact form.
///
/// `indices` alternates (relationship, node) pairs. Relationship indices are
/// 1-based and negative when the edge was traversed against its direction;
/// node indices point into `nodes`, whose first entry is the path start.
fn path_from_bolt(path: BoltPath) -> TopologyResult<Path> {
    let nodes = path
        .nodes
        .value
        .into_iter()
        .map(|n| match n {
            BoltType::Node(node) => node_from_bolt(node),
            other => Err(TopologyError::malformed(format!("path node: {:?}", other))),
        })
        .collect::<TopologyResult<Vec<_>>>()?;
    let rels = path
        .rels
        .value
        .into_iter()
        .map(|r| match r {
            BoltType::UnboundedRelation(rel) => Ok(rel),
            other => Err(TopologyError::malformed(format!("path relationship: {:?}", other))),
        })
        .collect::<TopologyResult<Vec<BoltUnboundedRelation>>>()?;
    let indices = path
        .indices
        .value
        .into_iter()
        .map(|i| match i {
            BoltType::Integer(i) => Ok(i.value),
            other => Err(TopologyError::malformed(format!("path index: {:?}", other))),
        })
        .collect::<TopologyResult<Vec<i64>>>()?;

    let first = nodes
        .first()
        .cloned()
        .ok_or_else(|| TopologyError::malformed("empty path"))?;
    let mut out = Path { nodes: vec![first], relationships: Vec::new() };

    for pair in indices.chunks(2) {
        let [rel_index, node_index] = pair else {
            return Err(TopologyError::malformed("odd path index sequence"));
        };
        let prev_id = out.nodes[out.nodes.len() - 1].element_id.clone();
        let next = usize::try_from(*node_index)
            .ok()
            .and_then(|i| nodes.get(i))
            .cloned()
            .ok_or_else(|| TopologyError::malformed("path node index out of range"))?;
        let rel = usize::try_from(rel_index.unsigned_abs())
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| rels.get(i))
            .ok_or_else(|| TopologyError::malformed("path relationship index out of range"))?;

        let (start_id, end_id) = if *rel_index > 0 {
            (prev_id, next.element_id.clone())
        } else {
            (next.element_id.clone(), prev_id)
        };
        out.relationships.push(Relationship {
            element_id: rel.id.value.to_string(),
            rel_type: rel.typ.value.clone(),
            start_id,
            end_id,
            properties: map_from_bolt(rel.properties.clone())?,
        });
        out.nodes.push(next);
    }

    Ok(out)
}

fn map_from_bolt(map: BoltMap) -> TopologyResult<BTreeMap<String, Value>> {
    map.value
        .into_iter()
        .map(|(k, v)| Ok((k.value, value_from_bolt(v)?)))
        .collect()
}

fn temporal(err: impl std::fmt::Debug) -> TopologyError {
    TopologyError::malformed(format!("temporal value out of range: {:?}", err))
}

fn value_from_bolt(value: BoltType) -> TopologyResult<Value> {
    Ok(match value {
        BoltType::Null(_) => Value::Null,
        BoltType::Boolean(b) => Value::Bool(b.value),
        BoltType::Integer(i) => Value::Int(i.value),
        BoltType::Float(f) => Value::Float(f.value),
        BoltType::String(s) => Value::String(s.value),
        BoltType::List(list) => Value::List(
            list.value
                .into_iter()
                .map(value_from_bolt)
                .collect::<TopologyResult<_>>()?,
        ),
        BoltType::Map(map) => Value::Map(map_from_bolt(map)?),
        BoltType::Bytes(bytes) => {
            Value::List(bytes.value.iter().map(|b| Value::Int(i64::from(*b))).collect())
        }
        BoltType::Date(date) => {
            let date: NaiveDate = date.try_into().map_err(temporal)?;
            Value::Date(date)
        }
        BoltType::LocalTime(time) => {
            let time: NaiveTime = time.into();
            Value::LocalTime(time)
        }
        BoltType::Time(time) => {
            let (time, offset): (NaiveTime, FixedOffset) = time.into();
            Value::Time { time, offset }
        }
        BoltType::LocalDateTime(dt) => {
            let dt: NaiveDateTime = dt.try_into().map_err(temporal)?;
            Value::LocalDateTime(dt)
        }
        BoltType::DateTime(dt) => {
            let dt: DateTime<FixedOffset> = dt.try_into().map_err(temporal)?;
            Value::DateTime(dt)
        }
        BoltType::DateTimeZoneId(dt) => {
            let (local, zone): (NaiveDateTime, String) = dt.try_into().map_err(temporal)?;
            Value::ZonedDateTime { local, zone }
        }
        BoltType::Duration(duration) => Value::Duration(duration_from_bolt(duration)),
        other => {
            return Err(TopologyError::malformed(format!(
                "unsupported property value: {:?}",
                other
            )))
        }
    })
}

/// Months and days arrive folded into seconds.
///
/// neo4rs casts the signed second count to `u64`; casting back restores it.
/// Bolt keeps nanoseconds non-negative, so a negative duration with a
/// fraction is shifted to carry the sign on both parts.
fn duration_from_bolt(duration: BoltDuration) -> IsoDuration {
    let std: std::time::Duration = duration.into();
    let mut seconds = std.as_secs() as i64;
    let mut nanoseconds = std.subsec_nanos() as i32;
    if seconds < 0 && nanoseconds > 0 {
        seconds += 1;
        nanoseconds -= 1_000_000_000;
    }
    IsoDuration::new(0, 0, seconds, nanoseconds)
}
