//! Aggregate counts, global or scoped to a plant or service.

use std::fmt;

use serde::Serialize;

use crate::backend::GraphBackend;
use crate::error::{TopologyError, TopologyResult};
use crate::query::{Direction, GraphQuery};

/// What a summary is computed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Global,
    Plant(String),
    Service(String),
}

impl Scope {
    /// Parse `plant:<id>` or `service:<id>`; `None` or an empty string is global.
    ///
    /// The kind is case-insensitive and the id is everything after the first `:`.
    pub fn parse(scope: Option<&str>) -> TopologyResult<Self> {
        let Some(raw) = scope.filter(|s| !s.is_empty()) else {
            return Ok(Scope::Global);
        };
        let Some((kind, id)) = raw.split_once(':') else {
            return Err(TopologyError::validation(
                "scope must look like 'plant:<id>' or 'service:<id>'",
            ));
        };
        match kind.to_lowercase().as_str() {
            "plant" => Ok(Scope::Plant(id.to_string())),
            "service" => Ok(Scope::Service(id.to_string())),
            _ => Err(TopologyError::validation(format!(
                "Unsupported scope kind '{}' (use plant:<id> or service:<id>)",
                kind
            ))),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Plant(id) => write!(f, "plant:{}", id),
            Scope::Service(id) => write!(f, "service:{}", id),
        }
    }
}

/// Counts for each scope kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SummaryCounts {
    Global { plants: u64, services: u64, incidents: u64 },
    Plant { lines: u64, machines: u64, incidents: u64 },
    Service { dependencies: u64, dependents: u64 },
}

/// Result of [`topology_summary`]; `scope` echoes the caller's string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologySummary {
    pub scope: Option<String>,
    pub summary: SummaryCounts,
}

/// Counts for the whole graph, a plant's hierarchy, or a service's dependency reach.
pub async fn topology_summary<B>(
    backend: &B,
    scope: Option<&str>,
) -> TopologyResult<TopologySummary>
where
    B: GraphBackend + ?Sized,
{
    let parsed = Scope::parse(scope)?;
    let summary = match &parsed {
        Scope::Global => {
            let rows = backend.run(&GraphQuery::GlobalCounts).await?;
            let row = rows
                .first()
                .ok_or_else(|| TopologyError::malformed("global counts returned no row"))?;
            SummaryCounts::Global {
                plants: row.count("plants")?,
                services: row.count("services")?,
                incidents: row.count("incidents")?,
            }
        }
        Scope::Plant(id) => {
            let rows = backend.run(&GraphQuery::PlantSummary { id: id.clone() }).await?;
            let row = rows
                .first()
                .ok_or_else(|| TopologyError::not_found(format!("Plant '{}' not found", id)))?;
            SummaryCounts::Plant {
                lines: row.count("lines")?,
                machines: row.count("machines")?,
                incidents: row.count("incidents")?,
            }
        }
        Scope::Service(id) => {
            let dependencies = reach(backend, id, Direction::Outgoing).await?;
            let dependents = reach(backend, id, Direction::Incoming).await?;
            SummaryCounts::Service { dependencies, dependents }
        }
    };

    Ok(TopologySummary {
        scope: match parsed {
            Scope::Global => None,
            _ => scope.map(str::to_string),
        },
        summary,
    })
}

async fn reach<B>(backend: &B, id: &str, direction: Direction) -> TopologyResult<u64>
where
    B: GraphBackend + ?Sized,
{
    let rows = backend
        .run(&GraphQuery::ServiceReach { id: id.to_string(), direction })
        .await?;
    match rows.first() {
        Some(row) => row.count("reached"),
        None => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGraph;
    use crate::queries::fixtures::payments_graph;
    use crate::vocab::{Label, RelType};

    #[test]
    fn test_scope_parse() {
        assert_eq!(Scope::parse(None).unwrap(), Scope::Global);
        assert_eq!(Scope::parse(Some("")).unwrap(), Scope::Global);
        assert_eq!(Scope::parse(Some("Plant:p1")).unwrap(), Scope::Plant("p1".into()));
        assert_eq!(
            Scope::parse(Some("service:ns:checkout")).unwrap(),
            Scope::Service("ns:checkout".into())
        );
        assert!(matches!(Scope::parse(Some("line:l1")), Err(TopologyError::Validation(_))));
        assert!(matches!(Scope::parse(Some("plant")), Err(TopologyError::Validation(_))));
        assert_eq!(Scope::Plant("p1".into()).to_string(), "plant:p1");
    }

    #[tokio::test]
    async fn test_empty_graph_global_summary() {
        let g = MemoryGraph::new();
        let result = topology_summary(&g, None).await.unwrap();
        assert_eq!(result.scope, None);
        assert_eq!(
            result.summary,
            SummaryCounts::Global { plants: 0, services: 0, incidents: 0 }
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["summary"]["plants"], 0);
    }

    fn plant_graph() -> MemoryGraph {
        let g = MemoryGraph::new();
        let plant = g.add_entity(Label::Plant, "p1");
        let line_a = g.add_entity(Label::Line, "l-a");
        let line_b = g.add_entity(Label::Line, "l-b");
        let m1 = g.add_entity(Label::Machine, "m1");
        let m2 = g.add_entity(Label::Machine, "m2");
        let sensor = g.add_entity(Label::Sensor, "s1");
        g.relate(&plant, RelType::HasLine, &line_a);
        g.relate(&plant, RelType::HasLine, &line_b);
        g.relate(&line_a, RelType::HasMachine, &m1);
        g.relate(&line_b, RelType::HasMachine, &m2);
        g.relate(&m1, RelType::HasSensor, &sensor);

        let inc_machine = g.add_entity(Label::Incident, "inc-1");
        let inc_plant = g.add_entity(Label::Incident, "inc-2");
        let inc_sensor = g.add_entity(Label::Incident, "inc-3");
        g.relate(&inc_machine, RelType::Affects, &m1);
        g.relate(&inc_machine, RelType::Affects, &line_a);
        g.relate(&inc_plant, RelType::Affects, &plant);
        g.relate(&inc_sensor, RelType::Affects, &sensor);
        g
    }

    #[tokio::test]
    async fn test_plant_summary() {
        let g = plant_graph();
        let result = topology_summary(&g, Some("plant:p1")).await.unwrap();
        assert_eq!(result.scope.as_deref(), Some("plant:p1"));
        assert_eq!(
            result.summary,
            SummaryCounts::Plant { lines: 2, machines: 2, incidents: 2 }
        );
    }

    #[tokio::test]
    async fn test_plant_not_found() {
        let g = plant_graph();
        let err = topology_summary(&g, Some("plant:p9")).await.unwrap_err();
        assert!(matches!(err, TopologyError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_service_summary() {
        let fx = payments_graph(false);
        let result = topology_summary(&fx.graph, Some("service:payments")).await.unwrap();
        assert_eq!(
            result.summary,
            SummaryCounts::Service { dependencies: 1, dependents: 1 }
        );

        let checkout = topology_summary(&fx.graph, Some("SERVICE:checkout")).await.unwrap();
        assert_eq!(
            checkout.summary,
            SummaryCounts::Service { dependencies: 2, dependents: 0 }
        );

        let global = topology_summary(&fx.graph, None).await.unwrap();
        assert_eq!(
            global.summary,
            SummaryCounts::Global { plants: 0, services: 2, incidents: 0 }
        );
    }

    #[tokio::test]
    async fn test_unknown_service_counts_zero() {
        let g = MemoryGraph::new();
        let result = topology_summary(&g, Some("service:ghost")).await.unwrap();
        assert_eq!(result.summary, SummaryCounts::Service { dependencies: 0, dependents: 0 });
    }
}
