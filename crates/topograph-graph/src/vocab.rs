//! Label and relationship-type vocabularies.
//!
//! Cypher cannot bind labels or relationship types as parameters, so every
//! structural token spliced into query text comes from these closed enums.
//! Free-form caller input only reaches a query through [`sanitize_label`] or
//! [`sanitize_rel_type`].

use std::fmt;

use serde::Serialize;

use crate::error::{TopologyError, TopologyResult};

/// Upper bound for variable-length dependency patterns.
pub const MAX_DEPTH: u32 = 4;

/// Node labels the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Label {
    Site,
    Plant,
    Line,
    Machine,
    Sensor,
    Service,
    Database,
    Team,
    Incident,
    Alert,
    Ticket,
    Runbook,
    AgentAction,
    #[serde(rename = "API")]
    Api,
    Topic,
    Server,
    NetworkDevice,
    User,
    AlertType,
}

impl Label {
    pub const ALL: [Label; 19] = [
        Label::Site,
        Label::Plant,
        Label::Line,
        Label::Machine,
        Label::Sensor,
        Label::Service,
        Label::Database,
        Label::Team,
        Label::Incident,
        Label::Alert,
        Label::Ticket,
        Label::Runbook,
        Label::AgentAction,
        Label::Api,
        Label::Topic,
        Label::Server,
        Label::NetworkDevice,
        Label::User,
        Label::AlertType,
    ];

    /// The Neo4j node label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Site => "Site",
            Label::Plant => "Plant",
            Label::Line => "Line",
            Label::Machine => "Machine",
            Label::Sensor => "Sensor",
            Label::Service => "Service",
            Label::Database => "Database",
            Label::Team => "Team",
            Label::Incident => "Incident",
            Label::Alert => "Alert",
            Label::Ticket => "Ticket",
            Label::Runbook => "Runbook",
            Label::AgentAction => "AgentAction",
            Label::Api => "API",
            Label::Topic => "Topic",
            Label::Server => "Server",
            Label::NetworkDevice => "NetworkDevice",
            Label::User => "User",
            Label::AlertType => "AlertType",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship types the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelType {
    HasLine,
    HasMachine,
    HasSensor,
    DependsOn,
    OwnedBy,
    Affects,
    About,
    CorrelatedWith,
    Tracks,
    ExecutedBy,
    RelatesTo,
    Targets,
    BasedOn,
    ApprovedBy,
    AppliesTo,
    AttachedTo,
    RunsOn,
    UsesDb,
    CallsApi,
    PublishesTo,
    ConsumesFrom,
}

impl RelType {
    pub const ALL: [RelType; 21] = [
        RelType::HasLine,
        RelType::HasMachine,
        RelType::HasSensor,
        RelType::DependsOn,
        RelType::OwnedBy,
        RelType::Affects,
        RelType::About,
        RelType::CorrelatedWith,
        RelType::Tracks,
        RelType::ExecutedBy,
        RelType::RelatesTo,
        RelType::Targets,
        RelType::BasedOn,
        RelType::ApprovedBy,
        RelType::AppliesTo,
        RelType::AttachedTo,
        RelType::RunsOn,
        RelType::UsesDb,
        RelType::CallsApi,
        RelType::PublishesTo,
        RelType::ConsumesFrom,
    ];

    /// Runtime-dependency relationships walked by dependency and blast-radius queries.
    pub const DEPENDENCY: [RelType; 6] = [
        RelType::CallsApi,
        RelType::ConsumesFrom,
        RelType::DependsOn,
        RelType::PublishesTo,
        RelType::RunsOn,
        RelType::UsesDb,
    ];

    /// Physical hierarchy: plant -> line -> machine -> sensor.
    pub const CHILD: [RelType; 3] = [RelType::HasLine, RelType::HasMachine, RelType::HasSensor];

    /// The Neo4j relationship type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelType::HasLine => "HAS_LINE",
            RelType::HasMachine => "HAS_MACHINE",
            RelType::HasSensor => "HAS_SENSOR",
            RelType::DependsOn => "DEPENDS_ON",
            RelType::OwnedBy => "OWNED_BY",
            RelType::Affects => "AFFECTS",
            RelType::About => "ABOUT",
            RelType::CorrelatedWith => "CORRELATED_WITH",
            RelType::Tracks => "TRACKS",
            RelType::ExecutedBy => "EXECUTED_BY",
            RelType::RelatesTo => "RELATES_TO",
            RelType::Targets => "TARGETS",
            RelType::BasedOn => "BASED_ON",
            RelType::ApprovedBy => "APPROVED_BY",
            RelType::AppliesTo => "APPLIES_TO",
            RelType::AttachedTo => "ATTACHED_TO",
            RelType::RunsOn => "RUNS_ON",
            RelType::UsesDb => "USES_DB",
            RelType::CallsApi => "CALLS_API",
            RelType::PublishesTo => "PUBLISHES_TO",
            RelType::ConsumesFrom => "CONSUMES_FROM",
        }
    }

    pub fn is_dependency(&self) -> bool {
        Self::DEPENDENCY.contains(self)
    }

    /// Alternation of the given types for a Cypher pattern, e.g. `DEPENDS_ON|USES_DB`.
    pub fn pattern(types: &[RelType]) -> String {
        types.iter().map(RelType::as_str).collect::<Vec<_>>().join("|")
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonicalize a caller-supplied label.
///
/// Trims whitespace and capitalizes the first character; the result must
/// name a vocabulary label (compared case-insensitively, so `"SERVICE"` and
/// `"api"` resolve to `Service` and `API`).
pub fn sanitize_label(input: &str) -> TopologyResult<Label> {
    let trimmed = input.trim();
    let mut chars = trimmed.chars();
    let canonical: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    Label::ALL
        .iter()
        .copied()
        .find(|label| label.as_str().eq_ignore_ascii_case(&canonical))
        .ok_or_else(|| TopologyError::validation(format!("Label '{}' not allowed", input)))
}

/// Canonicalize a caller-supplied relationship type (`depends_on` -> `DEPENDS_ON`).
pub fn sanitize_rel_type(input: &str) -> TopologyResult<RelType> {
    let canonical = input.trim().to_uppercase();

    RelType::ALL
        .iter()
        .copied()
        .find(|rel| rel.as_str() == canonical)
        .ok_or_else(|| {
            TopologyError::validation(format!("Relationship type '{}' not allowed", input))
        })
}

/// Reject depths outside `1..=MAX_DEPTH`.
pub fn validate_depth(depth: u32) -> TopologyResult<u32> {
    if (1..=MAX_DEPTH).contains(&depth) {
        Ok(depth)
    } else {
        Err(TopologyError::validation(format!(
            "depth must be between 1 and {}, got {}",
            MAX_DEPTH, depth
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_label_case_variants() {
        for input in ["service", "SERVICE", "Service", "  service  "] {
            assert_eq!(sanitize_label(input).unwrap(), Label::Service);
        }
        assert_eq!(sanitize_label("api").unwrap(), Label::Api);
        assert_eq!(sanitize_label("networkDevice").unwrap(), Label::NetworkDevice);
    }

    #[test]
    fn test_sanitize_label_rejects_unknown() {
        for input in ["", "   ", "Gizmo", "Service) DETACH DELETE n //", "Serv ice", "Project"] {
            let err = sanitize_label(input).unwrap_err();
            assert!(matches!(err, TopologyError::Validation(_)), "{input:?}");
        }
    }

    #[test]
    fn test_sanitize_rel_type() {
        assert_eq!(sanitize_rel_type("depends_on").unwrap(), RelType::DependsOn);
        assert_eq!(sanitize_rel_type(" USES_DB ").unwrap(), RelType::UsesDb);
        assert!(sanitize_rel_type("DEPENDS_ON]->() DELETE x").is_err());
    }

    #[test]
    fn test_vocab_spellings_round_trip() {
        for label in Label::ALL {
            assert_eq!(sanitize_label(label.as_str()).unwrap(), label);
            assert_eq!(serde_json::to_value(label).unwrap(), label.as_str());
        }
        for rel in RelType::ALL {
            assert_eq!(sanitize_rel_type(rel.as_str()).unwrap(), rel);
            assert_eq!(serde_json::to_value(rel).unwrap(), rel.as_str());
        }
    }

    #[test]
    fn test_dependency_subset() {
        assert_eq!(
            RelType::pattern(&RelType::DEPENDENCY),
            "CALLS_API|CONSUMES_FROM|DEPENDS_ON|PUBLISHES_TO|RUNS_ON|USES_DB"
        );
        assert!(RelType::DependsOn.is_dependency());
        assert!(!RelType::HasLine.is_dependency());
        assert!(RelType::CHILD.iter().all(|rel| !rel.is_dependency()));
    }

    #[test]
    fn test_validate_depth() {
        assert!(validate_depth(0).is_err());
        assert_eq!(validate_depth(1).unwrap(), 1);
        assert_eq!(validate_depth(MAX_DEPTH).unwrap(), MAX_DEPTH);
        assert!(validate_depth(MAX_DEPTH + 1).is_err());
    }
}
