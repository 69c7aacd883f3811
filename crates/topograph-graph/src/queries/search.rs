//! Property search by id, name, or title.

use serde::Serialize;
use tracing::debug;

use crate::backend::GraphBackend;
use crate::error::TopologyResult;
use crate::model::{NodeRecord, node_to_record};
use crate::query::GraphQuery;
use crate::vocab::{Label, sanitize_label};

/// Labels searched when the caller names none, in result order.
pub const DEFAULT_SEARCH_LABELS: [Label; 12] = [
    Label::Service,
    Label::Machine,
    Label::Line,
    Label::Plant,
    Label::Database,
    Label::Sensor,
    Label::Api,
    Label::Server,
    Label::Topic,
    Label::Incident,
    Label::Alert,
    Label::Team,
];

/// Default overall result limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Result of [`search_entities`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub query: String,
    #[serde(rename = "type")]
    pub entity_type: Option<Label>,
    pub results: Vec<NodeRecord>,
}

/// Case-insensitive substring search over `id`, `name` and `title`.
///
/// Each label is queried in turn with `limit` rows, then the concatenation is
/// cut to `limit`. Earlier labels therefore crowd out later ones when many
/// entities match; callers wanting balance should search per type.
pub async fn search_entities<B>(
    backend: &B,
    query: &str,
    entity_type: Option<&str>,
    limit: usize,
) -> TopologyResult<SearchResults>
where
    B: GraphBackend + ?Sized,
{
    let typed = entity_type.map(sanitize_label).transpose()?;
    let labels: Vec<Label> = match typed {
        Some(label) => vec![label],
        None => DEFAULT_SEARCH_LABELS.to_vec(),
    };

    let mut results = Vec::new();
    for label in labels {
        let rows = backend
            .run(&GraphQuery::Search { label, needle: query.to_string(), limit })
            .await?;
        for row in &rows {
            results.push(node_to_record(row.node("n")?));
        }
    }
    results.truncate(limit);

    debug!(query, entity_type = ?typed, hits = results.len(), "entity search");

    Ok(SearchResults {
        query: query.to_string(),
        entity_type: typed,
        results,
    })
}
