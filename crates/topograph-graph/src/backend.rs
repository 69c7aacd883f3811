//! Query executor seam.

use async_trait::async_trait;

use crate::error::TopologyResult;
use crate::model::Record;
use crate::query::GraphQuery;

/// Executes one read query and returns all of its rows.
///
/// Implementations acquire whatever session they need for the call and
/// release it before returning, on success and on failure alike.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    async fn run(&self, query: &GraphQuery) -> TopologyResult<Vec<Record>>;
}
