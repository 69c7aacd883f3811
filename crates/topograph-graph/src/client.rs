//! Neo4j connection client.

use std::time::Duration;

use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query};
use tracing::{debug, info, warn};

use crate::backend::GraphBackend;
use crate::bolt;
use crate::config::GraphConfig;
use crate::error::{TopologyError, TopologyResult};
use crate::model::Record;
use crate::query::{GraphQuery, Param};

/// Pooled client for the Neo4j operations graph.
///
/// Cloning is cheap and shares the same bounded pool; build one per process
/// and hand clones (or an `Arc<dyn GraphBackend>`) to callers.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
    connect_timeout: Duration,
}

impl GraphClient {
    /// Create the connection pool.
    ///
    /// neo4rs creates the pool lazily, so no Bolt handshake happens until the
    /// first query. Call [`GraphClient::verify`] to fail fast on an
    /// unreachable server.
    pub async fn connect(config: &GraphConfig) -> TopologyResult<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .fetch_size(config.fetch_size)
            .build()?;

        let graph = Graph::connect(neo4j_config).await?;
        info!(
            uri = %config.uri,
            max_connections = config.max_connections,
            "Neo4j connection pool created"
        );

        Ok(Self {
            graph,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
        })
    }

    /// Run `RETURN 1` within the configured connect timeout.
    pub async fn verify(&self) -> TopologyResult<()> {
        let ping = self.graph.run(Query::new("RETURN 1".to_string()));
        match tokio::time::timeout(self.connect_timeout, ping).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(TopologyError::BackendUnavailable(format!(
                "Neo4j did not answer within {}s",
                self.connect_timeout.as_secs()
            ))),
        }
    }
}

/// Render a query description into a bound neo4rs query.
fn to_neo4rs(query: &GraphQuery) -> Query {
    query
        .params()
        .into_iter()
        .fold(Query::new(query.cypher()), |q, (key, param)| match param {
            Param::Str(s) => q.param(key, s),
            Param::Int(i) => q.param(key, i),
            Param::StrList(list) => q.param(key, list),
        })
}

#[async_trait]
impl GraphBackend for GraphClient {
    async fn run(&self, query: &GraphQuery) -> TopologyResult<Vec<Record>> {
        // The row stream owns the pooled connection and returns it on drop,
        // including when decoding bails out early.
        let mut stream = self.graph.execute(to_neo4rs(query)).await.map_err(|e| {
            warn!(query = query.name(), error = %e, "Neo4j query failed");
            TopologyError::from(e)
        })?;

        let mut records = Vec::new();
        while let Some(row) = stream.next().await? {
            records.push(bolt::record_from_row(&row, query.columns())?);
        }

        debug!(query = query.name(), rows = records.len(), "Neo4j query complete");
        Ok(records)
    }
}
