//! # Topograph Graph
//!
//! Topology and dependency query engine over the Neo4j operations graph.
//!
//! Turns caller-supplied type/identifier tokens into bounded traversals,
//! runs them through a pooled backend, and returns coerced, deduplicated
//! node and relationship records.

pub mod backend;
mod bolt;
pub mod client;
pub mod config;
pub mod dedup;
pub mod error;
pub mod memory;
pub mod model;
pub mod query;
pub mod queries;
pub mod value;
pub mod vocab;

pub use backend::GraphBackend;
pub use client::GraphClient;
pub use config::GraphConfig;
pub use error::{TopologyError, TopologyResult};
pub use memory::MemoryGraph;
pub use model::{Cell, Node, NodeRecord, Path, Record, RelRecord, Relationship};
pub use query::{Direction, GraphQuery};
pub use value::{IsoDuration, Value, coerce_value};
pub use vocab::{Label, RelType, MAX_DEPTH, sanitize_label, sanitize_rel_type};
