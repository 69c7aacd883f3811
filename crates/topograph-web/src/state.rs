//! Application state.

use std::sync::Arc;

use topograph_graph::GraphBackend;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub graph: Arc<dyn GraphBackend>,
}

impl AppState {
    pub fn new(graph: Arc<dyn GraphBackend>) -> Self {
        Self { graph }
    }
}
