//! Topograph Web Server
//!
//! Axum-based REST facade over the topology query engine.

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{Router, routing::get};
use topograph_graph::GraphBackend;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let graph_routes = Router::new()
        .route("/entity/{type}/{id}", get(routes::topology::get_entity_context))
        .route("/dependencies/{type}/{id}", get(routes::topology::get_dependencies))
        .route("/dependents/{type}/{id}", get(routes::topology::get_dependents))
        .route("/blast-radius/{type}/{id}", get(routes::topology::get_blast_radius))
        .route("/search", get(routes::topology::search_entities))
        .route("/topology-summary", get(routes::topology::topology_summary))
        .with_state(state);

    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/graph", graph_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Run the web server.
pub async fn run_server(graph: Arc<dyn GraphBackend>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(AppState::new(graph));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}
