//! Topology route handlers.

use axum::{
    Json,
    extract::{FromRequestParts, Path, State},
};
use serde::Deserialize;
use topograph_graph::queries::{
    self, BlastRadius, DEFAULT_SEARCH_LIMIT, DependencyGraph, EntityContext, SearchResults,
    TopologySummary,
};

use crate::error::ApiError;
use crate::state::AppState;

/// `Query` whose rejections render as `{"detail": ...}` like engine errors.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);

fn default_depth() -> u32 {
    2
}

fn default_max_depth() -> u32 {
    3
}

fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

#[derive(Deserialize)]
pub struct DepthParams {
    #[serde(default = "default_depth")]
    pub depth: u32,
}

#[derive(Deserialize)]
pub struct BlastParams {
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Deserialize)]
pub struct SummaryParams {
    pub scope: Option<String>,
}

pub async fn get_entity_context(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> Result<Json<EntityContext>, ApiError> {
    let ctx = queries::entity_context(&*state.graph, &entity_type, &entity_id).await?;
    Ok(Json(ctx))
}

pub async fn get_dependencies(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
    Query(params): Query<DepthParams>,
) -> Result<Json<DependencyGraph>, ApiError> {
    let graph =
        queries::dependencies(&*state.graph, &entity_type, &entity_id, params.depth).await?;
    Ok(Json(graph))
}

pub async fn get_dependents(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
    Query(params): Query<DepthParams>,
) -> Result<Json<DependencyGraph>, ApiError> {
    let graph =
        queries::dependents(&*state.graph, &entity_type, &entity_id, params.depth).await?;
    Ok(Json(graph))
}

pub async fn get_blast_radius(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
    Query(params): Query<BlastParams>,
) -> Result<Json<BlastRadius>, ApiError> {
    let radius =
        queries::blast_radius(&*state.graph, &entity_type, &entity_id, params.max_depth).await?;
    Ok(Json(radius))
}

pub async fn search_entities(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, ApiError> {
    let results = queries::search_entities(
        &*state.graph,
        &params.q,
        params.entity_type.as_deref(),
        params.limit,
    )
    .await?;
    Ok(Json(results))
}

pub async fn topology_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<TopologySummary>, ApiError> {
    let summary = queries::topology_summary(&*state.graph, params.scope.as_deref()).await?;
    Ok(Json(summary))
}
