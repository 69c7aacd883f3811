//! Mapping of engine errors to HTTP responses.

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use topograph_graph::TopologyError;

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

/// Engine error rendered as `{"detail": ...}` with a matching status.
pub struct ApiError(pub TopologyError);

impl From<TopologyError> for ApiError {
    fn from(err: TopologyError) -> Self {
        Self(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(TopologyError::validation(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            TopologyError::Validation(_) => StatusCode::BAD_REQUEST,
            TopologyError::NotFound(_) => StatusCode::NOT_FOUND,
            TopologyError::BackendUnavailable(_) | TopologyError::MalformedRecord(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "topology query failed");
        }
        let detail = match self.0 {
            TopologyError::Validation(msg)
            | TopologyError::NotFound(msg)
            | TopologyError::BackendUnavailable(msg)
            | TopologyError::MalformedRecord(msg) => msg,
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}
