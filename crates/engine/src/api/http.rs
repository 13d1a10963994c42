//! HTTP routes.

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use minebot_protocol::ActorStatsData;

use crate::app::App;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/stats", get(latest_stats))
}

async fn health() -> &'static str {
    "OK"
}

async fn latest_stats(State(app): State<Arc<App>>) -> Result<Json<ActorStatsData>, ApiError> {
    app.stats.latest().await.map(Json).ok_or(ApiError::NotFound)
}

#[derive(Debug)]
pub enum ApiError {
    NotFound,
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound => {
                (axum::http::StatusCode::NOT_FOUND, "Not found").into_response()
            }
        }
    }
}
