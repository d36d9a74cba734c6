//! HTTP front end: `GET /recommend/{id}?n={top_n}` and `GET /health`.

use crate::catalog::Catalog;
use crate::query::Recommendations;
use crate::RecommenderError;
use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<Catalog>,
    default_top_n: usize,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, default_top_n: usize) -> Self {
        Self {
            catalog,
            default_top_n,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendParams {
    pub n: Option<i64>,
}

/// Per-request failure rendered as a JSON body with a matching status.
#[derive(Debug)]
pub struct ApiError(pub RecommenderError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            RecommenderError::NotFound(_) => StatusCode::NOT_FOUND,
            RecommenderError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RecommenderError> for ApiError {
    fn from(err: RecommenderError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub async fn recommend(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<Recommendations>, ApiError> {
    let top_n = match params.n {
        None => state.default_top_n,
        Some(n) if n >= 1 => n as usize,
        Some(n) => {
            return Err(RecommenderError::InvalidArgument(format!("n must be at least 1, got {}", n)).into())
        }
    };

    match state.catalog.recommender().recommend(id, top_n) {
        Ok(result) => Ok(Json(result)),
        Err(err) => {
            warn!(id, top_n, error = %err, "recommendation request rejected");
            Err(err.into())
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "articles": state.catalog.len() }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/recommend/:id", get(recommend))
        .route("/health", get(health))
        .with_state(state)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("failed to listen for ctrl-c; server will run until killed");
        std::future::pending::<()>().await;
    }
}

/// Serves an already-loaded catalog until Ctrl-C. Blocks the calling thread.
pub fn run(state: AppState, bind: &str) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(bind)
            .await
            .with_context(|| format!("failed to bind {}", bind))?;
        info!(addr = %bind, articles = state.catalog.len(), "serving recommendations");

        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        info!("server stopped");
        Ok(())
    })
}
