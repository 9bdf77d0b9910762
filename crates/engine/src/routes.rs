use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use flowchart::{
    build_prompt, extract_json_object, validate_graph_value, GenerationError, GraphDescription,
    Timestamp,
};
use serde::Serialize;

use crate::middleware::log_requests;
use crate::{ApiError, AppState};

/// Attachment name of the returned image.
const ATTACHMENT: &str = "attachment; filename=flowchart.jpg";

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    time: String,
}

#[tracing::instrument(skip_all, fields(algorithm_len))]
async fn generate_flowchart_handler(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query.map_err(|e| {
        tracing::debug!(error = %e, "unparseable query string");
        ApiError::from(GenerationError::Empty)
    })?;

    // A repeated parameter resolves to its last value.
    let algorithm = params
        .into_iter()
        .filter_map(|(key, value)| (key == "algorithm").then_some(value))
        .last()
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| ApiError::from(GenerationError::Empty))?;
    tracing::Span::current().record("algorithm_len", algorithm.len());

    let raw = state.generator.generate(&build_prompt(&algorithm)).await?;
    tracing::debug!(raw_len = raw.len(), "model answered");

    let value = extract_json_object(&raw)?;
    validate_graph_value(&value)?;
    let graph = GraphDescription::from_value(value)
        .map_err(|e| ApiError::bad_request(format!("Некорректная структура блок-схемы: {e}")))?;

    let image = {
        let _guard = state.render_lock.lock().await;
        let path = state.renderer.render(&graph).await?;
        tokio::fs::read(&path).await.map_err(ApiError::internal)?
    };

    tracing::info!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        bytes = image.len(),
        "flowchart generated"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CONTENT_DISPOSITION, ATTACHMENT),
        ],
        image,
    )
        .into_response())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        time: Timestamp::now().to_local_string(),
    })
}

/// Builds the service router with request logging.
pub fn routes(state: AppState) -> Router {
    tracing::info!("Registering route /generate_flowchart/ [GET]");
    tracing::info!("Registering route /health [GET]");

    Router::new()
        .route("/generate_flowchart/", get(generate_flowchart_handler))
        .route("/generate_flowchart", get(generate_flowchart_handler))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}
