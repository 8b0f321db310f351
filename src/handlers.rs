use crate::config::Config;
use crate::engine::EstimationEngine;
use crate::errors::AppError;
use crate::models::*;
use crate::remote_client::RemoteEstimator;
use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// In-process engine; owns the shared objective catalog.
    pub engine: EstimationEngine,
    /// Remote service estimates are delegated to, when configured.
    pub remote: Option<RemoteEstimator>,
}

/// Health check endpoint.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "objectives": state.engine.catalog().len(),
            "mode": if state.remote.is_some() { "remote" } else { "local" },
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

/// GET /api/v1/objectives
///
/// Lists objectives in catalog order, with display names for selection UIs.
pub async fn list_objectives(State(state): State<Arc<AppState>>) -> Json<Vec<ObjectiveView>> {
    Json(state.engine.catalog().views())
}

/// GET /api/v1/objectives/:name
pub async fn get_objective(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ObjectiveView>, AppError> {
    let definition = state.engine.catalog().lookup(&name)?;
    Ok(Json(ObjectiveView::from(definition.clone())))
}

/// GET /objectives
///
/// Bare name list consumed by the browser form's objective dropdown.
pub async fn objective_names(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.engine.catalog().names())
}

async fn run_estimate(state: &AppState, input: EstimationInput) -> Result<EstimationResult, AppError> {
    match &state.remote {
        Some(remote) => remote.estimate(&input).await,
        None => Ok(state.engine.estimate(&input)?),
    }
}

/// POST /api/v1/estimate (also served as the legacy POST /calculate)
///
/// Accepts numbers or numeric text for every numeric field.
///
/// # Returns
///
/// * `Result<Json<EstimationResult>, AppError>` - The estimate, or a JSON
///   `{error, message, field?, objective?}` body.
pub async fn estimate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EstimationRequest>, JsonRejection>,
) -> Result<Json<EstimationResult>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let input = EstimationInput::try_from(request)?;

    tracing::info!(
        "Estimate requested: objective={}, budget={}",
        input.objective,
        input.budget
    );

    let result = run_estimate(&state, input).await?;

    tracing::debug!(
        "Estimate computed: impressions={}, clicks={}, conversions={}",
        result.estimated_impressions,
        result.estimated_clicks,
        result.estimated_conversions
    );

    Ok(Json(result))
}

/// GET /api/v1/predict?objective=...&spend=...
///
/// Estimate from catalog defaults only.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PredictParams>, QueryRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    tracing::info!(
        "Prediction requested: objective={}, spend={}",
        params.objective,
        params.spend
    );

    let input = EstimationInput::new(params.objective, params.spend);
    let metrics = run_estimate(&state, input).await?;

    Ok(Json(PredictResponse { metrics }))
}
