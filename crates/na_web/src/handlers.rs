use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use na_core::{AnalysisResult, Article, HealthStatus, Prediction, Query};
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(HealthStatus::ok(format!(
        "News analysis API is running ({})",
        state.inference.describe()
    )))
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(query): Json<Query>,
) -> Result<Json<Prediction>, ApiError> {
    let prediction = state.inference.predict(&query.text).await?;
    Ok(Json(prediction))
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(query): Json<Query>,
) -> Result<Json<AnalysisResult>, ApiError> {
    info!("🔍 Analyzing {} chars", query.text.chars().count());
    let result = state.inference.analyze(&query.text).await?;
    Ok(Json(result))
}

pub async fn fetch_sample(State(state): State<Arc<AppState>>) -> Json<Vec<Article>> {
    Json(state.feeds.fetch_sample().await)
}
