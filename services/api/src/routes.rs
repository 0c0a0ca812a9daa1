use crate::infra::{deserialize_optional_date, AppState, SafetyState};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use salmeen::error::AppError;
use salmeen::safety::{
    calculate_score, generate_recommendations, score_breakdown, validate_batch, DriverReport,
    DrivingRecord, MinistryOverview, RiskVerdictView, ScoreBreakdown, ScoreCategory,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct BatchRequest {
    pub(crate) records: Vec<DrivingRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationRequest {
    pub(crate) records: Vec<DrivingRecord>,
    #[serde(default)]
    pub(crate) score: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportRequest {
    pub(crate) records: Vec<DrivingRecord>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) window_days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    pub(crate) score: f64,
    pub(crate) category: ScoreCategory,
    pub(crate) category_label: &'static str,
    pub(crate) color: &'static str,
    pub(crate) breakdown: ScoreBreakdown,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecommendationResponse {
    pub(crate) score: f64,
    pub(crate) recommendations: Vec<String>,
}

pub(crate) fn safety_router(state: SafetyState) -> Router {
    Router::new()
        .route("/api/v1/safety/score", post(score_endpoint))
        .route("/api/v1/safety/risk", post(risk_endpoint))
        .route(
            "/api/v1/safety/recommendations",
            post(recommendations_endpoint),
        )
        .route("/api/v1/safety/report", post(report_endpoint))
        .route("/api/v1/ministry/overview", get(ministry_overview_endpoint))
        .with_state(state)
}

pub(crate) fn with_safety_routes(state: SafetyState) -> Router {
    safety_router(state)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn score_endpoint(
    Json(payload): Json<BatchRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    validate_batch(&payload.records)?;

    let breakdown = score_breakdown(&payload.records);
    let category = ScoreCategory::from_score(breakdown.score);

    Ok(Json(ScoreResponse {
        score: breakdown.score,
        category,
        category_label: category.label(),
        color: category.color().hex(),
        breakdown,
    }))
}

pub(crate) async fn risk_endpoint(
    State(state): State<SafetyState>,
    Json(payload): Json<BatchRequest>,
) -> Result<Json<RiskVerdictView>, AppError> {
    validate_batch(&payload.records)?;
    Ok(Json(state.predictor.predict(&payload.records).view()))
}

pub(crate) async fn recommendations_endpoint(
    Json(payload): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    validate_batch(&payload.records)?;

    let score = payload
        .score
        .unwrap_or_else(|| calculate_score(&payload.records));
    let recommendations = generate_recommendations(&payload.records, score);

    Ok(Json(RecommendationResponse {
        score,
        recommendations,
    }))
}

pub(crate) async fn report_endpoint(
    State(state): State<SafetyState>,
    Json(payload): Json<ReportRequest>,
) -> Result<Json<DriverReport>, AppError> {
    validate_batch(&payload.records)?;

    let today = payload.today.unwrap_or_else(|| Local::now().date_naive());
    let window_days = payload.window_days.unwrap_or(state.window_days);

    Ok(Json(DriverReport::build(
        &payload.records,
        today,
        window_days,
        &state.predictor,
    )))
}

pub(crate) async fn ministry_overview_endpoint(
    State(state): State<SafetyState>,
) -> Json<MinistryOverview> {
    Json(MinistryOverview::build(&state.dataset, &state.predictor))
}
