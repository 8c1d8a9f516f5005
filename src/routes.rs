use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    engine::TriageEngine,
    error::{validation_error, AppError},
    types::{
        ModelInfoResponse, PredictRequest, PredictResponse, QuestionsQuery, QuestionsRequest,
        QuestionsResponse,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TriageEngine>,
    pub metrics: Option<PrometheusHandle>,
}

pub fn router(state: AppState, cors_permissive: bool) -> Router {
    let app = Router::new()
        .route("/predict", post(predict))
        .route("/questions", get(questions_get).post(questions_post))
        .route("/model", get(model_info))
        .route("/metrics", get(metrics))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    // A missing or unparsable body is treated like an empty rating map.
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            info!("Rejected prediction body: {}", rejection.body_text());
            PredictRequest::default()
        }
    };

    let top_3_diseases = state.engine.predict(request.symptom_ratings.as_ref())?;
    Ok(Json(PredictResponse { top_3_diseases }))
}

pub async fn questions_get(
    State(state): State<AppState>,
    Query(query): Query<QuestionsQuery>,
) -> Result<Json<QuestionsResponse>, AppError> {
    let symptom = query
        .symptom
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| validation_error("Please provide a symptom"))?;

    let questions = state.engine.questions([symptom], &mut rand::thread_rng());
    Ok(Json(QuestionsResponse { questions }))
}

pub async fn questions_post(
    State(state): State<AppState>,
    payload: Result<Json<QuestionsRequest>, JsonRejection>,
) -> Result<Json<QuestionsResponse>, AppError> {
    let symptoms = payload
        .ok()
        .and_then(|Json(request)| request.symptoms)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| validation_error("Please provide a list of symptoms"))?;

    let questions = state
        .engine
        .questions(symptoms.iter().map(String::as_str), &mut rand::thread_rng());
    Ok(Json(QuestionsResponse { questions }))
}

pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    Json(state.engine.model_info().clone())
}

pub async fn metrics(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
