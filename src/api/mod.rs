// HTTP API routes: question generation, health, service info, static game files.

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{
        header::{CACHE_CONTROL, PRAGMA},
        HeaderValue, StatusCode,
    },
    handler::HandlerWithoutStateExt,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer};

use crate::error::QuizError;
use crate::gemini::GeminiClient;
use crate::metrics;
use crate::quiz::{self, Envelope, GenerateQuestionsRequest, QuizConfig};

pub const SERVICE_NAME: &str = "garden-quiz-backend";

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub gemini: Arc<GeminiClient>,
    /// Game asset directory; `None` disables static file serving.
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(gemini: GeminiClient, static_dir: Option<PathBuf>) -> Self {
        AppState {
            gemini: Arc::new(gemini),
            static_dir,
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/generate_questions", post(generate_questions))
        .route("/health", get(health_check))
        .route("/api/info", get(api_info))
        .route("/metrics", get(metrics_text));

    let routes = match state.static_dir.clone() {
        Some(dir) => {
            tracing::info!("Serving game files from {}", dir.display());
            let files = ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    CACHE_CONTROL,
                    HeaderValue::from_static("no-cache, no-store, must-revalidate"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    PRAGMA,
                    HeaderValue::from_static("no-cache"),
                ))
                .service(ServeDir::new(dir).not_found_service(not_found.into_service()));
            routes.fallback_service(files)
        }
        None => routes.route("/", get(api_info)).fallback(not_found),
    };

    routes
        .with_state(state)
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(CorsLayer::permissive())
}

// ── Error helper ──────────────────────────────────────────────────────

fn failure(err: QuizError) -> Response {
    match &err {
        QuizError::InvalidRequest(_) | QuizError::NotConfigured => {
            tracing::warn!("Rejected question request: {err}")
        }
        _ => tracing::warn!("Question generation failed: {err}"),
    }
    metrics::QUESTION_REQUESTS_TOTAL
        .with_label_values(&[err.kind()])
        .inc();
    (err.status_code(), Json(Envelope::failure(&err))).into_response()
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn generate_questions(
    State(state): State<AppState>,
    payload: Result<Json<GenerateQuestionsRequest>, JsonRejection>,
) -> Response {
    let config = match payload
        .map_err(|rejection| QuizError::InvalidRequest(rejection.body_text()))
        .and_then(|Json(req)| {
            tracing::info!(
                "Question request: grade={}, subject={}, custom_content={:?}, count={}",
                req.grade,
                req.subject,
                req.custom_content.as_deref().unwrap_or(""),
                req.questions_count
            );
            QuizConfig::try_from(req)
        }) {
        Ok(config) => config,
        Err(e) => return failure(e),
    };

    match quiz::generate_questions(&state.gemini, &config).await {
        Ok(questions) => {
            metrics::QUESTION_REQUESTS_TOTAL
                .with_label_values(&["success"])
                .inc();
            (StatusCode::OK, Json(Envelope::success(&config, questions))).into_response()
        }
        Err(e) => failure(e),
    }
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let mut services = vec!["ai_questions"];
    if state.static_dir.is_some() {
        services.insert(0, "game_files");
    }
    Json(json!({ "status": "ok", "service": SERVICE_NAME, "services": services }))
}

async fn api_info(State(state): State<AppState>) -> Json<Value> {
    let mut endpoints = vec![
        "POST /generate_questions - generate a personalised question set",
        "GET /health - health check",
        "GET /api/info - service information",
        "GET /metrics - Prometheus metrics",
    ];
    if state.static_dir.is_some() {
        endpoints.push("GET /* - game file service");
    }
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.gemini.config().model,
        "endpoints": endpoints,
    }))
}

async fn metrics_text() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics::gather_metrics(),
    )
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
