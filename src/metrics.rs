// Prometheus metrics definitions for the quiz backend.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Counters ─────────────────────────────────────────────────────

    /// Question-generation requests, by outcome (`success` or an error kind).
    pub static ref QUESTION_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("garden_quiz_question_requests_total", "Question generation requests"),
        &["outcome"],
    )
    .unwrap();

    /// Validated questions handed back to clients.
    pub static ref QUESTIONS_RETURNED_TOTAL: IntCounter = IntCounter::new(
        "garden_quiz_questions_returned_total",
        "Validated questions returned",
    )
    .unwrap();

    /// Total API requests, by method/endpoint/status.
    pub static ref API_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("garden_quiz_api_requests_total", "Total API requests"),
        &["method", "endpoint", "status"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// Time spent waiting on the generation API.
    pub static ref UPSTREAM_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "garden_quiz_upstream_duration_seconds",
            "Gemini API call duration in seconds",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 45.0, 60.0]),
    )
    .unwrap();

    /// API request duration in seconds, by endpoint.
    pub static ref API_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "garden_quiz_api_request_duration_seconds",
            "API request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0, 30.0]),
        &["endpoint"],
    )
    .unwrap();
}

/// Register all metrics with the custom registry. Call once at startup.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(QUESTION_REQUESTS_TOTAL.clone()),
        Box::new(QUESTIONS_RETURNED_TOTAL.clone()),
        Box::new(API_REQUESTS_TOTAL.clone()),
        Box::new(UPSTREAM_DURATION_SECONDS.clone()),
        Box::new(API_REQUEST_DURATION_SECONDS.clone()),
    ];

    for c in collectors {
        if let Err(e) = REGISTRY.register(c) {
            tracing::warn!("Metric registration skipped: {e}");
        }
    }
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Label for a request path. Static assets collapse into one bucket so the
/// label set stays bounded.
pub fn normalize_path(path: &str) -> String {
    match path {
        "/generate_questions" | "/health" | "/api/info" | "/metrics" | "/" => path.to_string(),
        _ if path.starts_with("/api/") => "/api/:other".to_string(),
        _ => "/static".to_string(),
    }
}

/// Middleware recording request count and latency.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let endpoint = normalize_path(req.uri().path());
    let started = Instant::now();

    let response = next.run(req).await;

    API_REQUEST_DURATION_SECONDS
        .with_label_values(&[endpoint.as_str()])
        .observe(started.elapsed().as_secs_f64());
    API_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), endpoint.as_str(), response.status().as_str()])
        .inc();
    response
}
