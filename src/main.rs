use garden_quiz_backend::{
    api::{self, AppState},
    bind_first_free,
    config::Config,
    gemini::GeminiClient,
    metrics,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load();
    metrics::register_metrics();

    if config.gemini.api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; question generation requests will fail");
    }

    let state = AppState::new(GeminiClient::new(config.gemini.clone()), config.static_dir.clone());
    let app = api::router(state);

    let listener = bind_first_free(config.port, config.port_search_span)
        .await
        .unwrap_or_else(|e| {
            panic!(
                "No free port in {}..{}: {e}",
                config.port,
                config.port.saturating_add(config.port_search_span)
            )
        });
    let addr = listener.local_addr().expect("Failed to read bound address");

    tracing::info!("Garden quiz backend listening on http://localhost:{}", addr.port());
    tracing::info!("Question API: http://localhost:{}/generate_questions", addr.port());
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
