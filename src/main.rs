mod analytics;
mod classify;
mod config;
mod content;
mod crypto;
mod error;
mod handlers;
mod input;
mod models;
mod ocr;
mod pipeline;
mod session;
mod state;
mod templates;

use axum::error_handling::HandleErrorLayer;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower::buffer::BufferLayer;
use tower::limit::RateLimitLayer;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::handlers::analyze::MAX_ANALYZE_BODY_BYTES;
use crate::ocr::MAX_IMAGE_BYTES;
use crate::pipeline::Analyzer;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    info!("[riskscan] Starting riskscan server");
    info!("[riskscan] Model directory: {:?}", config.model_dir);
    match &config.ocr_url {
        Some(url) => info!("[riskscan] OCR sidecar: {}", url),
        None => info!("[riskscan] OCR disabled (OCR_URL not set)"),
    }

    // No inference can happen without the model, so a load failure is fatal.
    info!("[riskscan] Loading model and vocabulary...");
    let analyzer = match Analyzer::load(&config) {
        Ok(a) => a,
        Err(e) => {
            error!("[riskscan] {}", e);
            std::process::exit(1);
        }
    };
    if let Some(hash) = analyzer.fingerprint() {
        info!("[riskscan] Model hash: {}", hash);
    }

    let state = AppState::new(config.clone(), analyzer);

    // Sessions end after SESSION_TTL of inactivity.
    let sessions = state.sessions.clone();
    let ttl = config.session_ttl;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(600));
        loop {
            interval.tick().await;
            sessions.cleanup_idle(ttl);
        }
    });

    let app = app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("[riskscan] Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    let cors = if let Some(ref origins) = state.config.cors_origins {
        let origins: Vec<_> = origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let analyze_rate_limit = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|_: tower::BoxError| async {
            StatusCode::TOO_MANY_REQUESTS
        }))
        .layer(BufferLayer::new(64))
        .layer(RateLimitLayer::new(60, Duration::from_secs(60)));

    let sample_rate_limit = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|_: tower::BoxError| async {
            StatusCode::TOO_MANY_REQUESTS
        }))
        .layer(BufferLayer::new(32))
        .layer(RateLimitLayer::new(30, Duration::from_secs(60)));

    let ocr_rate_limit = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|_: tower::BoxError| async {
            StatusCode::TOO_MANY_REQUESTS
        }))
        .layer(BufferLayer::new(8))
        .layer(RateLimitLayer::new(10, Duration::from_secs(60)));

    Router::new()
        .route("/", get(playground))
        .route("/health", get(handlers::health::health))
        .route("/model", get(handlers::models::model_info))
        .route("/samples", get(handlers::samples::list_samples))
        .route("/resources", get(handlers::samples::list_resources))
        .route("/sessions", post(handlers::sessions::create_session))
        .route(
            "/sessions/{id}",
            axum::routing::delete(handlers::sessions::end_session),
        )
        .route(
            "/sessions/{id}/analyze",
            post(handlers::analyze::analyze)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::max(MAX_ANALYZE_BODY_BYTES))
                .layer(analyze_rate_limit),
        )
        .route(
            "/sessions/{id}/samples/{index}",
            post(handlers::samples::analyze_sample).layer(sample_rate_limit),
        )
        .route(
            "/sessions/{id}/ocr",
            post(handlers::ocr::analyze_image)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024))
                .layer(ocr_rate_limit),
        )
        .route("/sessions/{id}/clear", post(handlers::sessions::clear_session))
        .route(
            "/sessions/{id}/analytics",
            get(handlers::sessions::get_analytics),
        )
        .route("/sessions/{id}/summary", get(handlers::sessions::summary))
        .layer(cors)
        .with_state(state)
}

async fn playground(State(state): State<AppState>) -> Html<String> {
    Html(templates::playground::render(state.config.static_dir.as_deref()))
}
