use std::sync::Arc;

use axum::{
    Json, Router,
    extract::MatchedPath,
    http::{HeaderName, Method, Request, Response, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::{config::Config, generate::generate_recipe_handler, upstream::ChatBackend};

/// State shared by every request. Nothing in it is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<dyn ChatBackend>,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate-recipe", post(generate_recipe_handler))
        .route("/health", get(health))
        .layer(cors_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());
                    tracing::info_span!("http_request", method = %request.method(), path = %path)
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(|response: &Response<_>, latency: std::time::Duration, _span: &Span| {
                    let status = response.status().as_u16();
                    if status >= 500 {
                        tracing::error!(status, latency_ms = latency.as_millis() as u64, "request failed");
                    } else {
                        tracing::info!(status, latency_ms = latency.as_millis() as u64, "request completed");
                    }
                }),
        )
        .with_state(state)
}

/// Any origin may call the generation endpoint. Preflight requests are
/// answered by the layer itself with an empty body.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
