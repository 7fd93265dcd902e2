use axum::{extract::Request, http::StatusCode, response::IntoResponse, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::search::MovieFetchController;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub controller: Arc<MovieFetchController>,
}

impl AppState {
    pub fn new(config: Config, controller: Arc<MovieFetchController>) -> Self {
        Self {
            config: Arc::new(config),
            controller,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/movies", get(crate::api::search_movies))
        .route("/api/trending", get(crate::api::trending));

    Router::new()
        .route("/", get(crate::api::index))
        .route("/robots.txt", get(robots_txt_handler))
        .merge(api_routes)
        .fallback(fallback_handler)
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn robots_txt_handler() -> &'static str {
    "User-agent: *\nDisallow: /\n"
}

async fn fallback_handler(req: Request<axum::body::Body>) -> impl IntoResponse {
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}
