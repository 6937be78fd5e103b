//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::{handlers, models::SearchParams};
use crate::session::SearchSession;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SearchSession>,
}

/// Routes with CORS and request tracing
pub fn router(session: Arc<SearchSession>) -> Router {
    // Browser front ends are served from elsewhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))
        .route("/api/courses", get(courses_handler))
        .route("/api/search", get(search_handler))
        .with_state(AppState { session })
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Configure and start the HTTP server
pub async fn start_http_server(session: Arc<SearchSession>, port: u16) -> Result<()> {
    let app = router(session);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("🌐 API server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match handlers::health_check(&state.session).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Course listing handler
async fn courses_handler(State(state): State<AppState>) -> impl IntoResponse {
    match handlers::list_courses(&state.session).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Search handler
async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    match handlers::search(&state.session, &params).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e),
    }
}

fn error_response(status: StatusCode, e: anyhow::Error) -> axum::response::Response {
    (status, Json(serde_json::json!({"error": e.to_string()}))).into_response()
}
