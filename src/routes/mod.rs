//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket game/speech session at `/ws`
/// - AAC, i18n, dataset, auth, and therapy-store endpoints
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // Health
        .route("/health", get(http::http_health))
        // AAC board
        .route("/aac/categories", get(http::http_aac_categories))
        .route("/aac/board", get(http::http_aac_board))
        // i18n
        .route("/i18n/translate", post(http::http_translate))
        .route("/i18n/tts", post(http::http_tts))
        .route("/i18n/suggestions", get(http::http_suggestions))
        // Dataset inventory
        .route("/datasets", get(http::http_datasets))
        .route("/datasets/:name/samples", get(http::http_dataset_samples))
        .route("/datasets/:name/refresh", post(http::http_dataset_refresh))
        // Activity planning
        .route("/ml/suggest", post(http::http_suggest_plan))
        // Auth
        .route("/auth/login", post(http::http_login))
        .route("/auth/logout", post(http::http_logout))
        .route("/auth/session", get(http::http_session))
        // Therapy store
        .route(
            "/therapy/learners",
            get(http::http_list_learners).post(http::http_create_learner),
        )
        .route(
            "/therapy/learners/:id",
            patch(http::http_update_learner).delete(http::http_delete_learner),
        )
        .route(
            "/therapy/activities",
            get(http::http_list_activities).post(http::http_create_activity),
        )
        .route(
            "/therapy/activities/:id",
            get(http::http_get_activity)
                .patch(http::http_update_activity)
                .delete(http::http_delete_activity),
        )
        .route("/therapy/activities/:id/assignable", get(http::http_assignable_learners))
        .route(
            "/therapy/assignments",
            get(http::http_list_assignments).post(http::http_create_assignment),
        )
        .route("/therapy/assignments/:id", patch(http::http_update_assignment))
        .route("/therapy/assignments/:id/status", post(http::http_update_assignment_status))
        .route("/therapy/progress", get(http::http_progress))
        .route("/therapy/reports/activity", post(http::http_activity_report))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
