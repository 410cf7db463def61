use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/cockpit/sessions", post(handlers::start_session))
        .route(
            "/cockpit/sessions/:session_id",
            get(handlers::get_session).delete(handlers::leave_session),
        )
        .route(
            "/cockpit/sessions/:session_id/utterances",
            post(handlers::submit_utterance),
        )
        .route(
            "/cockpit/sessions/:session_id/end",
            post(handlers::end_session),
        )
        // Session queries
        .route(
            "/cockpit/sessions/:session_id/transcript",
            get(handlers::get_transcript),
        )
        .route(
            "/cockpit/sessions/:session_id/interventions",
            get(handlers::get_interventions),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
