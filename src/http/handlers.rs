use super::state::AppState;
use crate::error::{SessionError, StoreError};
use crate::session::{InterventionCard, SessionStatus, TranscriptEntry};
use crate::store::{InteractionRecord, Lead};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub lead_id: String,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub status: SessionStatus,
    pub lead: Option<Lead>,
    pub current_script: String,
}

#[derive(Debug, Deserialize)]
pub struct UtteranceRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub session_id: String,
    pub status: SessionStatus,
    pub record: InteractionRecord,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn session_not_found(session_id: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("Session {} not found", session_id),
    )
}

fn session_error_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::LeadUnavailable {
            source: StoreError::NotFound(_),
            ..
        } => StatusCode::NOT_FOUND,
        SessionError::LeadUnavailable { .. } => StatusCode::BAD_GATEWAY,
        SessionError::LeadFetchTimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
        SessionError::NotLive(_) | SessionError::AlreadyEnded => StatusCode::CONFLICT,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /cockpit/sessions
/// Start a session for a lead and connect it
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Response {
    info!("Starting cockpit session for lead: {}", req.lead_id);

    let session = Arc::new(state.factory.create(&req.lead_id));

    if let Err(e) = session.connect().await {
        error!("Failed to start session for lead {}: {}", req.lead_id, e);
        return error_response(session_error_status(&e), e.to_string());
    }

    let snapshot = session.snapshot().await;
    let session_id = session.session_id().to_string();

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(session_id.clone(), session);
    }

    info!("Session {} started for lead {}", session_id, req.lead_id);

    (
        StatusCode::OK,
        Json(StartSessionResponse {
            session_id,
            status: snapshot.status,
            lead: snapshot.lead,
            current_script: snapshot.current_script,
        }),
    )
        .into_response()
}

/// GET /cockpit/sessions/:session_id
/// Full snapshot of a session
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.session(&session_id).await {
        Some(session) => (StatusCode::OK, Json(session.snapshot().await)).into_response(),
        None => session_not_found(&session_id),
    }
}

/// GET /cockpit/sessions/:session_id/transcript
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.session(&session_id).await {
        Some(session) => {
            let transcript: Vec<TranscriptEntry> = session.transcript().await;
            (StatusCode::OK, Json(transcript)).into_response()
        }
        None => session_not_found(&session_id),
    }
}

/// GET /cockpit/sessions/:session_id/interventions
pub async fn get_interventions(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.session(&session_id).await {
        Some(session) => {
            let cards: Vec<InterventionCard> = session.interventions().await;
            (StatusCode::OK, Json(cards)).into_response()
        }
        None => session_not_found(&session_id),
    }
}

/// POST /cockpit/sessions/:session_id/utterances
/// Record what the customer said and forward it to the guidance backend
pub async fn submit_utterance(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<UtteranceRequest>,
) -> Response {
    let Some(session) = state.session(&session_id).await else {
        return session_not_found(&session_id);
    };

    match session.submit_utterance(&req.text).await {
        Ok(Some(entry)) => (StatusCode::ACCEPTED, Json(entry)).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(session_error_status(&e), e.to_string()),
    }
}

/// POST /cockpit/sessions/:session_id/end
/// End the call; the interaction is logged in the background
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    info!("Ending session: {}", session_id);

    let Some(session) = state.session(&session_id).await else {
        return session_not_found(&session_id);
    };

    match session.end().await {
        Ok(ended) => {
            state.sessions.write().await.remove(&session_id);
            (
                StatusCode::OK,
                Json(EndSessionResponse {
                    session_id,
                    status: SessionStatus::Ended,
                    record: ended.record,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to end session {}: {}", session_id, e);
            error_response(session_error_status(&e), e.to_string())
        }
    }
}

/// DELETE /cockpit/sessions/:session_id
/// Leave the session without ending the call; nothing is logged
pub async fn leave_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let removed = state.sessions.write().await.remove(&session_id);
    let Some(session) = removed else {
        return session_not_found(&session_id);
    };

    session.leave().await;
    info!("Session {} closed without an interaction record", session_id);

    StatusCode::NO_CONTENT.into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
