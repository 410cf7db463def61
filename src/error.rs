use std::time::Duration;
use thiserror::Error;

use crate::session::SessionStatus;

/// Failures talking to the lead store / interaction log
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("lead {0} not found")]
    NotFound(String),

    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("store returned {code}: {body}")]
    Status { code: u16, body: String },
}

/// Failures surfaced by the cockpit session controller
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("lead {lead_id} unavailable: {source}")]
    LeadUnavailable {
        lead_id: String,
        #[source]
        source: StoreError,
    },

    #[error("lead {lead_id} fetch timed out after {timeout:?}")]
    LeadFetchTimedOut { lead_id: String, timeout: Duration },

    #[error("session is {0}, not live")]
    NotLive(SessionStatus),

    #[error("call already ended")]
    AlreadyEnded,
}

impl SessionError {
    /// Whether the error came from the lead lookup (session stays blocked in `connecting`)
    pub fn is_lead_failure(&self) -> bool {
        matches!(
            self,
            SessionError::LeadUnavailable { .. } | SessionError::LeadFetchTimedOut { .. }
        )
    }
}
