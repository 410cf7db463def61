use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Greeting shown on the teleprompter when the call goes live
pub const DEFAULT_GREETING: &str =
    "Hi {lead}, this is {agent}. I noticed you're eligible for a portfolio upgrade.";

/// Configuration for a cockpit session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "cockpit-<uuid>")
    pub session_id: String,

    /// Upper bound on the initial lead lookup
    /// Default: 10 seconds
    pub lead_fetch_timeout: Duration,

    /// Teleprompter greeting; `{lead}` and `{agent}` are replaced with first names
    pub greeting_template: String,

    /// Outcome written to the interaction log when the call ends
    pub outcome: String,

    /// Sentiment written to the interaction log when the call ends
    pub sentiment: String,
}

impl SessionConfig {
    /// Same settings under a freshly generated session id
    pub fn with_new_id(&self) -> Self {
        Self {
            session_id: new_session_id(),
            ..self.clone()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: new_session_id(),
            lead_fetch_timeout: Duration::from_secs(10),
            greeting_template: DEFAULT_GREETING.to_string(),
            outcome: "Converted".to_string(),
            sentiment: "Positive".to_string(),
        }
    }
}

fn new_session_id() -> String {
    format!("cockpit-{}", uuid::Uuid::new_v4())
}
