use super::config::SessionConfig;
use super::state::SessionState;
use crate::store::{InteractionRecord, Principal};
use chrono::{DateTime, Utc};

/// Fill the greeting template with the lead's and agent's first names
pub fn render_greeting(template: &str, lead_first_name: &str, agent_first_name: &str) -> String {
    template
        .replace("{lead}", lead_first_name)
        .replace("{agent}", agent_first_name)
}

/// Interaction log row for a call that just ended
pub fn build_interaction_record(
    config: &SessionConfig,
    principal: &Principal,
    lead_id: &str,
    state: &SessionState,
    now: DateTime<Utc>,
) -> InteractionRecord {
    InteractionRecord {
        investor_id: lead_id.to_string(),
        agent_id: principal.id.clone(),
        date: now.format("%Y-%m-%d").to_string(),
        outcome: config.outcome.clone(),
        objections_raised: state.objection_topics(),
        duration_sec: state.duration_secs(now),
        sentiment: config.sentiment.clone(),
    }
}
