use crate::channel::{CardKind, GuidanceMessage};
use crate::store::Lead;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Teleprompter text before the lead is loaded
pub const CONNECTING_SCRIPT: &str = "Connecting to Neural Core...";

/// Lifecycle of a cockpit session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Connecting,
    Live,
    Ended,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Connecting => "connecting",
            SessionStatus::Live => "live",
            SessionStatus::Ended => "ended",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Customer,
    Agent,
}

/// One line of the call transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Guidance card pushed by the AI backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionCard {
    pub kind: CardKind,
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Map<String, Value>>,
    pub received_at: DateTime<Utc>,
}

impl InterventionCard {
    /// Table rows as display strings, in the order the backend sent them
    pub fn table_rows(&self) -> Vec<(String, String)> {
        self.table
            .iter()
            .flatten()
            .map(|(label, value)| {
                let shown = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (label.clone(), shown)
            })
            .collect()
    }
}

/// Health of the guidance push channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum GuidanceHealth {
    Healthy,
    Degraded { reason: String },
}

/// Observable state of one cockpit session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub status: SessionStatus,
    pub lead: Option<Lead>,
    pub transcript: Vec<TranscriptEntry>,
    pub interventions: Vec<InterventionCard>,
    pub current_script: String,
    pub guidance: GuidanceHealth,
    /// Why the session is stuck in `connecting`, if the lead lookup failed
    pub blocked_reason: Option<String>,
    pub live_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Connecting,
            lead: None,
            transcript: Vec::new(),
            interventions: Vec::new(),
            current_script: CONNECTING_SCRIPT.to_string(),
            guidance: GuidanceHealth::Healthy,
            blocked_reason: None,
            live_at: None,
            ended_at: None,
        }
    }
}

impl SessionState {
    pub fn is_live(&self) -> bool {
        self.status == SessionStatus::Live
    }

    /// connecting → live with the resolved lead and greeting
    pub fn go_live(&mut self, lead: Lead, greeting: String, now: DateTime<Utc>) -> bool {
        if self.status != SessionStatus::Connecting {
            return false;
        }
        self.status = SessionStatus::Live;
        self.lead = Some(lead);
        self.current_script = greeting;
        self.blocked_reason = None;
        self.live_at = Some(now);
        true
    }

    pub fn block(&mut self, reason: String) {
        if self.status == SessionStatus::Connecting {
            self.blocked_reason = Some(reason);
        }
    }

    /// Append a customer line; timestamps are clamped so they never go backwards
    pub fn append_customer_line(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Option<TranscriptEntry> {
        if !self.is_live() {
            return None;
        }
        let timestamp = match self.transcript.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        let entry = TranscriptEntry {
            speaker: Speaker::Customer,
            text: text.to_string(),
            timestamp,
        };
        self.transcript.push(entry.clone());
        Some(entry)
    }

    /// Apply a pushed message; returns the new card for objection/fact messages
    pub fn apply_guidance(
        &mut self,
        message: GuidanceMessage,
        now: DateTime<Utc>,
    ) -> Option<InterventionCard> {
        if !self.is_live() {
            return None;
        }
        let (kind, payload) = message.into_card()?;
        let card = InterventionCard {
            kind,
            id: payload.id,
            title: payload.title,
            content: payload.content,
            table: payload.data.and_then(|data| data.table),
            received_at: now,
        };
        if !card.content.is_empty() {
            self.current_script = card.content.clone();
        }
        self.interventions.push(card.clone());
        Some(card)
    }

    /// Mark guidance degraded; the first reason sticks. Returns whether it changed.
    pub fn degrade(&mut self, reason: String) -> bool {
        if !self.is_live() || self.guidance != GuidanceHealth::Healthy {
            return false;
        }
        self.guidance = GuidanceHealth::Degraded { reason };
        true
    }

    /// live → ended
    pub fn end(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_live() {
            return false;
        }
        self.status = SessionStatus::Ended;
        self.ended_at = Some(now);
        true
    }

    /// Distinct objection titles in the order they were first raised
    pub fn objection_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = Vec::new();
        for card in &self.interventions {
            if card.kind != CardKind::Objection || card.title.is_empty() {
                continue;
            }
            if !topics.contains(&card.title) {
                topics.push(card.title.clone());
            }
        }
        topics
    }

    /// Whole seconds between going live and ending (or `now` while still live)
    pub fn duration_secs(&self, now: DateTime<Utc>) -> u64 {
        match self.live_at {
            Some(live_at) => {
                let until = self.ended_at.unwrap_or(now);
                until.signed_duration_since(live_at).num_seconds().max(0) as u64
            }
            None => 0,
        }
    }
}

/// Notifications for renderers subscribed to a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StatusChanged(SessionStatus),
    LeadBlocked(String),
    TranscriptAppended(TranscriptEntry),
    InterventionReceived(InterventionCard),
    ScriptUpdated(String),
    GuidanceDegraded(String),
    SummaryWritten,
    SummaryWriteFailed(String),
}
