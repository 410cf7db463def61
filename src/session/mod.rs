//! Cockpit session management
//!
//! This module provides the `CockpitSession` controller that manages:
//! - Lead context lookup (connecting → live)
//! - The guidance push channel and its intervention cards
//! - Transcript and teleprompter state
//! - The interaction summary written when the call ends (live → ended)

mod config;
mod factory;
mod session;
mod state;
mod summary;

pub use config::{SessionConfig, DEFAULT_GREETING};
pub use factory::SessionFactory;
pub use session::{CockpitSession, Collaborators, EndedCall};
pub use state::{
    GuidanceHealth, InterventionCard, SessionEvent, SessionState, SessionStatus, Speaker,
    TranscriptEntry, CONNECTING_SCRIPT,
};
pub use summary::{build_interaction_record, render_greeting};
