//! Remote data collaborators
//!
//! - `LeadStore`: read lead context by id
//! - `InteractionLog`: append the summary of a finished call
//! - `RestStore`: both of the above over the hosted REST store
//! - `BackendClient`: the AI backend's lead listing

pub mod backend;
pub mod client;
pub mod records;

pub use backend::BackendClient;
pub use client::{InteractionLog, LeadStore, RestStore};
pub use records::{InteractionRecord, Lead, LeadSummary, Principal, Role};
