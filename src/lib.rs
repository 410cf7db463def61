pub mod channel;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod store;

pub use channel::{
    ChannelEvent, ChannelLink, GuidanceConnector, GuidanceMessage, WsGuidanceConnector,
};
pub use config::Config;
pub use error::{SessionError, StoreError};
pub use http::{create_router, AppState};
pub use session::{
    CockpitSession, Collaborators, EndedCall, InterventionCard, SessionConfig, SessionEvent,
    SessionFactory, SessionState, SessionStatus, TranscriptEntry,
};
pub use store::{
    BackendClient, InteractionLog, InteractionRecord, Lead, LeadStore, Principal, RestStore,
};
