use crate::session::{CockpitSession, SessionFactory};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active cockpit sessions (session_id → session)
    pub sessions: Arc<RwLock<HashMap<String, Arc<CockpitSession>>>>,

    /// Builds new sessions for the configured agent
    pub factory: SessionFactory,
}

impl AppState {
    pub fn new(factory: SessionFactory) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            factory,
        }
    }

    pub async fn session(&self, session_id: &str) -> Option<Arc<CockpitSession>> {
        self.sessions.read().await.get(session_id).cloned()
    }
}
