use super::config::SessionConfig;
use super::session::{CockpitSession, Collaborators};
use crate::store::Principal;

/// Builds sessions for one signed-in agent against a fixed set of collaborators
#[derive(Clone)]
pub struct SessionFactory {
    template: SessionConfig,
    principal: Principal,
    collaborators: Collaborators,
}

impl SessionFactory {
    pub fn new(
        template: SessionConfig,
        principal: Principal,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            template,
            principal,
            collaborators,
        }
    }

    /// New `connecting` session for `lead_id` with its own session id
    pub fn create(&self, lead_id: &str) -> CockpitSession {
        CockpitSession::new(
            self.template.with_new_id(),
            self.principal.clone(),
            lead_id,
            self.collaborators.clone(),
        )
    }
}
