use super::records::LeadSummary;
use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

/// Client for the AI backend's request/response endpoints
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    api_url: String,
}

impl BackendClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Leads assigned to an agent, enriched with the backend's pitch tag
    pub async fn agent_leads(&self, agent_id: &str) -> Result<Vec<LeadSummary>> {
        let url = format!("{}/agent/{}/leads", self.api_url, agent_id);

        let leads: Vec<LeadSummary> = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach backend at {}", url))?
            .error_for_status()
            .context("Backend rejected lead listing")?
            .json()
            .await
            .context("Failed to decode lead listing")?;

        info!("Fetched {} leads for agent {}", leads.len(), agent_id);

        Ok(leads)
    }
}
