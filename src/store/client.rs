use super::records::{InteractionRecord, Lead};
use crate::error::StoreError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, info};

/// Read access to lead context
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn get_lead(&self, lead_id: &str) -> Result<Lead, StoreError>;
}

/// Durable log of finished calls
#[async_trait]
pub trait InteractionLog: Send + Sync {
    async fn append_interaction(&self, record: &InteractionRecord) -> Result<(), StoreError>;
}

/// REST client for a PostgREST-style hosted store (`/rest/v1/<table>`)
#[derive(Clone)]
pub struct RestStore {
    http: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(
        http: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            api_key: api_key.into(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        code: status.as_u16(),
        body,
    })
}

#[async_trait]
impl LeadStore for RestStore {
    async fn get_lead(&self, lead_id: &str) -> Result<Lead, StoreError> {
        debug!("Fetching lead {}", lead_id);

        let filter = format!("eq.{}", lead_id);
        let response = self
            .authorized(self.http.get(self.table_url("investors")))
            .query(&[("investor_id", filter.as_str()), ("select", "*")])
            .send()
            .await?;

        let rows: Vec<Lead> = check_status(response).await?.json().await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(lead_id.to_string()))
    }
}

#[async_trait]
impl InteractionLog for RestStore {
    async fn append_interaction(&self, record: &InteractionRecord) -> Result<(), StoreError> {
        let response = self
            .authorized(self.http.post(self.table_url("interactions")))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        check_status(response).await?;

        info!(
            "Logged interaction for lead {} (outcome={}, duration={}s)",
            record.investor_id, record.outcome, record.duration_sec
        );

        Ok(())
    }
}
