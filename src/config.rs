use crate::session::{SessionConfig, DEFAULT_GREETING};
use crate::store::Principal;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    /// Agent the cockpit runs as
    pub agent: Principal,
    pub store: StoreConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    pub api_url: String,
    pub guidance_ws_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub lead_fetch_timeout_secs: u64,
    pub greeting_template: String,
    pub outcome: String,
    pub sentiment: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            lead_fetch_timeout_secs: 10,
            greeting_template: DEFAULT_GREETING.to_string(),
            outcome: "Converted".to_string(),
            sentiment: "Positive".to_string(),
        }
    }
}

impl Config {
    /// Load `path` (any format the `config` crate recognises), then apply
    /// `COCKPIT__SECTION__KEY` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("COCKPIT").separator("__"))
            .build()
            .with_context(|| format!("Failed to read config {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid cockpit configuration")
    }

    /// Session settings for a new session (the id is generated per session)
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            lead_fetch_timeout: Duration::from_secs(self.session.lead_fetch_timeout_secs),
            greeting_template: self.session.greeting_template.clone(),
            outcome: self.session.outcome.clone(),
            sentiment: self.session.sentiment.clone(),
            ..SessionConfig::default()
        }
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.service.http.bind, self.service.http.port)
    }
}
