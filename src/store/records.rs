use serde::{Deserialize, Serialize};

/// Lead row as stored in the `investors` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(rename = "investor_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub occupation: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub risk_appetite: Option<String>,
}

impl Lead {
    /// First word of the display name, used when greeting the lead
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// Lead as returned by the backend's agent listing, with the AI pitch tag attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadSummary {
    #[serde(flatten)]
    pub lead: Lead,
    #[serde(default)]
    pub ai_strategy_tag: Option<String>,
    #[serde(default)]
    pub match_score: Option<u32>,
}

/// Row written to the `interactions` table when a call ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub investor_id: String,
    pub agent_id: String,
    /// Calendar date of the call (YYYY-MM-DD)
    pub date: String,
    pub outcome: String,
    pub objections_raised: Vec<String>,
    pub duration_sec: u64,
    pub sentiment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Agent,
    Admin,
}

/// Signed-in user driving the cockpit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Principal {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}
