use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Guidance card kinds the cockpit renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Objection,
    Fact,
}

/// Message pushed by the AI backend over the guidance channel
///
/// Only `objection` and `fact` carry meaning for the cockpit; any other
/// `type` (including the backend's `none`) deserializes to `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GuidanceMessage {
    Objection(CardPayload),
    Fact(CardPayload),
    #[serde(other)]
    Other,
}

impl GuidanceMessage {
    /// Split into card kind and payload, `None` for non-card messages
    pub fn into_card(self) -> Option<(CardKind, CardPayload)> {
        match self {
            GuidanceMessage::Objection(payload) => Some((CardKind::Objection, payload)),
            GuidanceMessage::Fact(payload) => Some((CardKind::Fact, payload)),
            GuidanceMessage::Other => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CardData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardData {
    /// Label → value pairs shown under the card (e.g. "FD Post-Tax" → "4.8%")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Map<String, Value>>,
}

/// Accepts strings, numbers and null (the backend is loose about ids and empty fields)
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Events delivered from the channel transport to the session
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Message(GuidanceMessage),
    /// Transport error; no further messages will arrive
    Fault(String),
    /// Remote side closed the channel
    Closed,
}
