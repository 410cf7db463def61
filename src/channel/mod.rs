//! Guidance push channel
//!
//! One channel per live session. Utterance text goes out, tagged guidance
//! messages come back and are drained by the session in arrival order.

pub mod link;
pub mod messages;
pub mod websocket;

pub use link::{ChannelGuard, ChannelLink, GuidanceConnector, CHANNEL_CAPACITY};
pub use messages::{CardData, CardKind, CardPayload, ChannelEvent, GuidanceMessage};
pub use websocket::WsGuidanceConnector;
