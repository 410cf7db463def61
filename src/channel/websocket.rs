use super::link::{ChannelLink, GuidanceConnector, CHANNEL_CAPACITY};
use super::messages::{ChannelEvent, GuidanceMessage};
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Guidance channel over the backend's cockpit websocket
pub struct WsGuidanceConnector {
    url: String,
}

impl WsGuidanceConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait::async_trait]
impl GuidanceConnector for WsGuidanceConnector {
    async fn open(&self, session_id: &str) -> Result<ChannelLink> {
        info!("Opening guidance channel for {} at {}", session_id, self.url);

        let (ws_stream, _) = connect_async(self.url.as_str())
            .await
            .with_context(|| format!("Failed to connect guidance websocket: {}", self.url))?;
        let (mut ws_writer, mut ws_reader) = ws_stream.split();

        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
        let (incoming_tx, incoming_rx) = mpsc::channel::<ChannelEvent>(CHANNEL_CAPACITY);

        // Writer runs until the session drops its sender, then closes the socket
        let writer_session = session_id.to_string();
        tokio::spawn(async move {
            while let Some(text) = outgoing_rx.recv().await {
                if let Err(e) = ws_writer.send(Message::Text(text)).await {
                    warn!("Guidance send failed for {}: {}", writer_session, e);
                    break;
                }
            }
            if let Err(e) = ws_writer.close().await {
                debug!("Guidance close for {} failed: {}", writer_session, e);
            }
            debug!("Guidance writer for {} stopped", writer_session);
        });

        let reader_session = session_id.to_string();
        let reader = tokio::spawn(async move {
            let terminal = loop {
                let event = match ws_reader.next().await {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<GuidanceMessage>(&text) {
                            Ok(message) => ChannelEvent::Message(message),
                            Err(e) => {
                                warn!("Skipping malformed guidance message: {}", e);
                                continue;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break ChannelEvent::Closed,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => break ChannelEvent::Fault(e.to_string()),
                };
                if incoming_tx.send(event).await.is_err() {
                    return;
                }
            };
            let _ = incoming_tx.send(terminal).await;
            debug!("Guidance reader for {} stopped", reader_session);
        });

        Ok(ChannelLink::new(outgoing_tx, incoming_rx).with_task(reader))
    }

    fn name(&self) -> &str {
        "websocket"
    }
}
