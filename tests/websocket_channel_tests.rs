// Tests for the websocket guidance channel against a local stand-in backend
//
// The stand-in mirrors the cockpit socket's fast path: mentions of fixed
// deposits get an FD comparison card, long lines get a generic objection.

mod common;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use common::{next_matching, principal, Fixture};
use serde_json::json;
use sipbrain_cockpit::channel::CardKind;
use sipbrain_cockpit::{
    ChannelEvent, CockpitSession, Collaborators, GuidanceConnector, GuidanceMessage,
    SessionConfig, SessionEvent, WsGuidanceConnector,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

async fn cockpit_socket(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(handle_socket)
}

async fn handle_socket(mut socket: WebSocket) {
    while let Some(Ok(msg)) = socket.recv().await {
        let Message::Text(text) = msg else { continue };
        let lower = text.to_lowercase();

        let reply = if lower == "bye" {
            let _ = socket.send(Message::Close(None)).await;
            return;
        } else if lower == "garbage" {
            let _ = socket.send(Message::Text("not json".to_string())).await;
            json!({"type": "none", "title": "", "content": ""})
        } else if lower.contains("fd") || lower.contains("fixed deposit") {
            json!({
                "id": "4821",
                "type": "fact",
                "title": "FD vs Mutual Fund",
                "content": "FDs are taxed. MFs are efficient.",
                "data": {"table": {"FD Post-Tax": "4.8%", "Hybrid": "11.2%"}}
            })
        } else if text.len() > 15 {
            json!({
                "id": "1001",
                "type": "objection",
                "title": "Price Concern",
                "content": "Offer SIP top-up"
            })
        } else {
            continue;
        };

        if socket.send(Message::Text(reply.to_string())).await.is_err() {
            return;
        }
    }
}

async fn spawn_guidance_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/ws/cockpit", get(cockpit_socket));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("ws://{}/ws/cockpit", addr)
}

async fn next_event(incoming: &mut tokio::sync::mpsc::Receiver<ChannelEvent>) -> ChannelEvent {
    tokio::time::timeout(Duration::from_secs(2), incoming.recv())
        .await
        .expect("timed out waiting for channel event")
        .expect("channel closed")
}

#[tokio::test]
async fn test_utterance_round_trip_yields_card() {
    let url = spawn_guidance_server().await;
    let connector = WsGuidanceConnector::new(url);

    let link = connector.open("cockpit-test").await.unwrap();
    let (outgoing, mut incoming, _guard) = link.into_parts();

    outgoing
        .send("I already have a fixed deposit".to_string())
        .await
        .unwrap();

    let ChannelEvent::Message(message) = next_event(&mut incoming).await else {
        panic!("expected a guidance message");
    };
    let (kind, payload) = message.into_card().unwrap();
    assert_eq!(kind, CardKind::Fact);
    assert_eq!(payload.id, "4821");
    assert_eq!(payload.title, "FD vs Mutual Fund");
}

#[tokio::test]
async fn test_malformed_frames_are_skipped() {
    let url = spawn_guidance_server().await;
    let link = WsGuidanceConnector::new(url).open("cockpit-test").await.unwrap();
    let (outgoing, mut incoming, _guard) = link.into_parts();

    outgoing.send("garbage".to_string()).await.unwrap();

    assert_eq!(
        next_event(&mut incoming).await,
        ChannelEvent::Message(GuidanceMessage::Other)
    );
}

#[tokio::test]
async fn test_remote_close_is_reported() {
    let url = spawn_guidance_server().await;
    let link = WsGuidanceConnector::new(url).open("cockpit-test").await.unwrap();
    let (outgoing, mut incoming, _guard) = link.into_parts();

    outgoing.send("bye".to_string()).await.unwrap();

    assert_eq!(next_event(&mut incoming).await, ChannelEvent::Closed);
}

#[tokio::test]
async fn test_open_fails_without_backend() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let connector = WsGuidanceConnector::new(format!("ws://{}/ws/cockpit", addr));

    assert!(connector.open("cockpit-test").await.is_err());
}

#[tokio::test]
async fn test_session_over_websocket() {
    let url = spawn_guidance_server().await;
    let fixture = Fixture::new();
    let collaborators = Collaborators {
        guidance: Arc::new(WsGuidanceConnector::new(url)),
        ..fixture.collaborators()
    };
    let session = CockpitSession::new(SessionConfig::default(), principal(), "L1", collaborators);
    session.connect().await.unwrap();
    let mut events = session.subscribe();

    session
        .submit_utterance("It's too expensive for my budget")
        .await
        .unwrap();

    next_matching(&mut events, |e| {
        matches!(e, SessionEvent::ScriptUpdated(s) if s == "Offer SIP top-up")
    })
    .await;

    let cards = session.interventions().await;
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].title, "Price Concern");

    let ended = session.end().await.unwrap();
    ended.write.await.unwrap().unwrap();
    assert_eq!(ended.record.objections_raised, vec!["Price Concern"]);
}
