// In-memory collaborators for driving cockpit sessions in tests
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use sipbrain_cockpit::channel::{CardData, CardPayload};
use sipbrain_cockpit::store::Role;
use sipbrain_cockpit::{
    ChannelEvent, ChannelLink, Collaborators, GuidanceConnector, GuidanceMessage,
    InteractionLog, InteractionRecord, Lead, LeadStore, Principal, SessionEvent, StoreError,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

pub fn principal() -> Principal {
    Principal {
        id: "agt_100".to_string(),
        name: "Rahul Sharma".to_string(),
        role: Role::Agent,
    }
}

pub fn asha() -> Lead {
    Lead {
        id: "L1".to_string(),
        name: "Asha Rao".to_string(),
        city: "Pune".to_string(),
        occupation: "Salaried".to_string(),
        age: Some(34),
        risk_appetite: Some("Moderate".to_string()),
    }
}

pub fn objection(id: &str, title: &str, content: &str) -> ChannelEvent {
    ChannelEvent::Message(GuidanceMessage::Objection(CardPayload {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        data: None,
    }))
}

pub fn fd_fact() -> ChannelEvent {
    let table = json!({"FD Post-Tax": "4.8%", "Hybrid": "11.2%"});
    ChannelEvent::Message(GuidanceMessage::Fact(CardPayload {
        id: "f1".to_string(),
        title: "FD vs Mutual Fund".to_string(),
        content: "FDs are taxed. MFs are efficient.".to_string(),
        data: Some(CardData {
            table: table.as_object().cloned(),
        }),
    }))
}

// ----------------------------------------------------------------------------
// Lead store
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryLeads {
    leads: HashMap<String, Lead>,
    pub lookups: AtomicUsize,
}

impl MemoryLeads {
    pub fn with(leads: Vec<Lead>) -> Self {
        Self {
            leads: leads.into_iter().map(|lead| (lead.id.clone(), lead)).collect(),
            lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LeadStore for MemoryLeads {
    async fn get_lead(&self, lead_id: &str) -> Result<Lead, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.leads
            .get(lead_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(lead_id.to_string()))
    }
}

/// Lead store that never answers
pub struct PendingLeads;

#[async_trait]
impl LeadStore for PendingLeads {
    async fn get_lead(&self, _lead_id: &str) -> Result<Lead, StoreError> {
        std::future::pending().await
    }
}

// ----------------------------------------------------------------------------
// Interaction log
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryLog {
    pub records: Mutex<Vec<InteractionRecord>>,
    pub attempts: AtomicUsize,
    fail: bool,
}

impl MemoryLog {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<InteractionRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl InteractionLog for MemoryLog {
    async fn append_interaction(&self, record: &InteractionRecord) -> Result<(), StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::Status {
                code: 503,
                body: "store unavailable".to_string(),
            });
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Guidance channel
// ----------------------------------------------------------------------------

/// Backend side of an in-memory guidance channel
pub struct RemoteEnd {
    pub utterances: mpsc::Receiver<String>,
    pub push: mpsc::Sender<ChannelEvent>,
}

#[derive(Default)]
pub struct MemoryConnector {
    remote: Mutex<Option<RemoteEnd>>,
    opened: AtomicUsize,
    fail: bool,
}

impl MemoryConnector {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn take_remote(&self) -> RemoteEnd {
        self.remote
            .lock()
            .unwrap()
            .take()
            .expect("guidance channel was not opened")
    }
}

#[async_trait]
impl GuidanceConnector for MemoryConnector {
    async fn open(&self, _session_id: &str) -> Result<ChannelLink> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        self.opened.fetch_add(1, Ordering::SeqCst);

        let (outgoing_tx, outgoing_rx) = mpsc::channel(16);
        let (incoming_tx, incoming_rx) = mpsc::channel(16);
        *self.remote.lock().unwrap() = Some(RemoteEnd {
            utterances: outgoing_rx,
            push: incoming_tx,
        });

        Ok(ChannelLink::new(outgoing_tx, incoming_rx))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ----------------------------------------------------------------------------
// Wiring
// ----------------------------------------------------------------------------

pub struct Fixture {
    pub leads: Arc<MemoryLeads>,
    pub log: Arc<MemoryLog>,
    pub connector: Arc<MemoryConnector>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_parts(MemoryLog::default(), MemoryConnector::default())
    }

    pub fn with_parts(log: MemoryLog, connector: MemoryConnector) -> Self {
        Self {
            leads: Arc::new(MemoryLeads::with(vec![asha()])),
            log: Arc::new(log),
            connector: Arc::new(connector),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            leads: self.leads.clone(),
            interactions: self.log.clone(),
            guidance: self.connector.clone(),
        }
    }
}

/// Wait for the first event matching `pred`, failing the test after two seconds
pub async fn next_matching<F>(
    events: &mut broadcast::Receiver<SessionEvent>,
    pred: F,
) -> SessionEvent
where
    F: Fn(&SessionEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = events.recv().await.expect("event stream closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for session event")
}
