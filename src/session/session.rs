use super::config::SessionConfig;
use super::state::{
    InterventionCard, SessionEvent, SessionState, SessionStatus, TranscriptEntry,
};
use super::summary::{build_interaction_record, render_greeting};
use crate::channel::{ChannelEvent, ChannelGuard, GuidanceConnector};
use crate::error::{SessionError, StoreError};
use crate::store::{InteractionLog, InteractionRecord, Lead, LeadStore, Principal};
use chrono::Utc;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const EVENT_CAPACITY: usize = 256;

/// Remote collaborators a session talks to
#[derive(Clone)]
pub struct Collaborators {
    pub leads: Arc<dyn LeadStore>,
    pub interactions: Arc<dyn InteractionLog>,
    pub guidance: Arc<dyn GuidanceConnector>,
}

/// Outcome of ending a call
///
/// The summary write runs in the background; `write` may be awaited but
/// nothing in the session depends on it.
#[derive(Debug)]
pub struct EndedCall {
    pub record: InteractionRecord,
    pub write: JoinHandle<Result<(), StoreError>>,
}

/// Guidance channel held while the session is live
struct LiveChannel {
    outgoing: mpsc::Sender<String>,
    pump: JoinHandle<()>,
    _guard: ChannelGuard,
}

/// A live call-assist session: lead context, guidance channel, transcript
/// and teleprompter for one call
pub struct CockpitSession {
    /// Session configuration
    config: SessionConfig,

    /// Agent running the call
    principal: Principal,

    /// Lead being called
    lead_id: String,

    collaborators: Collaborators,

    /// Session state shared with the guidance pump
    state: Arc<Mutex<SessionState>>,

    /// Open guidance channel; only touched while `state` is locked
    channel: StdMutex<Option<LiveChannel>>,

    /// Fan-out to renderers
    events: broadcast::Sender<SessionEvent>,
}

impl CockpitSession {
    /// Create a session in `connecting`; nothing is fetched until `connect`
    pub fn new(
        config: SessionConfig,
        principal: Principal,
        lead_id: impl Into<String>,
        collaborators: Collaborators,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config,
            principal,
            lead_id: lead_id.into(),
            collaborators,
            state: Arc::new(Mutex::new(SessionState::default())),
            channel: StdMutex::new(None),
            events,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Receive session events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Fetch the lead, go live and open the guidance channel
    ///
    /// A failed or timed-out lookup leaves the session in `connecting` with
    /// `blocked_reason` set; calling `connect` again retries the lookup.
    /// A channel that cannot be opened leaves the session live with
    /// degraded guidance.
    pub async fn connect(&self) -> Result<(), SessionError> {
        match self.state.lock().await.status {
            SessionStatus::Connecting => {}
            SessionStatus::Live => {
                warn!("Session {} already live", self.session_id());
                return Ok(());
            }
            SessionStatus::Ended => return Err(SessionError::AlreadyEnded),
        }

        info!(
            "Connecting session {} for lead {} (agent {})",
            self.session_id(),
            self.lead_id,
            self.principal.id
        );

        let lead = self.fetch_lead().await?;
        let greeting = render_greeting(
            &self.config.greeting_template,
            lead.first_name(),
            self.principal.first_name(),
        );

        {
            let mut state = self.state.lock().await;
            if !state.go_live(lead, greeting.clone(), Utc::now()) {
                return Ok(());
            }
        }
        self.emit(SessionEvent::StatusChanged(SessionStatus::Live));
        self.emit(SessionEvent::ScriptUpdated(greeting));

        info!("Session {} live", self.session_id());

        self.open_channel().await;

        Ok(())
    }

    async fn fetch_lead(&self) -> Result<Lead, SessionError> {
        let timeout = self.config.lead_fetch_timeout;
        let lookup = self.collaborators.leads.get_lead(&self.lead_id);

        let failure = match tokio::time::timeout(timeout, lookup).await {
            Ok(Ok(lead)) => return Ok(lead),
            Ok(Err(source)) => SessionError::LeadUnavailable {
                lead_id: self.lead_id.clone(),
                source,
            },
            Err(_) => SessionError::LeadFetchTimedOut {
                lead_id: self.lead_id.clone(),
                timeout,
            },
        };

        let reason = failure.to_string();
        error!("Session {} blocked: {}", self.session_id(), reason);
        self.state.lock().await.block(reason.clone());
        self.emit(SessionEvent::LeadBlocked(reason));

        Err(failure)
    }

    async fn open_channel(&self) {
        let link = match self.collaborators.guidance.open(self.session_id()).await {
            Ok(link) => link,
            Err(e) => {
                let reason = format!("{:#}", e);
                error!(
                    "Failed to open {} guidance channel for {}: {}",
                    self.collaborators.guidance.name(),
                    self.session_id(),
                    reason
                );
                self.degrade(reason).await;
                return;
            }
        };

        let (outgoing, incoming, guard) = link.into_parts();

        let state = self.state.lock().await;
        if !state.is_live() {
            debug!("Session {} left live before channel opened", self.session_id());
            return;
        }

        let pump = spawn_guidance_pump(
            self.session_id().to_string(),
            Arc::clone(&self.state),
            self.events.clone(),
            incoming,
        );
        *self.channel_slot() = Some(LiveChannel {
            outgoing,
            pump,
            _guard: guard,
        });
        drop(state);

        info!("Guidance channel open for {}", self.session_id());
    }

    /// Record an utterance and forward it to the backend
    ///
    /// Empty (or whitespace-only) text is ignored and returns `Ok(None)`.
    /// The line is forwarded while the state is still locked, so the backend
    /// sees utterances in transcript order.
    pub async fn submit_utterance(
        &self,
        text: &str,
    ) -> Result<Option<TranscriptEntry>, SessionError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let (entry, degraded) = {
            let mut state = self.state.lock().await;
            let entry = state
                .append_customer_line(text, Utc::now())
                .ok_or(SessionError::NotLive(state.status))?;
            let outgoing = self.channel_slot().as_ref().map(|live| live.outgoing.clone());

            let mut degraded = None;
            match outgoing {
                Some(outgoing) => {
                    if outgoing.send(text.to_string()).await.is_err() {
                        let reason = "guidance channel closed".to_string();
                        if state.degrade(reason.clone()) {
                            degraded = Some(reason);
                        }
                    }
                }
                None => debug!(
                    "No guidance channel for {}; utterance kept local",
                    self.session_id()
                ),
            }
            (entry, degraded)
        };

        self.emit(SessionEvent::TranscriptAppended(entry.clone()));
        if let Some(reason) = degraded {
            warn!("Guidance for {} degraded: {}", self.session_id(), reason);
            self.emit(SessionEvent::GuidanceDegraded(reason));
        }

        Ok(Some(entry))
    }

    /// End the call: close the channel and log the interaction in the background
    pub async fn end(&self) -> Result<EndedCall, SessionError> {
        let (record, cards) = {
            let mut state = self.state.lock().await;
            match state.status {
                SessionStatus::Live => {}
                SessionStatus::Ended => return Err(SessionError::AlreadyEnded),
                status => return Err(SessionError::NotLive(status)),
            }
            let now = Utc::now();
            state.end(now);
            self.teardown();
            let record =
                build_interaction_record(&self.config, &self.principal, &self.lead_id, &state, now);
            (record, state.interventions.len())
        };
        self.emit(SessionEvent::StatusChanged(SessionStatus::Ended));

        info!(
            "Session {} ended after {}s ({} cards, objections: {:?})",
            self.session_id(),
            record.duration_sec,
            cards,
            record.objections_raised
        );

        let interactions = Arc::clone(&self.collaborators.interactions);
        let events = self.events.clone();
        let pending = record.clone();
        let write = tokio::spawn(async move {
            match interactions.append_interaction(&pending).await {
                Ok(()) => {
                    let _ = events.send(SessionEvent::SummaryWritten);
                    Ok(())
                }
                Err(e) => {
                    warn!(
                        "Interaction for lead {} was not recorded: {}",
                        pending.investor_id, e
                    );
                    let _ = events.send(SessionEvent::SummaryWriteFailed(e.to_string()));
                    Err(e)
                }
            }
        });

        Ok(EndedCall { record, write })
    }

    /// Leave the session without logging the call
    ///
    /// A live session is marked ended and its channel torn down; nothing is
    /// written to the interaction log.
    pub async fn leave(&self) {
        let left_live = {
            let mut state = self.state.lock().await;
            let left_live = state.end(Utc::now());
            self.teardown();
            left_live
        };

        if left_live {
            self.emit(SessionEvent::StatusChanged(SessionStatus::Ended));
        }
        info!("Left session {}", self.session_id());
    }

    /// Copy of the current session state
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.lock().await.status
    }

    pub async fn current_script(&self) -> String {
        self.state.lock().await.current_script.clone()
    }

    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.state.lock().await.transcript.clone()
    }

    pub async fn interventions(&self) -> Vec<InterventionCard> {
        self.state.lock().await.interventions.clone()
    }

    async fn degrade(&self, reason: String) {
        let changed = self.state.lock().await.degrade(reason.clone());
        if changed {
            self.emit(SessionEvent::GuidanceDegraded(reason));
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn channel_slot(&self) -> std::sync::MutexGuard<'_, Option<LiveChannel>> {
        self.channel.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stop the pump and drop the channel; the websocket writer closes on its own
    fn teardown(&self) {
        if let Some(live) = self.channel_slot().take() {
            live.pump.abort();
            debug!("Guidance channel for {} torn down", self.session_id());
        }
    }
}

impl Drop for CockpitSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Drain the guidance channel in arrival order, applying each event only
/// while the session is still live
fn spawn_guidance_pump(
    session_id: String,
    state: Arc<Mutex<SessionState>>,
    events: broadcast::Sender<SessionEvent>,
    mut incoming: mpsc::Receiver<ChannelEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("Guidance pump for {} started", session_id);

        while let Some(event) = incoming.recv().await {
            let mut guard = state.lock().await;
            if !guard.is_live() {
                break;
            }

            match event {
                ChannelEvent::Message(message) => {
                    match guard.apply_guidance(message, Utc::now()) {
                        Some(card) => {
                            info!("Card for {}: [{:?}] {}", session_id, card.kind, card.title);
                            let script = (!card.content.is_empty()).then(|| card.content.clone());
                            let _ = events.send(SessionEvent::InterventionReceived(card));
                            if let Some(script) = script {
                                let _ = events.send(SessionEvent::ScriptUpdated(script));
                            }
                        }
                        None => debug!("Ignoring non-card guidance message for {}", session_id),
                    }
                }
                ChannelEvent::Fault(reason) => {
                    warn!("Guidance channel for {} failed: {}", session_id, reason);
                    if guard.degrade(reason.clone()) {
                        let _ = events.send(SessionEvent::GuidanceDegraded(reason));
                    }
                    break;
                }
                ChannelEvent::Closed => {
                    let reason = "guidance channel closed by backend".to_string();
                    warn!("{} ({})", reason, session_id);
                    if guard.degrade(reason.clone()) {
                        let _ = events.send(SessionEvent::GuidanceDegraded(reason));
                    }
                    break;
                }
            }
        }

        debug!("Guidance pump for {} stopped", session_id);
    })
}
