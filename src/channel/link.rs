use super::messages::ChannelEvent;
use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Buffer size for both directions of a guidance channel
pub const CHANNEL_CAPACITY: usize = 100;

/// Opens one guidance channel per cockpit session
#[async_trait::async_trait]
pub trait GuidanceConnector: Send + Sync {
    /// Open a channel scoped to `session_id`
    async fn open(&self, session_id: &str) -> Result<ChannelLink>;

    /// Connector name for logging
    fn name(&self) -> &str;
}

/// An open guidance channel
///
/// `outgoing` carries raw utterance text to the backend, `incoming` yields
/// backend events in arrival order. Dropping the link (or its guard) aborts
/// the transport tasks registered with it.
pub struct ChannelLink {
    pub outgoing: mpsc::Sender<String>,
    pub incoming: mpsc::Receiver<ChannelEvent>,
    guard: ChannelGuard,
}

impl ChannelLink {
    pub fn new(outgoing: mpsc::Sender<String>, incoming: mpsc::Receiver<ChannelEvent>) -> Self {
        Self {
            outgoing,
            incoming,
            guard: ChannelGuard::default(),
        }
    }

    /// Register a transport task to be aborted on teardown
    pub fn with_task(mut self, task: JoinHandle<()>) -> Self {
        self.guard.tasks.push(task);
        self
    }

    pub fn into_parts(
        self,
    ) -> (
        mpsc::Sender<String>,
        mpsc::Receiver<ChannelEvent>,
        ChannelGuard,
    ) {
        (self.outgoing, self.incoming, self.guard)
    }
}

/// Aborts transport tasks when dropped
#[derive(Default)]
pub struct ChannelGuard {
    tasks: Vec<JoinHandle<()>>,
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}
