use crate::subscription::broker::{Outbox, SubscriptionBroker};
use crate::subscription::observer::ObserverId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Inbound message from an observer session to the broker
#[derive(Debug)]
pub enum SessionEvent {
    Connect { observer: ObserverId, outbox: Outbox },
    Join { observer: ObserverId, site_id: String },
    Leave { observer: ObserverId, site_id: String },
    SnapshotRequest { observer: ObserverId, site_id: String },
    Disconnect { observer: ObserverId },
}

/// Cloneable sender into the broker's inbound queue
///
/// Events from one handle are applied in the order they were sent.
#[derive(Clone, Debug)]
pub struct BrokerHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl BrokerHandle {
    /// Create a handle and the receiving end for `run_event_loop`
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, event: SessionEvent) -> Result<(), BrokerClosed> {
        self.tx.send(event).map_err(|_| BrokerClosed)
    }
}

/// Broker event loop has stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerClosed;

impl std::fmt::Display for BrokerClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "broker event loop is not running")
    }
}

impl std::error::Error for BrokerClosed {}

/// Consume session events and apply them to the broker
///
/// Runs until every `BrokerHandle` has been dropped.
pub async fn run_event_loop(
    broker: Arc<SubscriptionBroker>,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
) {
    info!("Broker event loop started");

    while let Some(event) = events.recv().await {
        broker.apply(event);
    }

    warn!("Broker event loop stopped, all handles dropped");
}
