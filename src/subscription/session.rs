use crate::subscription::broker::Inbox;
use crate::subscription::event::{BrokerHandle, SessionEvent};
use crate::subscription::observer::ObserverId;
use tokio::sync::mpsc;

/// Lifecycle of one observer connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    /// Terminal
    Disconnected,
}

/// One connected observer
///
/// Created in the `Connected` state. `disconnect` (or dropping the session
/// while connected) emits exactly one Disconnect to the broker; afterwards
/// every operation is rejected with `SessionError::Disconnected`.
#[derive(Debug)]
pub struct ObserverSession {
    id: ObserverId,
    state: SessionState,
    handle: BrokerHandle,
}

impl ObserverSession {
    /// Open a session and register it with the broker
    ///
    /// Returns the session plus the inbox its samples arrive on. A zero
    /// `outbox_capacity` is rejected before anything is sent.
    pub fn connect(
        handle: BrokerHandle,
        outbox_capacity: usize,
    ) -> Result<(Self, Inbox), SessionError> {
        if outbox_capacity == 0 {
            return Err(SessionError::ZeroCapacity);
        }

        let id = ObserverId::new();
        let (outbox, inbox) = mpsc::channel(outbox_capacity);

        handle
            .send(SessionEvent::Connect {
                observer: id,
                outbox,
            })
            .map_err(|_| SessionError::BrokerUnavailable)?;

        let session = Self {
            id,
            state: SessionState::Connected,
            handle,
        };
        Ok((session, inbox))
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn join(&self, site_id: &str) -> Result<(), SessionError> {
        self.send(SessionEvent::Join {
            observer: self.id,
            site_id: site_id.to_string(),
        })
    }

    pub fn leave(&self, site_id: &str) -> Result<(), SessionError> {
        self.send(SessionEvent::Leave {
            observer: self.id,
            site_id: site_id.to_string(),
        })
    }

    pub fn request_snapshot(&self, site_id: &str) -> Result<(), SessionError> {
        self.send(SessionEvent::SnapshotRequest {
            observer: self.id,
            site_id: site_id.to_string(),
        })
    }

    /// Transition to `Disconnected`
    pub fn disconnect(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Disconnected {
            return Err(SessionError::Disconnected);
        }
        self.state = SessionState::Disconnected;
        self.handle
            .send(SessionEvent::Disconnect { observer: self.id })
            .map_err(|_| SessionError::BrokerUnavailable)
    }

    fn send(&self, event: SessionEvent) -> Result<(), SessionError> {
        if self.state == SessionState::Disconnected {
            return Err(SessionError::Disconnected);
        }
        self.handle
            .send(event)
            .map_err(|_| SessionError::BrokerUnavailable)
    }
}

impl Drop for ObserverSession {
    fn drop(&mut self) {
        if self.state == SessionState::Connected {
            let _ = self.disconnect();
        }
    }
}

/// Session operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Session already reached its terminal state
    Disconnected,
    /// Broker event loop is gone
    BrokerUnavailable,
    /// Outbox capacity must be at least 1
    ZeroCapacity,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Disconnected => write!(f, "session is disconnected"),
            SessionError::BrokerUnavailable => write!(f, "broker is unavailable"),
            SessionError::ZeroCapacity => write!(f, "outbox capacity must be greater than 0"),
        }
    }
}

impl std::error::Error for SessionError {}
