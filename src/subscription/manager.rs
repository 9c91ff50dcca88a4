use crate::subscription::broker::Inbox;
use crate::subscription::protocol::{ClientMessage, EnergyDataMessage, ErrorMessage};
use crate::subscription::session::{ObserverSession, SessionError};
use crate::telemetry::TelemetrySample;
use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, StreamExt};
use tracing::{error, info, warn};

/// Manages a single WebSocket connection bound to one observer session
pub struct ConnectionManager {
    session: ObserverSession,
}

impl ConnectionManager {
    pub fn new(session: ObserverSession) -> Self {
        Self { session }
    }

    /// Handle WebSocket connection lifecycle
    ///
    /// Client frames become session events; samples arriving on `inbox` are
    /// written to the socket. Returns when either side closes.
    pub async fn handle(mut self, socket: WebSocket, mut inbox: Inbox) {
        let observer_id = self.session.id();
        info!(observer_id = %observer_id, "WebSocket connection established");

        let (mut sender, mut receiver) = socket.split();

        loop {
            tokio::select! {
                // Handle incoming client messages
                msg = receiver.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match self.handle_client_message(&text) {
                                Ok(()) => {}
                                Err(ClientFrameError::Malformed(e)) => {
                                    warn!(observer_id = %observer_id, error = %e, "Malformed client message");
                                    let reply = ErrorMessage::new(format!("invalid message: {}", e));
                                    if let Err(e) = send_json(&mut sender, &reply).await {
                                        error!(observer_id = %observer_id, error = %e, "Failed to send error reply");
                                        break;
                                    }
                                }
                                Err(ClientFrameError::Session(e)) => {
                                    error!(observer_id = %observer_id, error = %e, "Session rejected client message");
                                    break;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!(observer_id = %observer_id, "WebSocket client disconnected");
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = sender.send(Message::Pong(data)).await {
                                error!(observer_id = %observer_id, error = %e, "Failed to send pong");
                                break;
                            }
                        }
                        Some(Ok(_)) => {
                            // Ignore binary, pong messages
                        }
                        Some(Err(e)) => {
                            warn!(observer_id = %observer_id, error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                // Forward samples routed to this observer
                sample = inbox.recv() => {
                    match sample {
                        Some(sample) => {
                            if let Err(e) = send_sample(&mut sender, &sample).await {
                                error!(observer_id = %observer_id, error = %e, "Failed to send energy data");
                                break;
                            }
                        }
                        None => {
                            error!(observer_id = %observer_id, "Observer outbox closed by broker");
                            break;
                        }
                    }
                }
            }
        }

        if let Err(e) = self.session.disconnect() {
            warn!(observer_id = %observer_id, error = %e, "Disconnect not delivered to broker");
        }
        info!(observer_id = %observer_id, "WebSocket connection closed");
    }

    /// Translate one client text frame into a session operation
    fn handle_client_message(&self, text: &str) -> Result<(), ClientFrameError> {
        let msg: ClientMessage = serde_json::from_str(text).map_err(ClientFrameError::Malformed)?;

        let result = match msg {
            ClientMessage::JoinCampus { campus_id } => self.session.join(&campus_id),
            ClientMessage::LeaveCampus { campus_id } => self.session.leave(&campus_id),
            ClientMessage::GetLatestData { campus_id } => {
                self.session.request_snapshot(&campus_id)
            }
        };

        result.map_err(ClientFrameError::Session)
    }
}

#[derive(Debug)]
enum ClientFrameError {
    Malformed(serde_json::Error),
    Session(SessionError),
}

async fn send_sample<S>(sender: &mut S, sample: &TelemetrySample) -> anyhow::Result<()>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    send_json(sender, &EnergyDataMessage::from(sample)).await
}

async fn send_json<S, T>(sender: &mut S, msg: &T) -> anyhow::Result<()>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
    T: serde::Serialize,
{
    let json = serde_json::to_string(msg)?;
    sender.send(Message::Text(json)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::event::{BrokerHandle, SessionEvent};

    fn create_manager() -> (
        ConnectionManager,
        tokio::sync::mpsc::UnboundedReceiver<SessionEvent>,
    ) {
        let (handle, mut rx) = BrokerHandle::channel();
        let (session, _inbox) = ObserverSession::connect(handle, 8).unwrap();
        assert!(matches!(rx.try_recv(), Ok(SessionEvent::Connect { .. })));
        (ConnectionManager::new(session), rx)
    }

    #[test]
    fn test_join_frame_becomes_join_event() {
        let (manager, mut rx) = create_manager();

        assert!(manager
            .handle_client_message(r#"{"type":"join-campus","campusId":"campus-1"}"#)
            .is_ok());

        match rx.try_recv() {
            Ok(SessionEvent::Join { observer, site_id }) => {
                assert_eq!(observer, manager.session.id());
                assert_eq!(site_id, "campus-1");
            }
            other => panic!("expected Join, got {:?}", other),
        }
    }

    #[test]
    fn test_leave_frame_becomes_leave_event() {
        let (manager, mut rx) = create_manager();

        assert!(manager
            .handle_client_message(r#"{"type":"leave-campus","campusId":"campus-2"}"#)
            .is_ok());

        assert!(matches!(
            rx.try_recv(),
            Ok(SessionEvent::Leave { site_id, .. }) if site_id == "campus-2"
        ));
    }

    #[test]
    fn test_latest_frame_becomes_snapshot_request() {
        let (manager, mut rx) = create_manager();

        assert!(manager
            .handle_client_message(r#"{"type":"get-latest-data","campusId":"campus-2"}"#)
            .is_ok());

        assert!(matches!(
            rx.try_recv(),
            Ok(SessionEvent::SnapshotRequest { site_id, .. }) if site_id == "campus-2"
        ));
    }

    #[test]
    fn test_malformed_frame_emits_nothing() {
        let (manager, mut rx) = create_manager();

        let result = manager.handle_client_message("not json at all");

        assert!(matches!(result, Err(ClientFrameError::Malformed(_))));
        assert!(rx.try_recv().is_err());

        // The session stays usable after a bad frame
        assert!(manager
            .handle_client_message(r#"{"type":"join-campus","campusId":"campus-1"}"#)
            .is_ok());
        assert!(matches!(rx.try_recv(), Ok(SessionEvent::Join { .. })));
    }

    #[test]
    fn test_frame_after_disconnect_rejected() {
        let (mut manager, mut rx) = create_manager();
        manager.session.disconnect().unwrap();
        assert!(matches!(rx.try_recv(), Ok(SessionEvent::Disconnect { .. })));

        let result =
            manager.handle_client_message(r#"{"type":"join-campus","campusId":"campus-1"}"#);

        assert!(matches!(
            result,
            Err(ClientFrameError::Session(SessionError::Disconnected))
        ));
        assert!(rx.try_recv().is_err());
    }
}
