// Observer subscriptions: membership, delivery, and session lifecycle

pub mod broker;
pub mod event;
pub mod manager;
pub mod observer;
pub mod protocol;
pub mod session;

pub use broker::{
    BrokerStats, DeliveryFault, Inbox, MulticastReport, Outbox, SubscriptionBroker,
};
pub use event::{run_event_loop, BrokerClosed, BrokerHandle, SessionEvent};
pub use manager::ConnectionManager;
pub use observer::ObserverId;
pub use protocol::{ClientMessage, EnergyDataMessage, ErrorMessage};
pub use session::{ObserverSession, SessionError, SessionState};
