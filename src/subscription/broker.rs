use crate::subscription::event::SessionEvent;
use crate::subscription::observer::ObserverId;
use crate::telemetry::{Synthesizer, TelemetrySample};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Sending half of an observer's delivery queue
pub type Outbox = mpsc::Sender<Arc<TelemetrySample>>;

/// Receiving half of an observer's delivery queue, drained by the transport
pub type Inbox = mpsc::Receiver<Arc<TelemetrySample>>;

/// Per-observer bookkeeping
struct ObserverEntry {
    sites: HashSet<String>,
    outbox: Outbox,
}

/// Both membership indices, guarded together so they never disagree
#[derive(Default)]
struct Membership {
    /// site_id -> observers currently joined
    sites: HashMap<String, HashSet<ObserverId>>,
    /// observer_id -> joined sites + delivery queue
    observers: HashMap<ObserverId, ObserverEntry>,
}

/// Tracks which observers want which sites and delivers samples to them
///
/// All membership changes go through a single mutex. Delivery never happens
/// while the lock is held: callers snapshot the target outboxes first, then
/// push with `try_send` so a slow observer cannot stall anyone else.
pub struct SubscriptionBroker {
    membership: Mutex<Membership>,
    synthesizer: Arc<dyn Synthesizer>,
    samples_delivered: AtomicU64,
    delivery_faults: AtomicU64,
}

impl SubscriptionBroker {
    pub fn new(synthesizer: Arc<dyn Synthesizer>) -> Self {
        Self {
            membership: Mutex::new(Membership::default()),
            synthesizer,
            samples_delivered: AtomicU64::new(0),
            delivery_faults: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Membership> {
        self.membership.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one inbound session event
    pub fn apply(&self, event: SessionEvent) {
        match event {
            SessionEvent::Connect { observer, outbox } => {
                self.connect(observer, outbox);
            }
            SessionEvent::Join { observer, site_id } => {
                self.join(observer, &site_id);
            }
            SessionEvent::Leave { observer, site_id } => {
                self.leave(observer, &site_id);
            }
            SessionEvent::SnapshotRequest { observer, site_id } => {
                self.request_snapshot(observer, &site_id);
            }
            SessionEvent::Disconnect { observer } => {
                self.disconnect(observer);
            }
        }
    }

    /// Register a newly connected observer with an empty subscription set
    ///
    /// Returns false if the identity is already connected.
    pub fn connect(&self, observer: ObserverId, outbox: Outbox) -> bool {
        let mut membership = self.lock();
        if membership.observers.contains_key(&observer) {
            warn!(observer_id = %observer, "Observer already connected, ignoring");
            return false;
        }
        membership.observers.insert(
            observer,
            ObserverEntry {
                sites: HashSet::new(),
                outbox,
            },
        );
        info!(observer_id = %observer, "Observer connected");
        true
    }

    /// Subscribe `observer` to `site_id` and push it one fresh sample
    ///
    /// Membership is idempotent; the join snapshot is sent on every join.
    /// Unknown observers are ignored. Returns true if the pair was added.
    pub fn join(&self, observer: ObserverId, site_id: &str) -> bool {
        let (added, outbox) = {
            let mut membership = self.lock();
            let Some(entry) = membership.observers.get_mut(&observer) else {
                debug!(observer_id = %observer, site_id = %site_id, "Join from unknown observer ignored");
                return false;
            };
            let added = entry.sites.insert(site_id.to_string());
            let outbox = entry.outbox.clone();
            membership
                .sites
                .entry(site_id.to_string())
                .or_default()
                .insert(observer);
            (added, outbox)
        };

        if added {
            info!(observer_id = %observer, site_id = %site_id, "Observer joined site");
        }

        self.unicast_fresh(observer, &outbox, site_id);
        added
    }

    /// Unsubscribe `observer` from `site_id`
    ///
    /// Returns true if the pair existed.
    pub fn leave(&self, observer: ObserverId, site_id: &str) -> bool {
        let mut membership = self.lock();

        let removed = membership
            .observers
            .get_mut(&observer)
            .map(|entry| entry.sites.remove(site_id))
            .unwrap_or(false);

        if removed {
            remove_from_site(&mut membership, site_id, observer);
            info!(observer_id = %observer, site_id = %site_id, "Observer left site");
        }

        removed
    }

    /// Drop every membership held by `observer` and release its outbox
    ///
    /// Returns the number of sites the observer was removed from.
    pub fn disconnect(&self, observer: ObserverId) -> usize {
        let mut membership = self.lock();

        let Some(entry) = membership.observers.remove(&observer) else {
            debug!(observer_id = %observer, "Disconnect for unknown observer ignored");
            return 0;
        };

        for site_id in &entry.sites {
            remove_from_site(&mut membership, site_id, observer);
        }

        info!(
            observer_id = %observer,
            sites = entry.sites.len(),
            "Observer disconnected"
        );
        entry.sites.len()
    }

    /// Deliver `sample` to every observer joined to `site_id` right now
    ///
    /// The subscriber set is snapshotted under the lock; observers joining
    /// afterwards are not part of this delivery. Per-observer faults are
    /// logged and counted, never returned as errors.
    pub fn multicast(&self, site_id: &str, sample: TelemetrySample) -> MulticastReport {
        let targets: Vec<(ObserverId, Outbox)> = {
            let membership = self.lock();
            match membership.sites.get(site_id) {
                Some(observers) => observers
                    .iter()
                    .filter_map(|id| {
                        membership
                            .observers
                            .get(id)
                            .map(|entry| (*id, entry.outbox.clone()))
                    })
                    .collect(),
                None => Vec::new(),
            }
        };

        let sample = Arc::new(sample);
        let mut report = MulticastReport::default();

        for (observer, outbox) in targets {
            match self.deliver(observer, &outbox, Arc::clone(&sample)) {
                Ok(()) => report.delivered += 1,
                Err(_) => report.faults += 1,
            }
        }

        report
    }

    /// Synthesize one sample for `site_id` and send it to `observer` only
    ///
    /// Independent of subscription state. Returns true if the sample was
    /// queued for delivery.
    pub fn request_snapshot(&self, observer: ObserverId, site_id: &str) -> bool {
        let outbox = {
            let membership = self.lock();
            match membership.observers.get(&observer) {
                Some(entry) => entry.outbox.clone(),
                None => {
                    debug!(observer_id = %observer, site_id = %site_id, "Snapshot request from unknown observer ignored");
                    return false;
                }
            }
        };

        self.unicast_fresh(observer, &outbox, site_id)
    }

    fn unicast_fresh(&self, observer: ObserverId, outbox: &Outbox, site_id: &str) -> bool {
        match self.synthesizer.synthesize(site_id, Utc::now()) {
            Ok(sample) => self.deliver(observer, outbox, Arc::new(sample)).is_ok(),
            Err(e) => {
                warn!(observer_id = %observer, site_id = %site_id, error = %e, "Failed to synthesize snapshot");
                false
            }
        }
    }

    fn deliver(
        &self,
        observer: ObserverId,
        outbox: &Outbox,
        sample: Arc<TelemetrySample>,
    ) -> Result<(), DeliveryFault> {
        let result = outbox.try_send(sample).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryFault::Full,
            mpsc::error::TrySendError::Closed(_) => DeliveryFault::Closed,
        });

        match &result {
            Ok(()) => {
                self.samples_delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(fault) => {
                self.delivery_faults.fetch_add(1, Ordering::Relaxed);
                warn!(observer_id = %observer, fault = %fault, "Delivery fault, sample dropped");
            }
        }

        result
    }

    /// Observers currently joined to `site_id`
    pub fn subscribers(&self, site_id: &str) -> Vec<ObserverId> {
        self.lock()
            .sites
            .get(site_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Sites `observer` is currently joined to
    pub fn subscriptions(&self, observer: ObserverId) -> Vec<String> {
        self.lock()
            .observers
            .get(&observer)
            .map(|entry| entry.sites.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_subscribed(&self, observer: ObserverId, site_id: &str) -> bool {
        self.lock()
            .sites
            .get(site_id)
            .is_some_and(|set| set.contains(&observer))
    }

    pub fn is_connected(&self, observer: ObserverId) -> bool {
        self.lock().observers.contains_key(&observer)
    }

    pub fn stats(&self) -> BrokerStats {
        let membership = self.lock();
        BrokerStats {
            observers: membership.observers.len(),
            subscriptions: membership.observers.values().map(|e| e.sites.len()).sum(),
            samples_delivered: self.samples_delivered.load(Ordering::Relaxed),
            delivery_faults: self.delivery_faults.load(Ordering::Relaxed),
        }
    }
}

fn remove_from_site(membership: &mut Membership, site_id: &str, observer: ObserverId) {
    if let Some(set) = membership.sites.get_mut(site_id) {
        set.remove(&observer);
        if set.is_empty() {
            membership.sites.remove(site_id);
        }
    }
}

/// Outcome of one multicast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MulticastReport {
    pub delivered: usize,
    pub faults: usize,
}

/// Point-in-time broker counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerStats {
    pub observers: usize,
    pub subscriptions: usize,
    pub samples_delivered: u64,
    pub delivery_faults: u64,
}

/// Per-observer delivery failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFault {
    /// Observer's queue is full (slow consumer)
    Full,
    /// Observer's transport has gone away; reconciled on disconnect
    Closed,
}

impl std::fmt::Display for DeliveryFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryFault::Full => write!(f, "outbox full"),
            DeliveryFault::Closed => write!(f, "outbox closed"),
        }
    }
}

impl std::error::Error for DeliveryFault {}
