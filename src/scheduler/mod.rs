use crate::site::SiteRegistry;
use crate::subscription::SubscriptionBroker;
use crate::telemetry::Synthesizer;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};


/// Periodically synthesizes one sample per registered site and multicasts it
///
/// Ticks run inline in a single task, so a tick never overlaps the previous
/// one. Missed ticks are skipped rather than replayed in a burst.
pub struct BroadcastScheduler {
    registry: Arc<SiteRegistry>,
    broker: Arc<SubscriptionBroker>,
    synthesizer: Arc<dyn Synthesizer>,
    period: Duration,
    ticks: Arc<AtomicU64>,
}

impl BroadcastScheduler {
    pub fn new(
        registry: Arc<SiteRegistry>,
        broker: Arc<SubscriptionBroker>,
        synthesizer: Arc<dyn Synthesizer>,
        period: Duration,
    ) -> Self {
        Self {
            registry,
            broker,
            synthesizer,
            period,
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shared counter of completed ticks
    pub fn tick_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.ticks)
    }

    /// Run one tick over every site in registry order
    ///
    /// A synthesis failure skips that site only; delivery faults are
    /// absorbed by the broker.
    pub fn tick(&self) -> TickReport {
        let mut report = TickReport::default();

        for site_id in self.registry.list_site_ids() {
            report.sites += 1;

            let sample = match self.synthesizer.synthesize(&site_id, Utc::now()) {
                Ok(sample) => sample,
                Err(e) => {
                    report.synthesis_faults += 1;
                    warn!(site_id = %site_id, error = %e, "Skipping site for this tick");
                    continue;
                }
            };

            let multicast = self.broker.multicast(&site_id, sample);
            report.delivered += multicast.delivered;
            report.delivery_faults += multicast.faults;
        }

        self.ticks.fetch_add(1, Ordering::Relaxed);
        report
    }

    /// Tick forever; the first tick fires one period after start
    pub async fn run(self) {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);

        // Skip missed ticks to prevent backlog under load
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            period_ms = self.period.as_millis() as u64,
            sites = self.registry.len(),
            "Broadcast scheduler started"
        );

        loop {
            ticker.tick().await;

            let report = self.tick();
            debug!(
                sites = report.sites,
                delivered = report.delivered,
                synthesis_faults = report.synthesis_faults,
                delivery_faults = report.delivery_faults,
                "Broadcast tick complete"
            );
        }
    }

    /// Spawn `run` on the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

/// Outcome of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub sites: usize,
    pub delivered: usize,
    pub synthesis_faults: usize,
    pub delivery_faults: usize,
}
