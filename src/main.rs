use anyhow::{Context, Result};
use grevo::api::{create_app, EnergyAppState, QueryAppState, StatusAppState, WsAppState};
use grevo::config::GrevoConfig;
use grevo::scheduler::BroadcastScheduler;
use grevo::site::SiteRegistry;
use grevo::subscription::{run_event_loop, BrokerHandle, SubscriptionBroker};
use grevo::telemetry::{RandomSynthesizer, Synthesizer};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let started_at = Instant::now();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grevo=info".into()),
        )
        .init();

    info!("Grevo starting...");

    let config = GrevoConfig::from_env().context("Failed to load configuration")?;

    let registry = match &config.catalog.path {
        Some(path) => SiteRegistry::load(path)
            .with_context(|| format!("Failed to load site catalog from {}", path.display()))?,
        None => SiteRegistry::builtin(),
    };
    let registry = Arc::new(registry);
    info!(sites = registry.len(), "Site catalog loaded");

    let synthesizer: Arc<dyn Synthesizer> = Arc::new(RandomSynthesizer);

    // Broker and its inbound event queue
    let broker = Arc::new(SubscriptionBroker::new(Arc::clone(&synthesizer)));
    let (handle, events) = BrokerHandle::channel();
    tokio::spawn(run_event_loop(Arc::clone(&broker), events));

    // Periodic broadcast
    let scheduler = BroadcastScheduler::new(
        Arc::clone(&registry),
        Arc::clone(&broker),
        Arc::clone(&synthesizer),
        config.broadcast.interval(),
    );
    let ticks = scheduler.tick_counter();
    scheduler.spawn();

    let app = create_app(
        Arc::new(QueryAppState {
            registry: Arc::clone(&registry),
        }),
        Arc::new(EnergyAppState {
            synthesizer: Arc::clone(&synthesizer),
            config: config.api.clone(),
        }),
        Arc::new(StatusAppState {
            broker: Arc::clone(&broker),
            ticks,
            started_at,
        }),
        Arc::new(WsAppState {
            broker: handle,
            outbox_capacity: config.broadcast.outbox_capacity,
        }),
    );

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(addr = %addr, "HTTP API listening");
    info!("Real-time updates enabled via WebSocket at /api/ws");

    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
