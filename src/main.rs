mod adapters;
mod application;
mod config;
mod domain;
mod interface;
mod ports;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adapters::{HttpEmailNotifier, MemoryStore, QdrantAdapter, TwilioSmsNotifier};
use application::{AlertDispatcher, HealthProbe, MonitoringSession};
use config::Config;
use interface::http::create_router;

/// How often the scheduler checks whether the refresh interval has elapsed
const SCHEDULER_POLL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();

    // Load and validate configuration
    let config = Config::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("qdmon={},tower_http=info", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting qdmon v{}", env!("CARGO_PKG_VERSION"));
    info!(
        qdrant = %config.qdrant_url,
        collection = %config.monitor.target,
        refresh_interval_secs = config.monitor.refresh_interval.as_secs(),
        alert_threshold_ms = config.monitor.alert_threshold_ms,
        "Configuration loaded"
    );

    // Initialize adapters
    let source = QdrantAdapter::new(
        config.qdrant_url.clone(),
        config.qdrant_api_key.clone(),
        config.probe_timeout,
    )?;

    let mut dispatcher = AlertDispatcher::new();
    if let Some(email) = config.email.clone() {
        dispatcher = dispatcher.with_email(Arc::new(HttpEmailNotifier::new(
            email,
            config.probe_timeout,
        )?));
    }
    if let Some(sms) = config.sms.clone() {
        dispatcher = dispatcher.with_sms(Arc::new(TwilioSmsNotifier::new(
            sms,
            config.probe_timeout,
        )?));
    }
    if dispatcher.channels().is_empty() {
        warn!("⚠ No notification channels configured. Alerts can be evaluated but not sent.");
    } else {
        info!("✓ Notification channels: {}", dispatcher.channels().join(", "));
    }

    // Create monitoring session
    let session = Arc::new(MonitoringSession::new(
        config.monitor.clone(),
        HealthProbe::new(Arc::new(source), config.probe_timeout),
        dispatcher,
        Box::new(MemoryStore::new(config.monitor.retention)),
    ));

    info!("✓ Monitoring session initialized");

    let scheduler = session.clone().spawn_scheduler(SCHEDULER_POLL);

    // Create HTTP server
    let app = create_router(session);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("✓ qdmon listening on {}", addr);
    info!("  → Snapshot: http://localhost:{}/api/snapshot", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    scheduler.abort();
    info!("Monitoring session ended");

    Ok(())
}
