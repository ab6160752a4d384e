use anyhow::Result;
use domain::{BookingStore, SystemClock};
use persistence::PgBookingStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use court_reservations_api::app::{create_app, AppState};
use court_reservations_api::config::Config;
use court_reservations_api::jobs::{JobScheduler, PoolMetricsJob, ReservationSweepJob};
use court_reservations_api::middleware;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!("Starting Court Reservations API v{}", env!("CARGO_PKG_VERSION"));

    let db_config: persistence::db::DatabaseConfig = (&config.database).into();
    let pool = persistence::db::create_pool(&db_config).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let store: Arc<dyn BookingStore> = Arc::new(PgBookingStore::new(pool.clone()));
    let state = AppState::new(config.clone(), store, Arc::new(SystemClock))?;

    if config.jobs.ensure_catalog {
        let report = state.services.courts.ensure_catalog().await?;
        info!(
            created = report.created.len(),
            existing = report.existing.len(),
            unexpected = report.unexpected.len(),
            "Court catalog checked"
        );
    }

    let mut scheduler = JobScheduler::new();
    scheduler.register(PoolMetricsJob::new(pool));
    if config.jobs.enabled {
        scheduler.register(ReservationSweepJob::new(
            state.services.lifecycle.clone(),
            Duration::from_secs(config.jobs.sweep_interval_secs),
        ));
    } else {
        warn!("Reservation sweep job disabled; sweeps only run on reads and admin request");
    }
    scheduler.start();

    let app = create_app(state);

    let addr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
