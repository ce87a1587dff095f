// Scheduler binary entry point

use anyhow::Context;
use common::bootstrap::{build_delivery, build_engine, init_store};
use common::config::Settings;
use common::telemetry;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;

    telemetry::init_logging(
        &settings.observability.log_level,
        settings.observability.tracing_endpoint.as_deref(),
    )?;

    info!("Starting campus notice scheduler");

    settings.validate().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e
    })?;

    info!(
        database_url = %settings.database.url,
        timezone = %settings.scheduler.timezone,
        families = settings.scheduler.families.len(),
        delivery_mode = ?settings.delivery.mode,
        "Configuration loaded"
    );

    if let Some(port) = settings.observability.metrics_port {
        telemetry::init_metrics(port)?;
    }

    let db_pool = init_store(&settings).await?;
    let delivery = build_delivery(&settings)?;
    let engine = Arc::new(build_engine(&settings, db_pool.clone(), delivery)?);
    info!(families = engine.families().len(), "Scheduler engine created");

    let engine_for_shutdown = engine.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C signal, initiating graceful shutdown"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
        }
        engine_for_shutdown.stop();
    });

    engine.start().await;

    db_pool.close().await;
    telemetry::shutdown_tracer();
    info!("Scheduler stopped");
    Ok(())
}
