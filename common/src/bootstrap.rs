// Bootstrap utilities for binary initialization
// Builds the store, the delivery client and every configured family from settings

use crate::config::{DeliveryMode, FamilyConfig, Settings};
use crate::db::{DbPool, NoticeRepository, RiskWindowRepository};
use crate::delivery::{FcmHttpDelivery, LogDelivery, NotificationDelivery};
use crate::schedule::{parse_timezone, NoticeCalendar, SystemClock};
use crate::scheduler::{CrawlScheduler, CronTrigger, FamilySchedule, SchedulerEngine};
use crate::source::HttpSourceAdapter;
use crate::strategy::title_strategy_for;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Open the SQLite store and apply migrations
///
/// The parent directory of a file-backed database is created when missing.
///
/// # Errors
/// Returns error if the directory, the pool or the migrations fail
#[tracing::instrument(skip(settings))]
pub async fn init_store(settings: &Settings) -> Result<DbPool> {
    info!("Initializing notice store");

    if let Some(parent) = database_dir(&settings.database.url) {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
            info!(path = %parent.display(), "Created database directory");
        }
    }

    let db_pool = DbPool::new(&settings.database)
        .await
        .context("Failed to initialize database pool")?;
    db_pool
        .migrate()
        .await
        .context("Failed to apply database migrations")?;

    info!("Notice store initialized");
    Ok(db_pool)
}

/// Directory holding a file-backed database; `None` for in-memory URLs
fn database_dir(url: &str) -> Option<&Path> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path).parent()
}

/// Build the push client selected by `delivery.mode`
///
/// # Errors
/// Returns error if the HTTP client cannot be built
pub fn build_delivery(settings: &Settings) -> Result<Arc<dyn NotificationDelivery>> {
    let delivery: Arc<dyn NotificationDelivery> = match settings.delivery.mode {
        DeliveryMode::Log => {
            info!("Delivery mode: log only");
            Arc::new(LogDelivery)
        }
        DeliveryMode::Fcm => {
            info!(endpoint = %settings.delivery.endpoint, "Delivery mode: FCM");
            Arc::new(
                FcmHttpDelivery::new(
                    settings.delivery.endpoint.clone(),
                    settings.delivery.server_key.clone(),
                    settings.delivery.timeout_seconds,
                )
                .context("Failed to build FCM client")?,
            )
        }
    };
    Ok(delivery)
}

/// Build one pipeline plus its two triggers per enabled family
///
/// # Errors
/// Returns error on an invalid timezone, cron expression or HTTP client
#[tracing::instrument(skip_all)]
pub fn build_engine(
    settings: &Settings,
    db_pool: DbPool,
    delivery: Arc<dyn NotificationDelivery>,
) -> Result<SchedulerEngine> {
    let timezone = parse_timezone(&settings.scheduler.timezone)
        .context("Invalid scheduler timezone")?;

    let store = Arc::new(NoticeRepository::new(db_pool.clone()));
    let latency_log = Arc::new(RiskWindowRepository::new(db_pool));

    let mut families = Vec::new();
    for family in &settings.scheduler.families {
        if !family.enabled {
            warn!(family = %family.name, "Family disabled, skipping");
            continue;
        }

        let source = HttpSourceAdapter::new(
            family.provider.clone(),
            family.date_format,
            family.categories.clone(),
            family.request_timeout_seconds,
        )
        .with_context(|| format!("Failed to build source adapter for '{}'", family.name))?;

        let scheduler = CrawlScheduler::new(
            family.name.clone(),
            Arc::new(source),
            store.clone(),
            latency_log.clone(),
            delivery.clone(),
            title_strategy_for(family.kind),
            NoticeCalendar::new(Arc::new(SystemClock), timezone, family.date_format),
        )
        .with_topic_prefix(family.topic_prefix.clone());

        let (crawl, purge) = family_triggers(family, timezone)?;
        info!(
            family = %family.name,
            kind = %family.kind,
            categories = family.categories.len(),
            crawl_cron = %family.crawl_cron,
            purge_cron = %family.purge_cron,
            "Family configured"
        );
        families.push(FamilySchedule::new(scheduler, crawl, purge));
    }

    Ok(SchedulerEngine::new(families))
}

fn family_triggers(family: &FamilyConfig, timezone: Tz) -> Result<(CronTrigger, CronTrigger)> {
    let crawl = CronTrigger::new(
        format!("{}-crawl", family.name),
        &family.crawl_cron,
        timezone,
    )
    .with_context(|| format!("Invalid crawl_cron for '{}'", family.name))?;
    let purge = CronTrigger::new(
        format!("{}-purge", family.name),
        &family.purge_cron,
        timezone,
    )
    .with_context(|| format!("Invalid purge_cron for '{}'", family.name))?;
    Ok((crawl, purge))
}
