// Crawl scheduler: fetch, filter to today, dedup-insert, notify
//
// The store's insert-if-absent is the only thing that decides whether an
// item is new. Runs may overlap freely; no state survives between runs.

use crate::composer::build_payload;
use crate::db::{LatencyLog, NoticeStore};
use crate::models::{CrawlReport, NoticeBatch, NotificationPayload, RiskWindowRecord};
use crate::delivery::NotificationDelivery;
use crate::schedule::NoticeCalendar;
use crate::source::SourceAdapter;
use crate::strategy::TitleStrategy;
use crate::telemetry;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Ingestion pipeline of one category family
pub struct CrawlScheduler {
    family: String,
    source: Arc<dyn SourceAdapter>,
    store: Arc<dyn NoticeStore>,
    latency_log: Arc<dyn LatencyLog>,
    delivery: Arc<dyn NotificationDelivery>,
    strategy: Arc<dyn TitleStrategy>,
    calendar: NoticeCalendar,
    topic_prefix: String,
}

impl CrawlScheduler {
    pub fn new(
        family: impl Into<String>,
        source: Arc<dyn SourceAdapter>,
        store: Arc<dyn NoticeStore>,
        latency_log: Arc<dyn LatencyLog>,
        delivery: Arc<dyn NotificationDelivery>,
        strategy: Arc<dyn TitleStrategy>,
        calendar: NoticeCalendar,
    ) -> Self {
        Self {
            family: family.into(),
            source,
            store,
            latency_log,
            delivery,
            strategy,
            calendar,
            topic_prefix: String::new(),
        }
    }

    /// Prefix prepended to the category key to form the push topic
    pub fn with_topic_prefix(mut self, topic_prefix: impl Into<String>) -> Self {
        self.topic_prefix = topic_prefix.into();
        self
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Run one crawl: every failure is logged and counted, none is returned
    #[instrument(skip(self), fields(family = %self.family))]
    pub async fn execute_crawling(&self, log_prefix: &str) -> CrawlReport {
        info!("{} crawl started", log_prefix);
        let mut report = CrawlReport::default();

        let batch = match self.source.fetch_all_notices().await {
            Ok(batch) => batch,
            Err(e) => {
                error!(error = %e, "{} fetch failed, nothing stored", log_prefix);
                telemetry::record_crawl_run(&self.family, "fetch_failed");
                info!("{} crawl finished", log_prefix);
                return report;
            }
        };

        let today = self.calendar.today();
        let candidates = self.select_candidates(batch, &today, &mut report);

        let mut store_reachable = false;
        for (category, item) in &candidates {
            match self.store.save(category, item).await {
                Ok(true) => {
                    store_reachable = true;
                    report.inserted += 1;
                    telemetry::record_notice_new(&self.family, category);
                    self.notify(category, item, &mut report).await;
                }
                Ok(false) => {
                    store_reachable = true;
                    report.duplicates += 1;
                    telemetry::record_notice_duplicate(&self.family, category);
                    debug!(category = %category, item_id = %item.id, "Already stored");
                }
                Err(e) if !store_reachable => {
                    report.storage_failures += 1;
                    report.aborted = true;
                    error!(
                        category = %category,
                        item_id = %item.id,
                        error = %e,
                        "{} store unavailable, aborting run",
                        log_prefix
                    );
                    telemetry::record_crawl_run(&self.family, "aborted");
                    info!("{} crawl finished", log_prefix);
                    return report;
                }
                Err(e) => {
                    report.storage_failures += 1;
                    warn!(
                        category = %category,
                        item_id = %item.id,
                        error = %e,
                        "Save failed, skipping item"
                    );
                }
            }
        }

        telemetry::record_crawl_run(&self.family, "completed");
        info!(
            fetched = report.fetched,
            dated_today = report.dated_today,
            inserted = report.inserted,
            duplicates = report.duplicates,
            delivered = report.delivered,
            delivery_failures = report.delivery_failures,
            "{} crawl finished",
            log_prefix
        );
        report
    }

    /// Purge every stored row not dated today; errors are logged, never returned
    #[instrument(skip(self), fields(family = %self.family))]
    pub async fn delete_old_notices(&self, log_prefix: &str) -> u64 {
        // Families sharing the table may use either format
        let keep = self.calendar.today_all_formats();

        match self.store.delete_excluding_dates(&keep).await {
            Ok(removed) => {
                if removed > 0 {
                    info!(removed, "{} removed old notices", log_prefix);
                    telemetry::record_notices_purged(&self.family, removed);
                }
                removed
            }
            Err(e) => {
                error!(error = %e, "{} purge failed", log_prefix);
                0
            }
        }
    }

    /// Today's items in a stable order, minus those that cannot be stored safely
    fn select_candidates(
        &self,
        batch: NoticeBatch,
        today: &str,
        report: &mut CrawlReport,
    ) -> Vec<(String, NotificationPayload)> {
        let mut categories: Vec<_> = batch.into_iter().collect();
        categories.sort_by(|a, b| a.0.cmp(&b.0));

        let mut owners: HashMap<String, String> = HashMap::new();
        let mut candidates = Vec::new();

        for (category, items) in categories {
            for item in items {
                report.fetched += 1;
                if item.date != today {
                    continue;
                }
                report.dated_today += 1;

                if item.id.is_empty() {
                    report.rejected += 1;
                    warn!(category = %category, link = %item.link, "Item without id rejected");
                    continue;
                }

                match owners.get(&item.id) {
                    Some(owner) if owner != &category => {
                        report.rejected += 1;
                        warn!(
                            category = %category,
                            owner = %owner,
                            item_id = %item.id,
                            "Id already emitted by another category, rejected"
                        );
                        continue;
                    }
                    Some(_) => {}
                    None => {
                        owners.insert(item.id.clone(), category.clone());
                    }
                }

                candidates.push((category.clone(), item));
            }
        }

        candidates
    }

    async fn notify(&self, category: &str, item: &NotificationPayload, report: &mut CrawlReport) {
        let message = build_payload(self.strategy.as_ref(), item, category);
        let topic = format!("{}{}", self.topic_prefix, category);

        let persisted_at = Utc::now();
        let started = Instant::now();
        let sent = self.delivery.send_to_topic(&topic, &message).await;
        let elapsed = started.elapsed();
        let notified_at = Utc::now();

        if let Err(e) = sent {
            // The row stays: the item is never delivered twice
            report.delivery_failures += 1;
            telemetry::record_delivery_failure(&self.family, category);
            error!(
                category = %category,
                item_id = %item.id,
                topic = %topic,
                error = %e,
                "Delivery failed"
            );
            return;
        }

        report.delivered += 1;
        telemetry::record_risk_window(&self.family, elapsed.as_secs_f64());

        let record = RiskWindowRecord {
            category: category.to_string(),
            item_id: item.id.clone(),
            persisted_at,
            notified_at,
            elapsed_micros: i64::try_from(elapsed.as_micros()).unwrap_or(i64::MAX),
        };
        if let Err(e) = self.latency_log.save(&record).await {
            warn!(item_id = %item.id, error = %e, "Latency record not written");
        }
    }
}
