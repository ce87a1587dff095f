// Scheduler engine implementation
// Owns the crawl and purge triggers of every category family

use super::crawl::CrawlScheduler;
use super::timer::CronTrigger;
use futures::future::join_all;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, instrument};

/// A family's pipeline with its two cadences
pub struct FamilySchedule {
    pub scheduler: Arc<CrawlScheduler>,
    pub crawl: CronTrigger,
    pub purge: CronTrigger,
}

impl FamilySchedule {
    pub fn new(scheduler: CrawlScheduler, crawl: CronTrigger, purge: CronTrigger) -> Self {
        Self {
            scheduler: Arc::new(scheduler),
            crawl,
            purge,
        }
    }

    fn log_prefix(&self) -> String {
        format!("[{}]", self.scheduler.family())
    }
}

/// Main scheduler engine implementation
pub struct SchedulerEngine {
    families: Vec<FamilySchedule>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SchedulerEngine {
    pub fn new(families: Vec<FamilySchedule>) -> Self {
        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);
        Self {
            families,
            shutdown_tx,
        }
    }

    pub fn families(&self) -> &[FamilySchedule] {
        &self.families
    }

    /// Get a shutdown signal receiver
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Run every trigger until `stop` is called
    ///
    /// Returns after all triggers have stopped and their in-flight runs
    /// have completed.
    #[instrument(skip(self))]
    pub async fn start(&self) {
        info!(families = self.families.len(), "Starting scheduler engine");

        let mut triggers: Vec<Pin<Box<dyn Future<Output = ()> + Send + '_>>> = Vec::new();

        for family in &self.families {
            let prefix = family.log_prefix();

            let scheduler = family.scheduler.clone();
            let crawl_prefix = prefix.clone();
            triggers.push(Box::pin(family.crawl.run(
                self.shutdown_receiver(),
                move || {
                    let scheduler = scheduler.clone();
                    let prefix = crawl_prefix.clone();
                    async move {
                        scheduler.execute_crawling(&prefix).await;
                    }
                },
            )));

            let scheduler = family.scheduler.clone();
            triggers.push(Box::pin(family.purge.run(
                self.shutdown_receiver(),
                move || {
                    let scheduler = scheduler.clone();
                    let prefix = prefix.clone();
                    async move {
                        scheduler.delete_old_notices(&prefix).await;
                    }
                },
            )));
        }

        join_all(triggers).await;
        info!("Scheduler engine stopped");
    }

    /// Signal every trigger to stop; in-flight runs are left to finish
    #[instrument(skip(self))]
    pub fn stop(&self) {
        info!("Stopping scheduler engine");
        let _ = self.shutdown_tx.send(());
    }
}
