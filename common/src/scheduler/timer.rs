// Cron trigger: fires a task on a cron cadence until shutdown

use crate::errors::ScheduleError;
use crate::schedule::{next_fire_after, parse_cron_expression};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule as CronSchedule;
use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// One cron cadence evaluated in a fixed timezone
#[derive(Debug, Clone)]
pub struct CronTrigger {
    name: String,
    expression: String,
    schedule: CronSchedule,
    timezone: Tz,
}

impl CronTrigger {
    pub fn new(
        name: impl Into<String>,
        expression: &str,
        timezone: Tz,
    ) -> Result<Self, ScheduleError> {
        Ok(Self {
            name: name.into(),
            expression: expression.to_string(),
            schedule: parse_cron_expression(expression)?,
            timezone,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Next firing strictly after `after`
    pub fn next_fire(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
        next_fire_after(&self.schedule, self.timezone, after).ok_or_else(|| {
            ScheduleError::NoNextExecution {
                expression: self.expression.clone(),
            }
        })
    }

    /// Fire `task` at every cron instant until `shutdown` is signalled
    ///
    /// Each firing is spawned on its own, so a slow run never delays or
    /// cancels the next one. On shutdown no new firing starts and the call
    /// returns once every in-flight run has finished.
    pub async fn run<F, Fut>(&self, mut shutdown: broadcast::Receiver<()>, task: F)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        info!(trigger = %self.name, cron = %self.expression, "Trigger started");
        let mut in_flight = JoinSet::new();

        loop {
            let now = Utc::now();
            let next = match self.next_fire(now) {
                Ok(next) => next,
                Err(e) => {
                    warn!(trigger = %self.name, error = %e, "Trigger has no future firing");
                    break;
                }
            };
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            debug!(trigger = %self.name, next = %next, "Waiting for next firing");

            tokio::select! {
                _ = sleep(wait) => {
                    in_flight.spawn(task());
                }
                Some(finished) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = finished {
                        error!(trigger = %self.name, error = %e, "Triggered run panicked");
                    }
                }
                _ = shutdown.recv() => {
                    info!(trigger = %self.name, in_flight = in_flight.len(), "Shutdown signal received");
                    break;
                }
            }
        }

        while let Some(finished) = in_flight.join_next().await {
            if let Err(e) = finished {
                error!(trigger = %self.name, error = %e, "Triggered run panicked");
            }
        }

        info!(trigger = %self.name, "Trigger stopped");
    }
}
