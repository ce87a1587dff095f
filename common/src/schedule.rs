// Schedule parsing and calendar module
//
// Cron expressions drive the crawl and purge timers; the notice calendar
// decides what "today" means for a family's listings.

use crate::errors::ScheduleError;
use crate::models::DateFormat;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule as CronSchedule;
use std::str::FromStr;
use std::sync::Arc;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Computes "today" in the source site's timezone and date format
#[derive(Clone)]
pub struct NoticeCalendar {
    clock: Arc<dyn Clock>,
    timezone: Tz,
    format: DateFormat,
}

impl NoticeCalendar {
    pub fn new(clock: Arc<dyn Clock>, timezone: Tz, format: DateFormat) -> Self {
        Self {
            clock,
            timezone,
            format,
        }
    }

    /// Calendar on the system clock in the default timezone
    pub fn system(format: DateFormat) -> Self {
        Self::new(Arc::new(SystemClock), default_timezone(), format)
    }

    /// Today in the family's own format
    pub fn today(&self) -> String {
        self.today_as(self.format)
    }

    pub fn today_as(&self, format: DateFormat) -> String {
        self.clock
            .now()
            .with_timezone(&self.timezone)
            .format(format.pattern())
            .to_string()
    }

    /// Today in every supported format
    pub fn today_all_formats(&self) -> Vec<String> {
        DateFormat::all()
            .iter()
            .map(|format| self.today_as(*format))
            .collect()
    }
}

/// Parse and validate a cron expression
///
/// Expressions carry a leading seconds field, e.g. `0 */10 9-18 * * Mon-Fri`.
pub fn parse_cron_expression(expression: &str) -> Result<CronSchedule, ScheduleError> {
    CronSchedule::from_str(expression).map_err(|e| ScheduleError::InvalidCronExpression {
        expression: expression.to_string(),
        reason: e.to_string(),
    })
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz, ScheduleError> {
    Tz::from_str(name).map_err(|_| ScheduleError::InvalidTimezone(name.to_string()))
}

/// Next firing strictly after `after`, evaluated in `timezone`
pub fn next_fire_after(
    schedule: &CronSchedule,
    timezone: Tz,
    after: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    schedule
        .after(&after.with_timezone(&timezone))
        .next()
        .map(|next| next.with_timezone(&Utc))
}

/// Timezone the bulletin sites publish in
pub fn default_timezone() -> Tz {
    chrono_tz::Asia::Seoul
}
