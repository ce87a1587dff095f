// Scheduler module: per-family crawl pipeline and the cron timers that drive it

pub mod crawl;
pub mod engine;
pub mod timer;

pub use crawl::CrawlScheduler;
pub use engine::{FamilySchedule, SchedulerEngine};
pub use timer::CronTrigger;
