// Database layer module: SQLite pool, item store and latency log

pub mod pool;
pub mod repositories;

pub use pool::DbPool;
pub use repositories::{LatencyLog, NoticeRepository, NoticeStore, RiskWindowRepository};
