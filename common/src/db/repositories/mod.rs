// Repository layer for database operations

pub mod notice;
pub mod risk_window;

pub use notice::{NoticeRepository, NoticeStore};
pub use risk_window::{LatencyLog, RiskWindowRepository};

#[cfg(test)]
pub use notice::MockNoticeStore;
#[cfg(test)]
pub use risk_window::MockLatencyLog;
