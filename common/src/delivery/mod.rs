// Push delivery collaborators

pub mod fcm;
pub mod log;

use crate::errors::DeliveryError;
use crate::models::NotificationMessage;
use async_trait::async_trait;
use std::collections::HashMap;

pub use fcm::FcmHttpDelivery;
pub use log::LogDelivery;

/// Sends composed pushes; errors are reported, never retried here
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDelivery: Send + Sync {
    /// Broadcast to every device subscribed to `topic`
    async fn send_to_topic(
        &self,
        topic: &str,
        message: &NotificationMessage,
    ) -> Result<(), DeliveryError>;

    /// Push to a single registered device
    async fn send_to_device(
        &self,
        token: &str,
        title: &str,
        data: &HashMap<String, String>,
    ) -> Result<(), DeliveryError>;
}
