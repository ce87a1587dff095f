use crate::delivery::NotificationDelivery;
use crate::errors::DeliveryError;
use crate::models::NotificationMessage;
use async_trait::async_trait;
use std::collections::HashMap;

/// Dry-run delivery that only logs what would have been pushed
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDelivery;

#[async_trait]
impl NotificationDelivery for LogDelivery {
    async fn send_to_topic(
        &self,
        topic: &str,
        message: &NotificationMessage,
    ) -> Result<(), DeliveryError> {
        tracing::info!(
            topic,
            title = %message.title,
            body = %message.body,
            item_id = %message.data.id,
            link = %message.data.link,
            "Push (dry run) to topic"
        );
        Ok(())
    }

    async fn send_to_device(
        &self,
        token: &str,
        title: &str,
        data: &HashMap<String, String>,
    ) -> Result<(), DeliveryError> {
        tracing::info!(token, title, data = ?data, "Push (dry run) to device");
        Ok(())
    }
}
