// FCM HTTP push delivery

use crate::delivery::NotificationDelivery;
use crate::errors::DeliveryError;
use crate::models::NotificationMessage;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Request body of the FCM HTTP send endpoint
#[derive(Debug, Clone, Serialize)]
pub struct FcmRequest<'a> {
    pub to: String,
    pub notification: FcmNotification<'a>,
    pub data: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmNotification<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<&'a str>,
}

/// The fields of an FCM response we act on
#[derive(Debug, Clone, Deserialize)]
struct FcmResponse {
    #[serde(default)]
    failure: u32,
    #[serde(default)]
    error: Option<String>,
}

/// Pushes through the FCM HTTP endpoint with a server key
pub struct FcmHttpDelivery {
    client: Client,
    endpoint: String,
    server_key: String,
}

impl FcmHttpDelivery {
    pub fn new(
        endpoint: impl Into<String>,
        server_key: impl Into<String>,
        timeout_seconds: u64,
    ) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| DeliveryError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            server_key: server_key.into(),
        })
    }

    async fn send(&self, request: &FcmRequest<'_>) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // 200 can still carry per-message failures
        let parsed: FcmResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(to = %request.to, error = %e, "Unreadable push response body");
            DeliveryError::from(e)
        })?;
        if parsed.failure > 0 || parsed.error.is_some() {
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(to = %request.to, "Push accepted");
        Ok(())
    }
}

#[async_trait]
impl NotificationDelivery for FcmHttpDelivery {
    #[instrument(skip(self, message), fields(item_id = %message.data.id))]
    async fn send_to_topic(
        &self,
        topic: &str,
        message: &NotificationMessage,
    ) -> Result<(), DeliveryError> {
        let request = FcmRequest {
            to: format!("/topics/{}", topic),
            notification: FcmNotification {
                title: &message.title,
                body: Some(&message.body),
            },
            data: message.data.to_map(),
        };
        self.send(&request).await
    }

    #[instrument(skip(self, token, data))]
    async fn send_to_device(
        &self,
        token: &str,
        title: &str,
        data: &HashMap<String, String>,
    ) -> Result<(), DeliveryError> {
        let request = FcmRequest {
            to: token.to_string(),
            notification: FcmNotification { title, body: None },
            data: data.clone(),
        };
        self.send(&request).await
    }
}
