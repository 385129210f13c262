//! Web Push subscription registration.

use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{ApiClient, ApiResult, RequestOptions};

const SUBSCRIBE_PATH: &str = "/notifications/subscribe";

/// Public keys of a push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A push endpoint and its keys, as produced by the browser's push manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// Server acknowledgement for (un)subscribe calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushAck {
    #[serde(default)]
    pub message: String,
}

pub struct PushClient {
    client: Arc<ApiClient>,
}

impl PushClient {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// # Errors
    /// Propagates the [`ApiError`](crate::api::ApiError) of the underlying call.
    pub async fn subscribe(&self, subscription: &PushSubscription) -> ApiResult<PushAck> {
        let body = json!({
            "endpoint": subscription.endpoint,
            "keys": {
                "p256dh": subscription.keys.p256dh,
                "auth": subscription.keys.auth,
            },
        });
        let ack: Option<PushAck> = self
            .client
            .request_json(Method::POST, SUBSCRIBE_PATH, RequestOptions::json(body))
            .await?;
        tracing::info!("push subscription registered");
        Ok(ack.unwrap_or_default())
    }

    /// # Errors
    /// Propagates the [`ApiError`](crate::api::ApiError) of the underlying call.
    pub async fn unsubscribe(&self, endpoint: &str) -> ApiResult<PushAck> {
        let body = json!({ "endpoint": endpoint });
        let ack: Option<PushAck> = self
            .client
            .request_json(Method::DELETE, SUBSCRIBE_PATH, RequestOptions::json(body))
            .await?;
        tracing::info!("push subscription removed");
        Ok(ack.unwrap_or_default())
    }
}
