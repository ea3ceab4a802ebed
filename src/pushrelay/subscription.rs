use serde::{Deserialize, Serialize};
use crate::error::{ErrorCode, PushError};

/// Browser push subscription, in the shape of `PushSubscription.toJSON()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<u64>,
}

/// Client key material; opaque to the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

impl Subscription {
    pub fn new(endpoint: impl Into<String>, p256dh: impl Into<String>, auth: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            keys: SubscriptionKeys {
                p256dh: p256dh.into(),
                auth: auth.into(),
            },
            expiration_time: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Rejects records that could never be delivered to
    pub fn validate(&self) -> Result<(), PushError> {
        if self.endpoint.trim().is_empty() {
            return Err(PushError::new(ErrorCode::InvalidSubscription, "Subscription endpoint is empty"));
        }
        if self.keys.p256dh.is_empty() || self.keys.auth.is_empty() {
            return Err(PushError::new(
                ErrorCode::InvalidSubscription,
                format!("Subscription {} is missing p256dh/auth keys", self.endpoint),
            ));
        }
        Ok(())
    }
}
