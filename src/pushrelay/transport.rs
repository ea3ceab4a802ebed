use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use crate::error::Result;
use crate::pushrelay::config::VapidConfig;
use crate::pushrelay::message::PushMessage;
use crate::pushrelay::subscription::Subscription;

/// Delivers an encoded payload to one browser push endpoint
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn deliver(&self, vapid: &VapidConfig, subscription: &Subscription, payload: &[u8]) -> Result<()>;
}

/// Transport that only logs what would be sent
#[derive(Debug, Default)]
pub struct LoggingTransport;

#[async_trait]
impl PushTransport for LoggingTransport {
    async fn deliver(&self, vapid: &VapidConfig, subscription: &Subscription, payload: &[u8]) -> Result<()> {
        info!(
            "Push to {} as {}: {}",
            subscription.endpoint(),
            vapid.subject,
            String::from_utf8_lossy(payload)
        );
        Ok(())
    }
}

/// Push client bound to the application server's VAPID identity
pub struct WebPush {
    vapid: VapidConfig,
    transport: Arc<dyn PushTransport>,
}

impl WebPush {
    pub fn new(vapid: VapidConfig, transport: Arc<dyn PushTransport>) -> Result<Self> {
        vapid.validate()?;
        debug!("Push client initialized for subject {}", vapid.subject);
        Ok(Self { vapid, transport })
    }

    pub fn public_key(&self) -> &str {
        &self.vapid.public_key
    }

    pub async fn send_notification(&self, subscription: &Subscription, message: &PushMessage) -> Result<()> {
        let payload = message.encode()?;
        debug!("Sending {} byte payload to {}", payload.len(), subscription.endpoint());
        self.transport.deliver(&self.vapid, subscription, &payload).await
    }
}
