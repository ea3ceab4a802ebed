use std::sync::{Arc, OnceLock};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::timeout;

use crate::error::{ErrorCode, PushError, Result};
use crate::pushrelay::config::{PushConfig, VapidConfig};
use crate::pushrelay::message::PushMessage;
use crate::pushrelay::registry::SubscriptionRegistry;
use crate::pushrelay::subscription::Subscription;
use crate::pushrelay::transport::{PushTransport, WebPush};

/// Outcome of one broadcast; informational only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Keeps track of browser subscriptions and fans notifications out to them
pub struct WebPushService {
    registry: SubscriptionRegistry,
    vapid: VapidConfig,
    push: PushConfig,
    transport: Arc<dyn PushTransport>,
    web_push: OnceLock<Arc<WebPush>>,
}

impl WebPushService {
    pub fn new(vapid: VapidConfig, push: PushConfig, transport: Arc<dyn PushTransport>) -> Self {
        Self {
            registry: SubscriptionRegistry::new(),
            vapid,
            push,
            transport,
            web_push: OnceLock::new(),
        }
    }

    /// Push client, created from the VAPID keys on first use
    pub fn web_push(&self) -> Result<Arc<WebPush>> {
        if let Some(web_push) = self.web_push.get() {
            return Ok(web_push.clone());
        }
        let created = WebPush::new(self.vapid.clone(), self.transport.clone())
            .map(Arc::new)
            .map_err(|e| PushError::new(ErrorCode::TransportUnavailable, format!("Push client not initialized: {}", e)))?;
        Ok(self.web_push.get_or_init(|| created).clone())
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn store(&self, subscription: Subscription) -> Result<()> {
        self.registry.store(subscription)
    }

    pub fn remove(&self, subscription: &Subscription) {
        self.registry.remove(subscription);
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Re-stores a subscription the browser still holds when the registry
    /// lost everything (e.g. after a restart). Returns whether it was stored.
    pub fn restore(&self, subscription: Subscription) -> Result<bool> {
        // Best-effort: concurrent restores into an empty registry may both store.
        if !self.registry.is_empty() {
            debug!("Registry not empty, keeping existing subscriptions");
            return Ok(false);
        }
        info!("Restoring existing browser subscription {}", subscription.endpoint());
        self.registry.store(subscription)?;
        Ok(true)
    }

    /// Sends a notification to all subscriptions.
    pub async fn notify_all(&self, title: &str, body: &str, extra: Option<Value>) -> BroadcastReport {
        let message = PushMessage::new(title, body).with_data(extra);
        self.broadcast(&message).await
    }

    /// Sends a notification that opens `url` when clicked.
    pub async fn notify_all_with_url(&self, title: &str, body: &str, url: &str) -> BroadcastReport {
        let message = PushMessage::new(title, body)
            .with_url(url)
            .with_icon(self.push.icon.clone());
        self.broadcast(&message).await
    }

    pub fn default_url(&self) -> &str {
        &self.push.default_url
    }

    async fn broadcast(&self, message: &PushMessage) -> BroadcastReport {
        let subscriptions = self.registry.list();
        let mut report = BroadcastReport {
            attempted: subscriptions.len(),
            ..Default::default()
        };
        if subscriptions.is_empty() {
            debug!("No subscriptions, skipping broadcast of {:?}", message.title);
            return report;
        }
        debug!("Broadcasting {:?} to {} subscriptions", message.title, report.attempted);

        let web_push = match self.web_push() {
            Ok(web_push) => web_push,
            Err(e) => {
                error!("Cannot broadcast, push client unavailable: {}", e);
                report.failed = report.attempted;
                return report;
            }
        };

        for subscription in &subscriptions {
            match self.deliver(&web_push, subscription, message).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("Delivery to {} failed: {}", subscription.endpoint(), e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Broadcast completed. Delivered to {}/{} subscriptions",
            report.delivered, report.attempted
        );
        report
    }

    async fn deliver(&self, web_push: &WebPush, subscription: &Subscription, message: &PushMessage) -> Result<()> {
        let limit = self.push.delivery_timeout();
        match timeout(limit, web_push.send_notification(subscription, message)).await {
            Ok(result) => result,
            Err(_) => Err(PushError::new(
                ErrorCode::DeliveryTimeout,
                format!("No answer from push service within {:?}", limit),
            )),
        }
    }
}
