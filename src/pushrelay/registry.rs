use log::{debug, info};
use dashmap::DashMap;
use crate::error::Result;
use crate::pushrelay::subscription::Subscription;
use crate::pushrelay::types::Subscriptions;

/// Stores push subscriptions in a thread-safe manner, one per endpoint
#[derive(Default)]
pub struct SubscriptionRegistry {
    inner: Subscriptions,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Adds or replaces the subscription for its endpoint
    pub fn store(&self, subscription: Subscription) -> Result<()> {
        subscription.validate()?;
        info!("Subscribed {}", subscription.endpoint());

        let endpoint = subscription.endpoint.clone();
        if self.inner.insert(endpoint, subscription).is_some() {
            debug!("Replaced existing subscription for endpoint");
        }
        Ok(())
    }

    /// Removes the subscription for the endpoint, if any
    pub fn remove(&self, subscription: &Subscription) -> Option<Subscription> {
        info!("Unsubscribed {}", subscription.endpoint());

        match self.inner.remove(subscription.endpoint()) {
            Some((_, removed)) => Some(removed),
            None => {
                debug!("Endpoint not found for unsubscribe");
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn contains(&self, endpoint: &str) -> bool {
        self.inner.contains_key(endpoint)
    }

    pub fn get(&self, endpoint: &str) -> Option<Subscription> {
        self.inner.get(endpoint).map(|entry| entry.value().clone())
    }

    /// Snapshot of all stored subscriptions; no map guard outlives the call
    pub fn list(&self) -> Vec<Subscription> {
        let mut subscriptions = Vec::with_capacity(self.inner.len());
        subscriptions.extend(self.inner.iter().map(|entry| entry.value().clone()));
        debug!("Listed {} subscriptions", subscriptions.len());
        subscriptions
    }
}
