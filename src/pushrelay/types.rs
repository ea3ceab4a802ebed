use dashmap::DashMap;
use uuid::Uuid;
use crate::pushrelay::subscription::Subscription;

/// Endpoint = push service URL of one browser subscription
pub type Endpoint = String;

/// Mapping: Endpoint → stored subscription
pub type Subscriptions = DashMap<Endpoint, Subscription>;

/// Identifies one control-server session
pub type SessionId = Uuid;
