use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorCode, PushError, Result};
use crate::pushrelay::sales::SalesRecord;
use crate::pushrelay::service::BroadcastReport;
use crate::pushrelay::subscription::Subscription;

/// One line of input from a control client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Subscribe { subscription: Subscription },
    Unsubscribe { subscription: Subscription },
    Restore { subscription: Subscription },
    Status,
    Fetch,
    Report {
        #[serde(default = "default_notify")]
        notify: bool,
    },
    Notify {
        title: String,
        body: String,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        data: Option<Value>,
    },
}

fn default_notify() -> bool {
    true
}

impl Request {
    pub const OPS: [&'static str; 7] = ["subscribe", "unsubscribe", "restore", "status", "fetch", "report", "notify"];

    pub fn parse(line: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| PushError::new(ErrorCode::MalformedRequest, format!("Invalid JSON: {}", e)))?;

        match value.get("op").and_then(Value::as_str) {
            None => return Err(PushError::new(ErrorCode::MalformedRequest, "Request has no \"op\" field")),
            Some(op) if !Self::OPS.iter().any(|known| *known == op) => {
                return Err(PushError::new(ErrorCode::UnknownCommand, format!("Unknown op {:?}", op)))
            }
            Some(_) => {}
        }

        serde_json::from_value(value)
            .map_err(|e| PushError::new(ErrorCode::MalformedRequest, format!("Invalid request: {}", e)))
    }
}

/// One line of output to a control client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Ok,
    Restored { stored: bool },
    Status { subscriptions: usize, empty: bool },
    Pending { op: String },
    Fetched { text: String },
    Report {
        records: Vec<SalesRecord>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        broadcast: Option<BroadcastReport>,
    },
    Broadcast(BroadcastReport),
    Error { code: u16, message: String },
}

impl Response {
    pub fn pending(op: &str) -> Self {
        Self::Pending { op: op.to_string() }
    }

    pub fn from_error(error: &PushError) -> Self {
        let (code, message) = error.to_wire();
        Self::Error { code, message }
    }

    pub fn encode_line(&self) -> Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}
