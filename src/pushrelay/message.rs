use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::Result;

/// Notification handed to the push transport, encoded as JSON for the
/// service worker's `showNotification(title, options)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub title: String,
    pub options: PushOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushOptions {
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Extra data read by the service worker to focus or open a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushData {
    pub url: String,
}

impl PushMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            options: PushOptions {
                body: body.into(),
                data: None,
                icon: None,
            },
        }
    }

    pub fn with_data(mut self, data: Option<Value>) -> Self {
        self.options.data = data;
        self
    }

    pub fn with_url(self, url: impl Into<String>) -> Self {
        let data = serde_json::to_value(PushData { url: url.into() }).ok();
        self.with_data(data)
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.options.icon = icon;
        self
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
