//! Error module for pushrelay
//!
//! This module defines error types and codes used throughout the relay:
//! control requests, the subscription registry, push delivery and the
//! simulated backend.

use thiserror::Error;
use std::fmt;

/// Error code reported to control clients and logged with failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request errors (0x0001-0x00FF)
    MalformedRequest = 0x0001,
    UnknownCommand = 0x0002,
    Busy = 0x0003,

    // Registry errors (0x0100-0x01FF)
    InvalidSubscription = 0x0101,

    // Delivery errors (0x0200-0x02FF)
    DeliveryFailed = 0x0201,
    DeliveryTimeout = 0x0202,
    TransportUnavailable = 0x0203,

    // System errors (0x0300-0x03FF)
    InternalServerError = 0x0301,
    ConfigInvalid = 0x0302,
    OperationInterrupted = 0x0303,

    // Session errors (0x0400-0x04FF)
    ReadFailed = 0x0401,
    WriteFailed = 0x0402,
    UiClosed = 0x0403,
}

impl ErrorCode {
    /// Get the error code as a u16
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the error code category
    pub fn category(&self) -> ErrorCategory {
        match *self as u16 {
            0x0001..=0x00FF => ErrorCategory::Request,
            0x0100..=0x01FF => ErrorCategory::Registry,
            0x0200..=0x02FF => ErrorCategory::Delivery,
            0x0300..=0x03FF => ErrorCategory::System,
            0x0400..=0x04FF => ErrorCategory::Session,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Try to convert a u16 to an ErrorCode
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            0x0001 => Some(Self::MalformedRequest),
            0x0002 => Some(Self::UnknownCommand),
            0x0003 => Some(Self::Busy),
            0x0101 => Some(Self::InvalidSubscription),
            0x0201 => Some(Self::DeliveryFailed),
            0x0202 => Some(Self::DeliveryTimeout),
            0x0203 => Some(Self::TransportUnavailable),
            0x0301 => Some(Self::InternalServerError),
            0x0302 => Some(Self::ConfigInvalid),
            0x0303 => Some(Self::OperationInterrupted),
            0x0401 => Some(Self::ReadFailed),
            0x0402 => Some(Self::WriteFailed),
            0x0403 => Some(Self::UiClosed),
            _ => None,
        }
    }

    /// Get a human-readable description of the error code
    pub fn description(&self) -> &'static str {
        match self {
            Self::MalformedRequest => "Request line is not valid JSON",
            Self::UnknownCommand => "Unknown request op",
            Self::Busy => "An operation is already running for this session",
            Self::InvalidSubscription => "Subscription is missing its endpoint or keys",
            Self::DeliveryFailed => "Push service rejected the message",
            Self::DeliveryTimeout => "Push delivery timed out",
            Self::TransportUnavailable => "Push transport could not be initialized",
            Self::InternalServerError => "Unexpected server error",
            Self::ConfigInvalid => "Invalid configuration",
            Self::OperationInterrupted => "Background operation was interrupted",
            Self::ReadFailed => "Failed to read from connection",
            Self::WriteFailed => "Failed to write to connection",
            Self::UiClosed => "Session executor is closed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MalformedRequest => "MALFORMED_REQUEST",
            Self::UnknownCommand => "UNKNOWN_COMMAND",
            Self::Busy => "BUSY",
            Self::InvalidSubscription => "INVALID_SUBSCRIPTION",
            Self::DeliveryFailed => "DELIVERY_FAILED",
            Self::DeliveryTimeout => "DELIVERY_TIMEOUT",
            Self::TransportUnavailable => "TRANSPORT_UNAVAILABLE",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::ConfigInvalid => "CONFIG_INVALID",
            Self::OperationInterrupted => "OPERATION_INTERRUPTED",
            Self::ReadFailed => "READ_FAILED",
            Self::WriteFailed => "WRITE_FAILED",
            Self::UiClosed => "UI_CLOSED",
        };
        write!(f, "{} (0x{:04X})", name, *self as u16)
    }
}

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Request,
    Registry,
    Delivery,
    System,
    Session,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => write!(f, "Request"),
            Self::Registry => write!(f, "Registry"),
            Self::Delivery => write!(f, "Delivery"),
            Self::System => write!(f, "System"),
            Self::Session => write!(f, "Session"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Main error type for pushrelay
#[derive(Error, Debug)]
pub enum PushError {
    #[error("{code}: {message}")]
    Standard {
        code: ErrorCode,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown error: {0}")]
    Other(String),
}

impl PushError {
    /// Create a new standard error with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Standard {
            code,
            message: message.into(),
        }
    }

    /// Get the error code if this is a standard error
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Standard { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Code and message pair as sent back to control clients
    pub fn to_wire(&self) -> (u16, String) {
        match self {
            Self::Standard { code, message } => (code.as_u16(), message.clone()),
            _ => (ErrorCode::InternalServerError.as_u16(), self.to_string()),
        }
    }
}

/// Result type alias for pushrelay operations
pub type Result<T> = std::result::Result<T, PushError>;

impl From<String> for PushError {
    fn from(message: String) -> Self {
        Self::Other(message)
    }
}

impl From<&str> for PushError {
    fn from(message: &str) -> Self {
        Self::Other(message.to_string())
    }
}
