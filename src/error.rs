// src/error.rs
//! Error types for the tracker gateway

use std::fmt;

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug)]
pub enum GatewayError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Http(reqwest::Error),
    Decode(DecodeError),
    Publish(PublishError),
    Connection(String),
    Config(String),
    Other(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Io(e) => write!(f, "IO error: {}", e),
            GatewayError::Json(e) => write!(f, "JSON error: {}", e),
            GatewayError::Http(e) => write!(f, "HTTP error: {}", e),
            GatewayError::Decode(e) => write!(f, "Decode error: {}", e),
            GatewayError::Publish(e) => write!(f, "Publish error: {}", e),
            GatewayError::Connection(msg) => write!(f, "Connection error: {}", msg),
            GatewayError::Config(msg) => write!(f, "Config error: {}", msg),
            GatewayError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<std::io::Error> for GatewayError {
    fn from(error: std::io::Error) -> Self {
        GatewayError::Io(error)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        GatewayError::Json(error)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        GatewayError::Http(error)
    }
}

impl From<DecodeError> for GatewayError {
    fn from(error: DecodeError) -> Self {
        GatewayError::Decode(error)
    }
}

impl From<PublishError> for GatewayError {
    fn from(error: PublishError) -> Self {
        GatewayError::Publish(error)
    }
}

impl From<anyhow::Error> for GatewayError {
    fn from(error: anyhow::Error) -> Self {
        GatewayError::Other(error.to_string())
    }
}

/// Why a frame carrying the fix marker could not be turned into a fix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame is shorter than the fixed fix layout
    BufferTooShort { needed: usize, actual: usize },
    /// A consumed BCD digit is not in `0-9`
    MalformedDigit { field: &'static str, text: String },
    /// The rolled over calendar value cannot be represented as a local time
    InvalidTimestamp {
        year: u32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::BufferTooShort { needed, actual } => {
                write!(f, "frame too short: need {} bytes, got {}", needed, actual)
            }
            DecodeError::MalformedDigit { field, text } => {
                write!(f, "malformed BCD digits in {}: {:?}", field, text)
            }
            DecodeError::InvalidTimestamp {
                year,
                month,
                day,
                hour,
                minute,
                second,
            } => write!(
                f,
                "invalid timestamp {:02}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Transport failure while sending a fix to one sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishError {
    pub url: String,
    pub message: String,
}

impl PublishError {
    pub fn new(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET {} failed: {}", self.url, self.message)
    }
}

impl std::error::Error for PublishError {}
