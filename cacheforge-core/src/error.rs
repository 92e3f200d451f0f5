//! # CacheForge Error Types
//!
//! Errors raised inside the synchronization layer.
//!
//! Only configuration and validation errors ever reach callers. Fetch
//! errors are absorbed by the scheduler, aggregator and gateway and turned
//! into activity log entries.

use cacheforge_types::CounterName;
use thiserror::Error;

use crate::gateway::Operation;

/// Result type alias for CacheForge operations
pub type Result<T> = std::result::Result<T, CacheForgeError>;

/// Failure of a single call to the cache service
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, timeout or body read failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status, with the service error body when it decoded
    #[error("{}", status_message(*status, code.as_deref(), message.as_deref()))]
    Status {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },

    /// Response body did not match the expected shape
    #[error("decode error: {0}")]
    Decode(String),

    /// Meter response lacks the sample slot this counter reads
    #[error("{counter} has no measurement at index {index}")]
    MissingMeasurement { counter: CounterName, index: usize },

    /// Meter reported a value that cannot be a counter reading
    #[error("{counter} reported invalid value {value}")]
    InvalidMeasurement { counter: CounterName, value: f64 },

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

fn status_message(status: u16, code: Option<&str>, message: Option<&str>) -> String {
    match (code, message) {
        (Some(code), Some(message)) => format!("HTTP {}: {} ({})", status, message, code),
        (Some(code), None) => format!("HTTP {}: {}", status, code),
        _ => format!("HTTP {}", status),
    }
}

impl FetchError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// True for failures where the service was never reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Rejected gateway input; no request is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}", missing_fields_message(*operation))]
    MissingFields { operation: Operation },

    #[error("TTL must be -1 or > 0")]
    InvalidTtl { ttl: i64 },
}

fn missing_fields_message(operation: Operation) -> String {
    match operation {
        Operation::Set => "Namespace, key and value required for SET".to_string(),
        other => format!("Namespace and key required for {}", other),
    }
}

/// Core error types for CacheForge
#[derive(Error, Debug)]
pub enum CacheForgeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Fetch errors surfaced by one-shot calls
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Gateway validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CacheForgeError {
    /// Create a new configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
