use std::io;
use thiserror::Error;

/// Custom error type for the sampler
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Metric collection failed: {0}")]
    CollectionFailure(String),

    #[error("Subscriber failed: {0}")]
    SubscriberFailure(String),

    #[error("Volume enumeration failed: {0}")]
    EnumerationFailure(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for the sampler
pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    /// Create an invalid configuration error
    pub fn invalid_configuration<S: Into<String>>(msg: S) -> Self {
        MonitorError::InvalidConfiguration(msg.into())
    }

    /// Create a collection failure error
    pub fn collection<S: Into<String>>(msg: S) -> Self {
        MonitorError::CollectionFailure(msg.into())
    }

    pub fn subscriber<S: Into<String>>(msg: S) -> Self {
        MonitorError::SubscriberFailure(msg.into())
    }

    pub fn enumeration<S: Into<String>>(msg: S) -> Self {
        MonitorError::EnumerationFailure(msg.into())
    }
}
