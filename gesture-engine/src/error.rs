//! Error types for the gesture engine
//!
//! Link and decode errors are always recoverable and never leave the engine:
//! the link client turns link errors into a delayed reconnect and drops
//! messages that fail to decode. The crate `Error` only covers setup.

use std::time::Duration;
use thiserror::Error;

/// Transport/connection failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    /// Could not open a connection to the bridge
    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    /// Connection attempt exceeded the configured timeout
    #[error("Connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// Reading from an open connection failed
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    /// Peer closed the connection
    #[error("Connection closed")]
    Closed,
}

/// Single-message decode failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Not valid JSON, or JSON with none of the recognised fields
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// `motion_type` value other than stomp/kick
    #[error("Unknown motion type: {0}")]
    UnknownMotionType(String),

    /// Binary IMU frame shorter than the fixed layout
    #[error("Truncated IMU frame: {len} bytes")]
    TruncatedFrame { len: usize },
}

/// Session setup failures
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded or failed validation
    #[error(transparent)]
    Common(#[from] gesture_common::Error),
}

/// Convenience Result type using the engine Error
pub type Result<T> = std::result::Result<T, Error>;
