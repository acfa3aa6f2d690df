// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `WattBox` library.
//!
//! This module provides the error hierarchy used across the library:
//! value validation, telnet communication, response parsing, configuration
//! and polling refresh failures.
//!
//! Only two kinds of failure ever reach a caller as hard errors: failing to
//! establish a session ([`ProtocolError`]) and failing to send an outlet
//! control command. Parse anomalies are contained by the device layer, which
//! logs them and leaves the affected fields untouched.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during telnet communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A polling refresh failed.
    #[error(transparent)]
    Refresh(#[from] RefreshFailed),
}

impl Error {
    /// Returns `true` if this error is a connection-class failure.
    ///
    /// Connection-class failures are always recoverable by running the whole
    /// connect sequence again later.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
        /// The actual value that was provided.
        actual: u64,
    },

    /// An invalid outlet state string was provided.
    #[error("invalid outlet state: {0}")]
    InvalidPowerState(String),
}

/// Connection-class errors raised by the telnet session.
///
/// Handshake failures, timeouts and I/O failures are all reported here. A
/// rejected login is not distinguished from any other handshake failure: the
/// device simply never prints its success banner and the wait times out.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A bounded wait elapsed.
    #[error("timed out after {timeout_ms} ms waiting for {waiting_for}")]
    Timeout {
        /// What the session was waiting for.
        waiting_for: String,
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The session is not open.
    #[error("not connected")]
    NotConnected,

    /// The device closed the stream.
    #[error("connection closed by device")]
    ConnectionClosed,

    /// Underlying socket I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse and format anomalies in device responses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The response line has no `=` separator.
    #[error("missing '=' in response: {0:?}")]
    MissingSeparator(String),

    /// The response echo names a different command than the one expected.
    #[error("expected {expected} response, got {actual:?}")]
    UnexpectedEcho {
        /// The command name the parser expected to see echoed.
        expected: &'static str,
        /// The raw line that was received.
        actual: String,
    },

    /// The value list has fewer fields than required.
    #[error("{field} needs at least {expected} fields, got {actual}")]
    FieldCount {
        /// The response being parsed.
        field: &'static str,
        /// Minimum number of comma-separated fields.
        expected: usize,
        /// Number of fields received.
        actual: usize,
    },

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors related to configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The host is empty.
    #[error("host must not be empty")]
    MissingHost,

    /// The polling interval is outside the accepted range.
    #[error("polling interval {0}s is outside [{min}, {max}]", min = crate::config::MIN_POLLING_INTERVAL_SECS, max = crate::config::MAX_POLLING_INTERVAL_SECS)]
    PollingInterval(u64),

    /// The I/O timeout is zero.
    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    /// The outlet count hint is zero.
    #[error("outlet count must be greater than zero")]
    ZeroOutletCount,

    /// The outlet count hint is more than an outlet number can address.
    #[error("outlet count {0} exceeds {max}", max = crate::state::MAX_OUTLETS)]
    OutletCountTooLarge(usize),

    /// The configuration document could not be decoded.
    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),
}

/// A polling refresh failed.
///
/// The scheduler treats this as "mark the device unavailable and retry on the
/// next tick"; it is never fatal.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RefreshFailed {
    message: String,
    #[source]
    source: Box<Error>,
}

impl RefreshFailed {
    /// Wraps the error that aborted a refresh.
    #[must_use]
    pub fn new(source: Error) -> Self {
        let message = if source.is_connection_error() {
            format!("Connection error: {source}")
        } else {
            format!("Unexpected error: {source}")
        };
        Self {
            message,
            source: Box::new(source),
        }
    }

    /// Returns the human readable failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the error that aborted the refresh.
    #[must_use]
    pub fn cause(&self) -> &Error {
        &self.source
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
