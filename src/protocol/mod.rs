// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol implementation for communicating with `WattBox` devices.
//!
//! The device exposes a line-oriented command interface over telnet. A
//! [`Session`] owns the stream, framed by [`TelnetCodec`], and the login
//! handshake; [`TelnetClient`] builds on it to send one command line and
//! read one response line.
//!
//! # Session States
//!
//! ```text
//! Disconnected -> Connecting -> Authenticating -> Ready
//!      ^                                            |
//!      +------- disconnect() or I/O failure --------+
//! ```
//!
//! A read timeout does not end the session: the unread input is discarded
//! and the next command is sent on the same stream.
//!
//! The [`Protocol`] trait is the seam between the command layer and the
//! transport, so the command layer can be driven by any line transport.

mod codec;
#[cfg(test)]
pub(crate) mod mock;
mod session;
mod telnet;

pub use codec::TelnetCodec;
pub use session::{Session, SessionState};
pub use telnet::{TelnetClient, TelnetConfig};

use crate::command::Command;
use crate::error::{ParseError, ProtocolError};

/// A single response line from the device.
///
/// Responses have the shape `<CommandEcho>=<value>`, for example
/// `?OutletCount=12`. Lines may also be empty when the device has nothing
/// buffered for the command just sent.
///
/// # Examples
///
/// ```
/// use wattbox_lib::protocol::CommandResponse;
///
/// let response = CommandResponse::new("?PowerStatus=1.20,140.00,121.30,1");
/// assert_eq!(response.echo(), Some("?PowerStatus"));
/// assert_eq!(response.value().unwrap(), "1.20,140.00,121.30,1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    line: String,
}

impl CommandResponse {
    /// Creates a response from a raw line, trimming surrounding whitespace.
    #[must_use]
    pub fn new(line: impl Into<String>) -> Self {
        let line: String = line.into();
        Self {
            line: line.trim().to_string(),
        }
    }

    /// Returns the trimmed response line.
    #[must_use]
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Returns `true` if the device answered with an empty line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    /// Returns the text before the first `=`, if there is one.
    #[must_use]
    pub fn echo(&self) -> Option<&str> {
        self.line.split_once('=').map(|(echo, _)| echo)
    }

    /// Returns the trimmed text after the first `=`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingSeparator` if the line has no `=`.
    pub fn value(&self) -> Result<&str, ParseError> {
        self.line
            .split_once('=')
            .map(|(_, value)| value.trim())
            .ok_or_else(|| ParseError::MissingSeparator(self.line.clone()))
    }

    /// Returns the value after checking that the echo names `command`.
    ///
    /// Used for delayed and status responses, where a stale line from a
    /// different command must not be mistaken for the wanted one.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingSeparator` if the line has no `=`, or
    /// `ParseError::UnexpectedEcho` if the echo names another command.
    pub fn value_for(&self, command: &'static str) -> Result<&str, ParseError> {
        let value = self.value()?;
        match self.echo() {
            Some(echo) if echo.contains(command) => Ok(value),
            _ => Err(ParseError::UnexpectedEcho {
                expected: command,
                actual: self.line.clone(),
            }),
        }
    }
}

/// Trait for transports that carry `WattBox` command lines.
///
/// Every call that talks to the device takes `&mut self`: the device has a
/// single command/response pipeline, and interleaving two requests would
/// pair responses with the wrong commands.
#[allow(async_fn_in_trait)]
pub trait Protocol {
    /// Opens and authenticates the session.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` on any timeout or I/O failure during the
    /// handshake.
    async fn connect(&mut self) -> Result<(), ProtocolError>;

    /// Closes the session. Safe to call when already disconnected.
    async fn disconnect(&mut self);

    /// Returns `true` if the session is authenticated and ready.
    fn is_connected(&self) -> bool;

    /// Sends a raw command line and reads one response line.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the session is not ready or the exchange
    /// fails.
    async fn send_raw(&mut self, line: &str) -> Result<CommandResponse, ProtocolError>;

    /// Sends a typed command and reads one response line.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the session is not ready or the exchange
    /// fails.
    async fn send_command<C: Command + Sync>(
        &mut self,
        command: &C,
    ) -> Result<CommandResponse, ProtocolError> {
        self.send_raw(&command.to_line()).await
    }
}
