// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Authenticated telnet session with line-oriented primitives.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::error::ProtocolError;
use crate::protocol::TelnetConfig;
use crate::protocol::codec::TelnetCodec;

/// Prompt printed by the device before it reads the username.
pub const USERNAME_PROMPT: &str = "Username: ";
/// Prompt printed by the device before it reads the password.
pub const PASSWORD_PROMPT: &str = "Password: ";
/// Banner printed by the device once the login is accepted.
pub const LOGIN_SUCCESS: &str = "Successfully Logged In!";

/// Lifecycle of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No stream is open.
    Disconnected,
    /// The TCP connection is being opened.
    Connecting,
    /// The stream is open and the login handshake is running.
    Authenticating,
    /// Login succeeded; commands may be sent.
    Ready,
}

/// A telnet session to one device.
///
/// The session owns the stream framed by a [`TelnetCodec`]. Text that
/// arrives after a delimiter stays buffered for the next read, so a line
/// the device sends "early" is never lost.
///
/// Every blocking primitive is bounded by the configured timeout; a lapsed
/// timeout is reported as [`ProtocolError::Timeout`].
#[derive(Debug)]
pub struct Session {
    config: TelnetConfig,
    framed: Option<Framed<TcpStream, TelnetCodec>>,
    state: SessionState,
}

impl Session {
    /// Creates a disconnected session.
    #[must_use]
    pub fn new(config: TelnetConfig) -> Self {
        Self {
            config,
            framed: None,
            state: SessionState::Disconnected,
        }
    }

    /// Returns the connection configuration.
    #[must_use]
    pub fn config(&self) -> &TelnetConfig {
        &self.config
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` once the login handshake has succeeded.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Opens the stream and runs the login handshake.
    ///
    /// Waits for the username prompt, sends the username, waits for the
    /// password prompt, sends the password and waits for the login banner.
    /// Does nothing if the session is already ready.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` on any timeout or I/O failure. The session is
    /// left disconnected in that case.
    pub async fn connect(&mut self) -> Result<(), ProtocolError> {
        if self.is_authenticated() {
            tracing::debug!(host = %self.config.host(), "Session already authenticated");
            return Ok(());
        }

        self.reset();
        match self.handshake().await {
            Ok(()) => {
                self.state = SessionState::Ready;
                tracing::info!(host = %self.config.host(), "Authenticated with device");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(address = %self.config.address(), error = %e, "Login failed");
                self.reset();
                Err(e)
            }
        }
    }

    async fn handshake(&mut self) -> Result<(), ProtocolError> {
        let timeout = self.config.timeout();
        let address = self.config.address();

        self.state = SessionState::Connecting;
        let connect = TcpStream::connect((self.config.host(), self.config.port()));
        let stream = tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| ProtocolError::Timeout {
                waiting_for: format!("connection to {address}"),
                timeout_ms: duration_ms(timeout),
            })?
            .map_err(|e| ProtocolError::ConnectionFailed(format!("{address}: {e}")))?;

        tracing::debug!(address = %address, "Connected");
        let codec = TelnetCodec::new(USERNAME_PROMPT.as_bytes());
        self.framed = Some(Framed::new(stream, codec));
        self.state = SessionState::Authenticating;

        let username = self.config.username().to_string();
        let password = self.config.password().to_string();

        self.read_until(USERNAME_PROMPT.as_bytes(), timeout).await?;
        self.write_line(&username, false).await?;

        self.read_until(PASSWORD_PROMPT.as_bytes(), timeout).await?;
        self.write_line(&password, true).await?;

        self.read_until(LOGIN_SUCCESS.as_bytes(), timeout).await?;
        Ok(())
    }

    /// Closes the stream if open. Safe to call when already disconnected.
    pub async fn disconnect(&mut self) {
        if let Some(mut framed) = self.framed.take() {
            // The device may already have dropped the socket
            let _ = framed.close().await;
            tracing::debug!(host = %self.config.host(), "Disconnected");
        }
        self.reset();
    }

    /// Drops the stream and any buffered input without a graceful shutdown.
    pub fn reset(&mut self) {
        self.framed = None;
        self.state = SessionState::Disconnected;
    }

    /// Drops input that has been received but not read yet.
    ///
    /// Used after a read times out, so a late reply is not taken as the
    /// answer to the next command.
    pub fn discard_pending(&mut self) {
        if let Some(framed) = self.framed.as_mut() {
            framed.read_buffer_mut().clear();
            framed.codec_mut().clear();
        }
    }

    /// Writes `text` followed by CRLF.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::NotConnected` if the stream is not open, or
    /// `ProtocolError::Io` if the write fails.
    pub async fn send_line(&mut self, text: &str) -> Result<(), ProtocolError> {
        self.write_line(text, false).await
    }

    async fn write_line(&mut self, text: &str, redact: bool) -> Result<(), ProtocolError> {
        let framed = self.framed.as_mut().ok_or(ProtocolError::NotConnected)?;
        framed.send(text).await?;

        if redact {
            tracing::debug!(line = "<redacted>", "Sent line");
        } else {
            tracing::debug!(line = %text, "Sent line");
        }
        Ok(())
    }

    /// Reads until `delimiter` has been received, returning everything up to
    /// and including it.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Timeout` if the delimiter does not arrive
    /// within `timeout`, `ProtocolError::ConnectionClosed` if the device
    /// closes the stream, or `ProtocolError::NotConnected` if no stream is
    /// open.
    pub async fn read_until(
        &mut self,
        delimiter: &[u8],
        timeout: Duration,
    ) -> Result<String, ProtocolError> {
        let framed = self.framed.as_mut().ok_or(ProtocolError::NotConnected)?;
        framed.codec_mut().set_delimiter(delimiter);
        if let Some(frame) = framed.codec_mut().take_frame() {
            return Ok(frame);
        }

        match tokio::time::timeout(timeout, framed.next()).await {
            Ok(Some(frame)) => frame,
            Ok(None) => Err(ProtocolError::ConnectionClosed),
            Err(_) => Err(ProtocolError::Timeout {
                waiting_for: format!("{:?}", String::from_utf8_lossy(delimiter)),
                timeout_ms: duration_ms(timeout),
            }),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
