// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telnet protocol implementation for `WattBox` devices.

use std::fmt;
use std::time::Duration;

use crate::error::ProtocolError;
use crate::protocol::{CommandResponse, Protocol, Session, SessionState};

// ============================================================================
// TelnetConfig - Connection parameters
// ============================================================================

/// Configuration for a telnet connection to a `WattBox`.
///
/// # Examples
///
/// ```
/// use wattbox_lib::protocol::TelnetConfig;
/// use std::time::Duration;
///
/// // Factory defaults: port 23, user/password "wattbox", 10 s timeout
/// let config = TelnetConfig::new("192.168.1.34");
///
/// let config = TelnetConfig::new("192.168.1.34")
///     .with_port(2323)
///     .with_credentials("admin", "password")
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Clone)]
pub struct TelnetConfig {
    host: String,
    port: u16,
    username: String,
    password: String,
    timeout: Duration,
}

impl TelnetConfig {
    /// Default telnet port.
    pub const DEFAULT_PORT: u16 = 23;
    /// Factory default username.
    pub const DEFAULT_USERNAME: &'static str = "wattbox";
    /// Factory default password.
    pub const DEFAULT_PASSWORD: &'static str = "wattbox";
    /// Default connect and read timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the specified host with factory defaults.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            username: Self::DEFAULT_USERNAME.to_string(),
            password: Self::DEFAULT_PASSWORD.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets login credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Sets the connect and per-read timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the login username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the login password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Creates a disconnected `TelnetClient` from this configuration.
    #[must_use]
    pub fn into_client(self) -> TelnetClient {
        TelnetClient::new(self)
    }
}

impl fmt::Debug for TelnetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelnetConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// TelnetClient - One command line out, one response line in
// ============================================================================

/// Telnet client for communicating with a `WattBox`.
///
/// Each command is written as one CRLF-terminated line and answered by one
/// newline-terminated line. Any failure during an exchange tears the session
/// down: a half-read response would otherwise be paired with the next
/// command.
///
/// # Examples
///
/// ```no_run
/// use wattbox_lib::command::Query;
/// use wattbox_lib::protocol::{Protocol, TelnetClient, TelnetConfig};
///
/// # async fn example() -> Result<(), wattbox_lib::error::ProtocolError> {
/// let mut client = TelnetClient::new(TelnetConfig::new("192.168.1.34"));
/// client.connect().await?;
/// let response = client.send_command(&Query::Hostname).await?;
/// println!("{}", response.line());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TelnetClient {
    session: Session,
}

impl TelnetClient {
    /// Creates a disconnected client.
    #[must_use]
    pub fn new(config: TelnetConfig) -> Self {
        Self {
            session: Session::new(config),
        }
    }

    /// Returns the connection configuration.
    #[must_use]
    pub fn config(&self) -> &TelnetConfig {
        self.session.config()
    }

    /// Returns the session lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    async fn exchange(&mut self, line: &str) -> Result<String, ProtocolError> {
        let timeout = self.session.config().timeout();
        self.session.send_line(line).await?;
        self.session.read_until(b"\n", timeout).await
    }
}

impl Protocol for TelnetClient {
    async fn connect(&mut self) -> Result<(), ProtocolError> {
        self.session.connect().await
    }

    async fn disconnect(&mut self) {
        self.session.disconnect().await;
    }

    fn is_connected(&self) -> bool {
        self.session.is_authenticated()
    }

    async fn send_raw(&mut self, line: &str) -> Result<CommandResponse, ProtocolError> {
        if !self.session.is_authenticated() {
            return Err(ProtocolError::NotConnected);
        }

        match self.exchange(line).await {
            Ok(raw) => {
                let response = CommandResponse::new(raw);
                tracing::debug!(command = %line, response = %response.line(), "Received response");
                Ok(response)
            }
            Err(e @ ProtocolError::Timeout { .. }) => {
                tracing::warn!(command = %line, error = %e, "No response, discarding pending input");
                self.session.discard_pending();
                Err(e)
            }
            Err(e) => {
                tracing::warn!(command = %line, error = %e, "Exchange failed, dropping session");
                self.session.disconnect().await;
                Err(e)
            }
        }
    }
}
