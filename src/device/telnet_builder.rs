// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telnet device builder.

use std::time::Duration;

use crate::device::Device;
use crate::error::Error;
use crate::protocol::{TelnetClient, TelnetConfig};

/// Builder for creating telnet-based devices.
///
/// This builder can be created in two ways:
/// - `Device::telnet("host")` - Factory defaults
/// - `Device::telnet_config(TelnetConfig::new("host").with_port(2323))` - Advanced configuration
///
/// # Examples
///
/// ```no_run
/// use wattbox_lib::Device;
/// use std::time::Duration;
///
/// # async fn example() -> wattbox_lib::Result<()> {
/// // Disconnected; the first operation connects
/// let device = Device::telnet("192.168.1.34").build();
///
/// // Connected and authenticated up front
/// let device = Device::telnet("192.168.1.34")
///     .with_credentials("admin", "password")
///     .with_timeout(Duration::from_secs(5))
///     .connect()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TelnetDeviceBuilder {
    config: TelnetConfig,
}

impl TelnetDeviceBuilder {
    pub(crate) fn new(config: TelnetConfig) -> Self {
        Self { config }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.config = self.config.with_port(port);
        self
    }

    /// Sets login credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.config = self.config.with_credentials(username, password);
        self
    }

    /// Sets the connect and per-read timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Returns the configuration built so far.
    #[must_use]
    pub fn config(&self) -> &TelnetConfig {
        &self.config
    }

    /// Builds a disconnected device. No network access.
    #[must_use]
    pub fn build(self) -> Device<TelnetClient> {
        Device::new(self.config.into_client())
    }

    /// Builds the device and connects it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the connection or login fails.
    pub async fn connect(self) -> Result<Device<TelnetClient>, Error> {
        let mut device = self.build();
        device.connect().await?;
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let builder = Device::telnet("192.168.1.34");
        assert_eq!(builder.config().address(), "192.168.1.34:23");
        assert_eq!(builder.config().username(), "wattbox");
    }

    #[test]
    fn builder_overrides() {
        let builder = Device::telnet("pdu.local")
            .with_port(2323)
            .with_credentials("admin", "secret")
            .with_timeout(Duration::from_secs(2));
        let config = builder.config();
        assert_eq!(config.port(), 2323);
        assert_eq!(config.username(), "admin");
        assert_eq!(config.password(), "secret");
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn build_is_disconnected() {
        let device = Device::telnet_config(TelnetConfig::new("pdu.local")).build();
        assert!(!device.is_connected());
        assert!(!device.state().has_outlets());
    }
}
