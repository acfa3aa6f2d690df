// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration configuration.
//!
//! [`WattboxConfig`] is the document supplied when a device is set up:
//! connection parameters plus the polling interval. Missing fields take
//! the factory defaults.
//!
//! # Examples
//!
//! ```
//! use wattbox_lib::config::WattboxConfig;
//!
//! let config = WattboxConfig::from_json(r#"{"host": "192.168.1.34", "polling_interval": 60}"#)
//!     .unwrap();
//! assert_eq!(config.username, "wattbox");
//! assert_eq!(config.polling_interval().as_secs(), 60);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::protocol::TelnetConfig;
use crate::state::MAX_OUTLETS;

/// Shortest accepted polling interval, in seconds.
pub const MIN_POLLING_INTERVAL_SECS: u64 = 5;
/// Longest accepted polling interval, in seconds.
pub const MAX_POLLING_INTERVAL_SECS: u64 = 300;
/// Default polling interval, in seconds.
pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 30;
/// Outlet count assumed for the 800 series when none is configured.
pub const DEFAULT_OUTLET_COUNT: usize = 18;

/// Configuration of one `WattBox` integration entry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WattboxConfig {
    /// Device host name or IP address.
    pub host: String,
    /// Login username.
    #[serde(default = "default_username")]
    pub username: String,
    /// Login password.
    #[serde(default = "default_password")]
    pub password: String,
    /// Telnet port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds between polls.
    #[serde(default = "default_polling_interval")]
    pub polling_interval: u64,
    /// Connect and per-read timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Number of outlets, if known in advance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet_count: Option<usize>,
}

fn default_username() -> String {
    TelnetConfig::DEFAULT_USERNAME.to_string()
}

fn default_password() -> String {
    TelnetConfig::DEFAULT_PASSWORD.to_string()
}

fn default_port() -> u16 {
    TelnetConfig::DEFAULT_PORT
}

fn default_polling_interval() -> u64 {
    DEFAULT_POLLING_INTERVAL_SECS
}

fn default_timeout() -> u64 {
    TelnetConfig::DEFAULT_TIMEOUT.as_secs()
}

impl WattboxConfig {
    /// Creates a configuration for `host` with every other field defaulted.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: default_username(),
            password: default_password(),
            port: default_port(),
            polling_interval: default_polling_interval(),
            timeout: default_timeout(),
            outlet_count: None,
        }
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if the document cannot be decoded, or the
    /// validation error from [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if !(MIN_POLLING_INTERVAL_SECS..=MAX_POLLING_INTERVAL_SECS)
            .contains(&self.polling_interval)
        {
            return Err(ConfigError::PollingInterval(self.polling_interval));
        }
        if self.timeout == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        match self.outlet_count {
            Some(0) => return Err(ConfigError::ZeroOutletCount),
            Some(count) if count > MAX_OUTLETS => {
                return Err(ConfigError::OutletCountTooLarge(count));
            }
            _ => {}
        }
        Ok(())
    }

    /// Returns the polling interval.
    #[must_use]
    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval)
    }

    /// Returns the connect and per-read timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Returns the outlet count to size a new device with.
    #[must_use]
    pub fn outlet_count_hint(&self) -> usize {
        self.outlet_count.unwrap_or(DEFAULT_OUTLET_COUNT)
    }

    /// Builds the telnet connection parameters.
    #[must_use]
    pub fn to_telnet_config(&self) -> TelnetConfig {
        TelnetConfig::new(self.host.trim())
            .with_port(self.port)
            .with_credentials(&self.username, &self.password)
            .with_timeout(self.timeout())
    }
}

impl std::fmt::Debug for WattboxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WattboxConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("polling_interval", &self.polling_interval)
            .field("timeout", &self.timeout)
            .field("outlet_count", &self.outlet_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_minimal_json() {
        let config = WattboxConfig::from_json(r#"{"host": "192.168.1.34"}"#).unwrap();
        assert_eq!(config, WattboxConfig::new("192.168.1.34"));
        assert_eq!(config.port, 23);
        assert_eq!(config.password, "wattbox");
        assert_eq!(config.polling_interval(), Duration::from_secs(30));
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.outlet_count_hint(), DEFAULT_OUTLET_COUNT);
    }

    #[test]
    fn polling_interval_bounds() {
        let mut config = WattboxConfig::new("pdu.local");
        for secs in [5, 30, 300] {
            config.polling_interval = secs;
            assert!(config.validate().is_ok(), "{secs}");
        }
        for secs in [0, 4, 301] {
            config.polling_interval = secs;
            assert!(matches!(
                config.validate(),
                Err(ConfigError::PollingInterval(s)) if s == secs
            ));
        }
    }

    #[test]
    fn rejects_empty_host_and_zero_values() {
        assert!(matches!(
            WattboxConfig::new("  ").validate(),
            Err(ConfigError::MissingHost)
        ));

        let mut config = WattboxConfig::new("pdu.local");
        config.timeout = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));

        let mut config = WattboxConfig::new("pdu.local");
        config.outlet_count = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroOutletCount)));
    }

    #[test]
    fn rejects_outlet_count_beyond_addressable() {
        let mut config = WattboxConfig::new("pdu.local");
        config.outlet_count = Some(MAX_OUTLETS);
        assert!(config.validate().is_ok());

        config.outlet_count = Some(256);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::OutletCountTooLarge(256)));
        assert_eq!(err.to_string(), "outlet count 256 exceeds 255");
    }

    #[test]
    fn from_json_rejects_missing_host() {
        assert!(matches!(
            WattboxConfig::from_json("{}"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn polling_interval_error_message() {
        let err = WattboxConfig::from_json(r#"{"host": "a", "polling_interval": 1}"#).unwrap_err();
        assert_eq!(err.to_string(), "polling interval 1s is outside [5, 300]");
    }

    #[test]
    fn telnet_config_conversion() {
        let config = WattboxConfig::from_json(
            r#"{"host": " pdu.local ", "username": "admin", "password": "pw", "port": 2323, "timeout": 3}"#,
        )
        .unwrap();
        let telnet = config.to_telnet_config();
        assert_eq!(telnet.address(), "pdu.local:2323");
        assert_eq!(telnet.username(), "admin");
        assert_eq!(telnet.password(), "pw");
        assert_eq!(telnet.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn debug_redacts_password() {
        let mut config = WattboxConfig::new("pdu.local");
        config.password = "hunter2".into();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
