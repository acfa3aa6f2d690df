// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level device abstraction for `WattBox` devices.
//!
//! [`Device`] implements the device's query and control vocabulary on top
//! of a [`Protocol`] transport and keeps the results in a [`DeviceState`]
//! cache.
//!
//! # Delayed Responses
//!
//! The device answers `?OutletStatus`, `?OutletName` and `?OutletCount` one
//! command late: the answer arrives as the reply to the next command. These
//! queries are framed as flush, query, flush, and the reply to the trailing
//! flush is the one parsed.
//!
//! ```text
//! -> ?Firmware        <- ?Firmware=2.8.0.0
//! -> ?OutletStatus    <- (empty)
//! -> ?Firmware        <- ?OutletStatus=1,0,1,...
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use wattbox_lib::Device;
//! use wattbox_lib::types::{OutletIndex, PowerState};
//!
//! # async fn example() -> wattbox_lib::Result<()> {
//! let mut device = Device::telnet("192.168.1.34")
//!     .with_credentials("wattbox", "wattbox")
//!     .build();
//!
//! let identity = device.get_device_identity().await?;
//! println!("model: {:?}", identity.model);
//!
//! device.set_outlet_state(OutletIndex::new(3)?, PowerState::On).await?;
//! # Ok(())
//! # }
//! ```

mod telnet_builder;

pub use telnet_builder::TelnetDeviceBuilder;

use crate::command::{Command, OutletSetCommand, Query};
use crate::error::{Error, ProtocolError};
use crate::protocol::{CommandResponse, Protocol, TelnetClient, TelnetConfig};
use crate::response::{
    DeviceIdentity, PowerStatus, UpsStatus, normalize_firmware, parse_outlet_count,
    parse_outlet_names, parse_outlet_states, parse_ups_connection,
};
use crate::state::{DeviceState, OutletRecord, PowerMetrics, StatusInfo};
use crate::types::{OutletIndex, PowerState};

/// Outlet count assumed when the device does not report a usable one.
pub const FALLBACK_OUTLET_COUNT: usize = 12;

/// Identity queries in the order they are sent.
const IDENTITY_QUERIES: [Query; 5] = [
    Query::Firmware,
    Query::Model,
    Query::ServiceTag,
    Query::Hostname,
    Query::AutoReboot,
];

/// A `WattBox` controlled through a [`Protocol`] transport.
///
/// Every operation that talks to the device first connects if the transport
/// is not connected, and makes at most one connection attempt per call. A
/// query that times out is skipped and the session is kept. If the
/// transport drops mid-call and the call has not connected yet, it
/// reconnects once and carries on with its remaining queries.
///
/// Operations take `&mut self`: the device has a single command pipeline
/// and two interleaved calls would pair responses with the wrong commands.
#[derive(Debug)]
pub struct Device<P: Protocol> {
    protocol: P,
    state: DeviceState,
    reconnect_available: bool,
}

impl Device<TelnetClient> {
    /// Creates a builder for a telnet device with factory defaults.
    #[must_use]
    pub fn telnet(host: impl Into<String>) -> TelnetDeviceBuilder {
        TelnetDeviceBuilder::new(TelnetConfig::new(host))
    }

    /// Creates a builder from a complete telnet configuration.
    #[must_use]
    pub fn telnet_config(config: TelnetConfig) -> TelnetDeviceBuilder {
        TelnetDeviceBuilder::new(config)
    }
}

impl<P: Protocol> Device<P> {
    /// Creates a device over the given transport with an empty cache.
    #[must_use]
    pub fn new(protocol: P) -> Self {
        Self {
            protocol,
            state: DeviceState::new(),
            reconnect_available: false,
        }
    }

    /// Returns the cached device state.
    #[must_use]
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    #[cfg(test)]
    pub(crate) fn protocol_mut(&mut self) -> &mut P {
        &mut self.protocol
    }

    // ========== Connection ==========

    /// Connects and authenticates. Does nothing if already connected.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the connection or handshake fails.
    pub async fn connect(&mut self) -> Result<(), Error> {
        self.ensure_connected().await
    }

    /// Closes the session. The cache is kept.
    pub async fn disconnect(&mut self) {
        self.protocol.disconnect().await;
    }

    /// Returns `true` if the session is authenticated.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.protocol.is_connected()
    }

    /// Connects if needed. Spends the call's reconnect when it connects.
    async fn ensure_connected(&mut self) -> Result<(), Error> {
        if self.protocol.is_connected() {
            self.reconnect_available = true;
            return Ok(());
        }
        self.reconnect_available = false;
        self.protocol.connect().await.map_err(Error::Protocol)
    }

    async fn send(
        &mut self,
        command: &(impl Command + Sync),
    ) -> Result<CommandResponse, ProtocolError> {
        if !self.protocol.is_connected() && std::mem::take(&mut self.reconnect_available) {
            tracing::info!(command = %command.to_line(), "Session dropped, reconnecting");
            self.protocol.connect().await?;
        }
        self.protocol.send_command(command).await
    }

    /// Sends a delayed query between two flushes and returns the reply that
    /// carries its answer.
    async fn delayed_query(&mut self, query: Query) -> Result<CommandResponse, ProtocolError> {
        debug_assert!(query.is_delayed());
        self.send(&Query::FLUSH).await?;
        self.send(&query).await?;
        self.send(&Query::FLUSH).await
    }

    // ========== Identity ==========

    /// Reads the device identity.
    ///
    /// Only fields that are still unknown are queried; a resolved field is
    /// never overwritten, while an `Unknown` firmware placeholder is queried
    /// again. A failed query is logged and leaves its field unset. Shifted
    /// values are moved back by [`DeviceIdentity::repair`] once all queries
    /// have run.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` only if the device cannot be connected.
    pub async fn get_device_identity(&mut self) -> Result<DeviceIdentity, Error> {
        self.ensure_connected().await?;

        for query in IDENTITY_QUERIES {
            if is_resolved(self.state.identity(), query) {
                continue;
            }

            match self.read_identity_value(query).await {
                Ok(Some(value)) => {
                    tracing::debug!(query = query.name(), value = %value, "Identity value");
                    *identity_field(self.state.identity_mut(), query) = Some(value);
                }
                Ok(None) => {
                    tracing::debug!(query = query.name(), "Empty identity value");
                }
                Err(e) => {
                    tracing::warn!(query = query.name(), error = %e, "Failed to read identity value");
                }
            }
        }

        let moved = self.state.identity_mut().repair();
        if moved > 0 {
            tracing::info!(moved, "Repaired shifted identity fields");
        }
        Ok(self.state.identity().clone())
    }

    async fn read_identity_value(&mut self, query: Query) -> Result<Option<String>, Error> {
        let response = self.send(&query).await?;
        let value = response.value()?;
        if query == Query::Firmware {
            return Ok(Some(normalize_firmware(value)));
        }
        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    // ========== Outlets ==========

    /// Reads the number of outlets.
    ///
    /// Falls back to [`FALLBACK_OUTLET_COUNT`] with a warning if the
    /// response is missing or malformed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` only if the device cannot be connected.
    pub async fn get_outlet_count(&mut self) -> Result<usize, Error> {
        self.ensure_connected().await?;
        Ok(self.read_outlet_count().await)
    }

    async fn read_outlet_count(&mut self) -> usize {
        let count = match self.delayed_query(Query::OutletCount).await {
            Ok(response) => parse_outlet_count(&response).map_err(Error::from),
            Err(e) => Err(e.into()),
        };
        match count {
            Ok(count) => {
                tracing::debug!(count, "Device outlet count");
                count
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = FALLBACK_OUTLET_COUNT,
                    "Could not read outlet count, using fallback"
                );
                FALLBACK_OUTLET_COUNT
            }
        }
    }

    /// Refreshes and returns the outlet records.
    ///
    /// On the first call the outlet list is sized from `count_hint`, or
    /// from [`get_outlet_count`](Self::get_outlet_count) when no hint is
    /// given, with every outlet named `Outlet {n}` and off. States and names
    /// are then refreshed independently; a failure in either is logged and
    /// leaves the cached values in place.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` only if the device cannot be connected.
    pub async fn get_outlet_status(
        &mut self,
        count_hint: Option<usize>,
    ) -> Result<Vec<OutletRecord>, Error> {
        self.ensure_connected().await?;

        if !self.state.has_outlets() {
            let count = match count_hint {
                Some(count) => count,
                None => self.read_outlet_count().await,
            };
            self.state.init_outlets(count);
        }

        match self.read_outlet_states().await {
            Ok(states) => {
                let updated = self.state.apply_outlet_states(&states);
                tracing::debug!(reported = states.len(), updated, "Outlet states");
            }
            Err(e) => tracing::warn!(error = %e, "Failed to read outlet states"),
        }

        match self.read_outlet_names().await {
            Ok(names) => {
                let updated = self.state.apply_outlet_names(&names);
                tracing::debug!(reported = names.len(), updated, "Outlet names");
            }
            Err(e) => tracing::warn!(error = %e, "Failed to read outlet names"),
        }

        Ok(self.state.outlets().to_vec())
    }

    async fn read_outlet_states(&mut self) -> Result<Vec<PowerState>, Error> {
        let response = self.delayed_query(Query::OutletStatus).await?;
        Ok(parse_outlet_states(&response)?)
    }

    async fn read_outlet_names(&mut self) -> Result<Vec<String>, Error> {
        let response = self.delayed_query(Query::OutletName).await?;
        Ok(parse_outlet_names(&response)?)
    }

    /// Switches one outlet on or off.
    ///
    /// On success the cached record is updated to the requested state right
    /// away; the device is not re-read.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the device cannot be connected or the
    /// command cannot be sent.
    pub async fn set_outlet_state(
        &mut self,
        outlet: OutletIndex,
        state: impl Into<PowerState>,
    ) -> Result<(), Error> {
        let state = state.into();
        self.ensure_connected().await?;

        let command = OutletSetCommand::new(outlet, state);
        if let Err(e) = self.send(&command).await {
            tracing::error!(outlet = %outlet, state = %state, error = %e, "Failed to set outlet state");
            return Err(e.into());
        }
        tracing::debug!(outlet = %outlet, state = %state, "Outlet state set");

        if !self.state.set_outlet_state(outlet, state) {
            tracing::debug!(outlet = %outlet, "Outlet not cached yet, skipping local update");
        }
        Ok(())
    }

    // ========== Power and UPS ==========

    /// Reads mains power and UPS state.
    ///
    /// Power status, UPS connection and UPS status are read independently.
    /// A failed read is logged and leaves its part of the cache unchanged.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` only if the device cannot be connected.
    pub async fn get_status_info(&mut self) -> Result<StatusInfo, Error> {
        self.ensure_connected().await?;

        match self.read_power_status().await {
            Ok(status) => self.state.set_power_status(status),
            Err(e) => tracing::warn!(error = %e, "Failed to read power status"),
        }

        match self.read_ups_connection().await {
            Ok(connected) => self.state.set_ups_connected(connected),
            Err(e) => tracing::warn!(error = %e, "Failed to read UPS connection"),
        }

        match self.read_ups_status().await {
            Ok(status) => self.state.set_ups_status(status),
            Err(e) => tracing::warn!(error = %e, "Failed to read UPS status"),
        }

        Ok(self.state.status_info())
    }

    async fn read_power_status(&mut self) -> Result<PowerStatus, Error> {
        let response = self.send(&Query::PowerStatus).await?;
        Ok(PowerStatus::parse(&response)?)
    }

    async fn read_ups_connection(&mut self) -> Result<bool, Error> {
        let response = self.send(&Query::UpsConnection).await?;
        Ok(parse_ups_connection(&response)?)
    }

    async fn read_ups_status(&mut self) -> Result<UpsStatus, Error> {
        let response = self.send(&Query::UpsStatus).await?;
        Ok(UpsStatus::parse(&response)?)
    }

    /// Returns voltage, current and power from the secondary metrics source.
    ///
    /// That source is not available over telnet, so every value is `None`.
    /// Use [`get_status_info`](Self::get_status_info) for power readings.
    #[must_use]
    pub fn get_power_metrics(&self) -> PowerMetrics {
        tracing::debug!("Power metrics requested, source not available");
        PowerMetrics::default()
    }
}

fn is_resolved(identity: &DeviceIdentity, query: Query) -> bool {
    match query {
        Query::Firmware => identity.has_firmware(),
        Query::Model => identity.model.is_some(),
        Query::ServiceTag => identity.serial_number.is_some(),
        Query::Hostname => identity.hostname.is_some(),
        _ => identity.auto_reboot.is_some(),
    }
}

fn identity_field(identity: &mut DeviceIdentity, query: Query) -> &mut Option<String> {
    match query {
        Query::Model => &mut identity.model,
        Query::ServiceTag => &mut identity.serial_number,
        Query::Hostname => &mut identity.hostname,
        Query::AutoReboot => &mut identity.auto_reboot,
        _ => &mut identity.hardware_version,
    }
}
