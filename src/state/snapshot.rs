// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consolidated read model produced by each refresh.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ParseError;
use crate::response::{DeviceIdentity, PowerStatus, UpsStatus};
use crate::types::OutletIndex;

use super::OutletRecord;

/// Power and UPS state, as returned by `Device::get_status_info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusInfo {
    /// Mains power readings.
    pub power_status: PowerStatus,
    /// State of the attached UPS.
    pub ups_status: UpsStatus,
    /// Whether a UPS is attached, if known.
    pub ups_connected: Option<bool>,
}

/// Voltage, current and power from the secondary metrics source.
///
/// That source is not implemented; every field is always `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PowerMetrics {
    /// Line voltage in volts.
    pub voltage: Option<f64>,
    /// Current draw in amperes.
    pub current: Option<f64>,
    /// Power draw in watts.
    pub power: Option<f64>,
}

/// Snapshot of a `WattBox` taken by one refresh.
///
/// A snapshot is immutable once returned. The voltage, current and power
/// accessors are shortcuts into [`PowerStatus`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    identity: DeviceIdentity,
    outlets: Vec<OutletRecord>,
    status: StatusInfo,
    connected: bool,
    refreshed_at: DateTime<Utc>,
}

impl Snapshot {
    /// Assembles a snapshot of a connected device.
    #[must_use]
    pub fn new(identity: DeviceIdentity, outlets: Vec<OutletRecord>, status: StatusInfo) -> Self {
        Self {
            identity,
            outlets,
            status,
            connected: true,
            refreshed_at: Utc::now(),
        }
    }

    /// Returns a copy of this snapshot marked as disconnected.
    #[must_use]
    pub fn disconnected(&self) -> Self {
        Self {
            connected: false,
            ..self.clone()
        }
    }

    /// Returns the device identity.
    #[must_use]
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Returns all outlet records ordered by index.
    #[must_use]
    pub fn outlets(&self) -> &[OutletRecord] {
        &self.outlets
    }

    /// Returns the record for one outlet.
    #[must_use]
    pub fn outlet(&self, index: OutletIndex) -> Option<&OutletRecord> {
        self.outlets.get(index.position())
    }

    /// Returns the mains power readings.
    #[must_use]
    pub fn power_status(&self) -> &PowerStatus {
        &self.status.power_status
    }

    /// Returns the UPS status.
    #[must_use]
    pub fn ups_status(&self) -> &UpsStatus {
        &self.status.ups_status
    }

    /// Returns whether a UPS is attached, if known.
    #[must_use]
    pub fn ups_connected(&self) -> Option<bool> {
        self.status.ups_connected
    }

    /// Returns the line voltage in volts.
    #[must_use]
    pub fn voltage(&self) -> Option<f64> {
        self.status.power_status.voltage_volts
    }

    /// Returns the current draw in amperes.
    #[must_use]
    pub fn current(&self) -> Option<f64> {
        self.status.power_status.current_amps
    }

    /// Returns the power draw in watts.
    #[must_use]
    pub fn power(&self) -> Option<f64> {
        self.status.power_status.power_watts
    }

    /// Returns `true` if the device was reachable when this was taken.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Returns when the snapshot was taken.
    #[must_use]
    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }

    /// Serialises the snapshot as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidValue` if serialisation fails.
    pub fn to_json(&self) -> Result<String, ParseError> {
        serde_json::to_string(self).map_err(|e| ParseError::InvalidValue {
            field: "snapshot".to_string(),
            message: e.to_string(),
        })
    }
}
