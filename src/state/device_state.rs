// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use serde::Serialize;

use crate::response::{DeviceIdentity, PowerStatus, UpsStatus};
use crate::types::{OutletIndex, PowerState};

use super::StatusInfo;

/// Largest number of outlets an [`OutletIndex`] can address.
pub const MAX_OUTLETS: usize = 255;

/// One outlet as last reported by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutletRecord {
    /// 1-based outlet number.
    pub index: OutletIndex,
    /// Outlet name; the device default or a bare digit when unnamed.
    pub name: String,
    /// On/off state.
    pub state: PowerState,
}

impl OutletRecord {
    /// Creates a record with the default name `Outlet {index}`, switched off.
    #[must_use]
    pub fn with_default_name(index: OutletIndex) -> Self {
        Self {
            index,
            name: format!("Outlet {index}"),
            state: PowerState::Off,
        }
    }

    /// Returns `true` if the outlet is on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.state.is_on()
    }
}

/// Cached state of one `WattBox`.
///
/// Every value is optional because it is unknown until the device reports
/// it. The outlet list is sized once, from the first outlet count that is
/// resolved, and keeps that size for the lifetime of the cache.
///
/// # Examples
///
/// ```
/// use wattbox_lib::state::DeviceState;
/// use wattbox_lib::types::{OutletIndex, PowerState};
///
/// let mut state = DeviceState::new();
/// state.init_outlets(4);
/// state.set_outlet_state(OutletIndex::new(2).unwrap(), PowerState::On);
///
/// assert_eq!(state.outlets().len(), 4);
/// assert!(state.outlet(OutletIndex::new(2).unwrap()).unwrap().is_on());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceState {
    identity: DeviceIdentity,
    outlets: Vec<OutletRecord>,
    power_status: PowerStatus,
    ups_status: UpsStatus,
    ups_connected: Option<bool>,
}

impl DeviceState {
    /// Creates a new empty device state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Identity ==========

    /// Returns the device identity.
    #[must_use]
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub(crate) fn identity_mut(&mut self) -> &mut DeviceIdentity {
        &mut self.identity
    }

    // ========== Outlets ==========

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

    /// Returns `true` once the outlet list has been sized.
    #[must_use]
    pub fn has_outlets(&self) -> bool {
        !self.outlets.is_empty()
    }

    /// Creates `count` default outlet records.
    ///
    /// Does nothing if the outlet list has already been sized. A count above
    /// [`MAX_OUTLETS`] is capped with a warning.
    pub fn init_outlets(&mut self, count: usize) {
        if self.has_outlets() {
            return;
        }
        if count > MAX_OUTLETS {
            tracing::warn!(count, max = MAX_OUTLETS, "Outlet count too large, capping");
        }
        self.outlets = (0..count.min(MAX_OUTLETS))
            .map_while(OutletIndex::from_position)
            .map(OutletRecord::with_default_name)
            .collect();
    }

    /// Assigns states by position; extra entries on either side are ignored.
    ///
    /// Returns the number of records updated.
    pub fn apply_outlet_states(&mut self, states: &[PowerState]) -> usize {
        let n = states.len().min(self.outlets.len());
        for (record, state) in self.outlets.iter_mut().zip(states) {
            record.state = *state;
        }
        n
    }

    /// Assigns names by position; extra entries on either side are ignored.
    ///
    /// Returns the number of records updated.
    pub fn apply_outlet_names(&mut self, names: &[String]) -> usize {
        let n = names.len().min(self.outlets.len());
        for (record, name) in self.outlets.iter_mut().zip(names) {
            record.name.clone_from(name);
        }
        n
    }

    /// Sets the state of one outlet.
    ///
    /// Returns `false` if the outlet is not in the list.
    pub fn set_outlet_state(&mut self, index: OutletIndex, state: PowerState) -> bool {
        match self.outlets.get_mut(index.position()) {
            Some(record) => {
                record.state = state;
                true
            }
            None => false,
        }
    }

    // ========== Power and UPS ==========

    /// Returns the last known mains power readings.
    #[must_use]
    pub fn power_status(&self) -> PowerStatus {
        self.power_status
    }

    /// Replaces the mains power readings.
    pub fn set_power_status(&mut self, status: PowerStatus) {
        self.power_status = status;
    }

    /// Returns the last known UPS status.
    #[must_use]
    pub fn ups_status(&self) -> &UpsStatus {
        &self.ups_status
    }

    /// Replaces the UPS status.
    pub fn set_ups_status(&mut self, status: UpsStatus) {
        self.ups_status = status;
    }

    /// Returns whether a UPS is attached, if known.
    #[must_use]
    pub fn ups_connected(&self) -> Option<bool> {
        self.ups_connected
    }

    /// Sets whether a UPS is attached.
    pub fn set_ups_connected(&mut self, connected: bool) {
        self.ups_connected = Some(connected);
    }

    /// Returns power and UPS state together.
    #[must_use]
    pub fn status_info(&self) -> StatusInfo {
        StatusInfo {
            power_status: self.power_status,
            ups_status: self.ups_status.clone(),
            ups_connected: self.ups_connected,
        }
    }
}
