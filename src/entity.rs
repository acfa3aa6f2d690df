// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control-surface facade over the last snapshot.
//!
//! [`EntityView`] maps snapshot fields onto the values a home-automation
//! entity exposes. Unknown is kept apart from `false` and zero:
//!
//! - with no snapshot, or a snapshot taken while disconnected,
//!   [`EntityView::is_connected`] returns `false`;
//! - every other accessor returns `None` in that case.
//!
//! The descriptor types ([`SensorKind`], [`BinarySensorKind`],
//! [`OutletSwitch`]) name each entity and build its unique id from the
//! integration entry id.

use std::fmt;

use crate::coordinator::Coordinator;
use crate::error::Error;
use crate::protocol::Protocol;
use crate::state::Snapshot;
use crate::types::{OutletIndex, PowerState};

/// Manufacturer reported for every device.
pub const MANUFACTURER: &str = "SnapAV";
/// Model reported until the device's own model is known.
pub const DEFAULT_MODEL: &str = "Wattbox 800 Series";

// ============================================================================
// EntityView - Read accessors
// ============================================================================

/// Read accessors over an optional snapshot.
///
/// # Examples
///
/// ```
/// use wattbox_lib::entity::EntityView;
///
/// let view = EntityView::new(None);
/// assert!(!view.is_connected());
/// assert_eq!(view.power_lost(), None);
/// assert_eq!(view.safe_voltage(), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EntityView<'a> {
    snapshot: Option<&'a Snapshot>,
}

impl<'a> EntityView<'a> {
    /// Creates a view over `snapshot`.
    #[must_use]
    pub fn new(snapshot: Option<&'a Snapshot>) -> Self {
        Self { snapshot }
    }

    /// The snapshot, only if it was taken while connected.
    fn live(&self) -> Option<&'a Snapshot> {
        self.snapshot.filter(|s| s.is_connected())
    }

    /// Device connectivity. `false` when nothing is known.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.live().is_some()
    }

    // ========== Outlets ==========

    /// Returns whether an outlet is on.
    #[must_use]
    pub fn outlet_is_on(&self, outlet: OutletIndex) -> Option<bool> {
        self.live()?.outlet(outlet).map(|o| o.is_on())
    }

    /// Returns an outlet's name as reported by the device.
    #[must_use]
    pub fn outlet_name(&self, outlet: OutletIndex) -> Option<&'a str> {
        self.live()?.outlet(outlet).map(|o| o.name.as_str())
    }

    /// Returns the number of outlets.
    #[must_use]
    pub fn outlet_count(&self) -> Option<usize> {
        self.live().map(|s| s.outlets().len())
    }

    // ========== Identity ==========

    /// Firmware version.
    #[must_use]
    pub fn firmware(&self) -> Option<&'a str> {
        self.live()?.identity().hardware_version.as_deref()
    }

    /// Model number.
    #[must_use]
    pub fn model(&self) -> Option<&'a str> {
        self.live()?.identity().model.as_deref()
    }

    /// Service tag.
    #[must_use]
    pub fn serial_number(&self) -> Option<&'a str> {
        self.live()?.identity().serial_number.as_deref()
    }

    /// Network hostname.
    #[must_use]
    pub fn hostname(&self) -> Option<&'a str> {
        self.live()?.identity().hostname.as_deref()
    }

    // ========== Power ==========

    /// Line voltage in volts.
    #[must_use]
    pub fn voltage(&self) -> Option<f64> {
        self.live()?.voltage()
    }

    /// Current draw in amperes.
    #[must_use]
    pub fn current(&self) -> Option<f64> {
        self.live()?.current()
    }

    /// Power draw in watts.
    #[must_use]
    pub fn power(&self) -> Option<f64> {
        self.live()?.power()
    }

    /// Whether the line voltage is within the safe range.
    #[must_use]
    pub fn safe_voltage(&self) -> Option<bool> {
        self.live()?.power_status().safe_voltage
    }

    // ========== UPS ==========

    /// Whether mains power has been lost, as reported by the UPS.
    #[must_use]
    pub fn power_lost(&self) -> Option<bool> {
        self.live()?.ups_status().power_lost
    }

    /// Whether a UPS is attached.
    #[must_use]
    pub fn ups_connected(&self) -> Option<bool> {
        self.live()?.ups_connected()
    }

    /// Battery charge in percent.
    #[must_use]
    pub fn battery_charge(&self) -> Option<u32> {
        self.live()?.ups_status().battery_charge
    }

    /// Estimated battery runtime in minutes.
    #[must_use]
    pub fn battery_runtime(&self) -> Option<u32> {
        self.live()?.ups_status().battery_runtime
    }

    /// Reads a sensor's state.
    #[must_use]
    pub fn sensor(&self, kind: SensorKind) -> Option<SensorValue<'a>> {
        match kind {
            SensorKind::Firmware => self.firmware().map(SensorValue::Text),
            SensorKind::Model => self.model().map(SensorValue::Text),
            SensorKind::SerialNumber => self.serial_number().map(SensorValue::Text),
            SensorKind::Hostname => self.hostname().map(SensorValue::Text),
            SensorKind::Voltage => self.voltage().map(SensorValue::Number),
            SensorKind::Current => self.current().map(SensorValue::Number),
            SensorKind::Power => self.power().map(SensorValue::Number),
        }
    }

    /// Reads a binary sensor's state.
    ///
    /// [`BinarySensorKind::DeviceStatus`] is never unknown.
    #[must_use]
    pub fn binary_sensor(&self, kind: BinarySensorKind) -> Option<bool> {
        match kind {
            BinarySensorKind::DeviceStatus => Some(self.is_connected()),
            BinarySensorKind::PowerLost | BinarySensorKind::UpsPowerLost => self.power_lost(),
            BinarySensorKind::SafeVoltage => self.safe_voltage(),
            BinarySensorKind::UpsConnected => self.ups_connected(),
        }
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// A sensor state: text for identity sensors, a number for power readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorValue<'a> {
    /// Text value.
    Text(&'a str),
    /// Numeric value.
    Number(f64),
}

impl fmt::Display for SensorValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Sensors exposed for every device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Firmware version.
    Firmware,
    /// Model number.
    Model,
    /// Service tag.
    SerialNumber,
    /// Network hostname.
    Hostname,
    /// Line voltage.
    Voltage,
    /// Current draw.
    Current,
    /// Power draw.
    Power,
}

impl SensorKind {
    /// Every sensor, in display order.
    pub const ALL: [Self; 7] = [
        Self::Firmware,
        Self::Model,
        Self::SerialNumber,
        Self::Hostname,
        Self::Voltage,
        Self::Current,
        Self::Power,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Firmware => "Firmware",
            Self::Model => "Model",
            Self::SerialNumber => "Serial Number",
            Self::Hostname => "Hostname",
            Self::Voltage => "Voltage",
            Self::Current => "Current",
            Self::Power => "Power",
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            Self::Firmware => "firmware",
            Self::Model => "model",
            Self::SerialNumber => "serial",
            Self::Hostname => "hostname",
            Self::Voltage => "voltage",
            Self::Current => "current",
            Self::Power => "power",
        }
    }

    /// Unique id within the integration entry.
    #[must_use]
    pub fn unique_id(self, entry_id: &str) -> String {
        format!("{entry_id}_{}", self.suffix())
    }

    /// Device class, for numeric sensors.
    #[must_use]
    pub const fn device_class(self) -> Option<&'static str> {
        match self {
            Self::Voltage => Some("voltage"),
            Self::Current => Some("current"),
            Self::Power => Some("power"),
            _ => None,
        }
    }

    /// Unit of measurement, for numeric sensors.
    #[must_use]
    pub const fn unit(self) -> Option<&'static str> {
        match self {
            Self::Voltage => Some("V"),
            Self::Current => Some("A"),
            Self::Power => Some("W"),
            _ => None,
        }
    }
}

/// Binary sensors exposed for every device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinarySensorKind {
    /// Whether the device is reachable.
    DeviceStatus,
    /// Whether mains power has been lost.
    PowerLost,
    /// Whether the line voltage is safe.
    SafeVoltage,
    /// Whether a UPS is attached.
    UpsConnected,
    /// Whether the UPS reports lost mains power.
    UpsPowerLost,
}

impl BinarySensorKind {
    /// Every binary sensor, in display order.
    pub const ALL: [Self; 5] = [
        Self::DeviceStatus,
        Self::PowerLost,
        Self::SafeVoltage,
        Self::UpsConnected,
        Self::UpsPowerLost,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DeviceStatus => "Device Status",
            Self::PowerLost => "Power Lost",
            Self::SafeVoltage => "Safe Voltage",
            Self::UpsConnected => "UPS Connected",
            Self::UpsPowerLost => "UPS Power Lost",
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            Self::DeviceStatus => "status",
            Self::PowerLost => "power_lost",
            Self::SafeVoltage => "safe_voltage",
            Self::UpsConnected => "ups_connected",
            Self::UpsPowerLost => "ups_power_lost",
        }
    }

    /// Unique id within the integration entry.
    #[must_use]
    pub fn unique_id(self, entry_id: &str) -> String {
        format!("{entry_id}_{}", self.suffix())
    }

    /// Device class.
    #[must_use]
    pub const fn device_class(self) -> &'static str {
        match self {
            Self::DeviceStatus | Self::UpsConnected => "connectivity",
            Self::PowerLost | Self::UpsPowerLost => "power",
            Self::SafeVoltage => "voltage",
        }
    }
}

/// Switch entity for one outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutletSwitch {
    outlet: OutletIndex,
}

impl OutletSwitch {
    /// Creates the switch for `outlet`.
    #[must_use]
    pub const fn new(outlet: OutletIndex) -> Self {
        Self { outlet }
    }

    /// One switch per outlet in the snapshot.
    #[must_use]
    pub fn for_snapshot(snapshot: &Snapshot) -> Vec<Self> {
        snapshot.outlets().iter().map(|o| Self::new(o.index)).collect()
    }

    /// The outlet this switch controls.
    #[must_use]
    pub const fn outlet(&self) -> OutletIndex {
        self.outlet
    }

    /// Display name, `Outlet {n}`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("Outlet {}", self.outlet)
    }

    /// Unique id within the integration entry.
    #[must_use]
    pub fn unique_id(&self, entry_id: &str) -> String {
        format!("{entry_id}_outlet_{}", self.outlet)
    }

    /// Switch state; `None` while unknown.
    #[must_use]
    pub fn is_on(&self, view: &EntityView<'_>) -> Option<bool> {
        view.outlet_is_on(self.outlet)
    }

    /// Turns the outlet on.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the command could not be sent.
    pub async fn turn_on<P: Protocol>(&self, coordinator: &Coordinator<P>) -> Result<(), Error> {
        coordinator.set_outlet_state(self.outlet, PowerState::On).await
    }

    /// Turns the outlet off.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the command could not be sent.
    pub async fn turn_off<P: Protocol>(&self, coordinator: &Coordinator<P>) -> Result<(), Error> {
        coordinator.set_outlet_state(self.outlet, PowerState::Off).await
    }
}

/// Device registry information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Manufacturer name.
    pub manufacturer: &'static str,
    /// Model number, or the series name while unknown.
    pub model: String,
    /// Firmware version, if known.
    pub sw_version: Option<String>,
    /// Device name: the hostname, or `WattBox {host}`.
    pub name: String,
}

impl DeviceInfo {
    /// Builds registry information for the device at `host`.
    #[must_use]
    pub fn new(host: &str, view: &EntityView<'_>) -> Self {
        Self {
            manufacturer: MANUFACTURER,
            model: view.model().unwrap_or(DEFAULT_MODEL).to_string(),
            sw_version: view.firmware().map(str::to_string),
            name: view
                .hostname()
                .map_or_else(|| format!("WattBox {host}"), str::to_string),
        }
    }
}
