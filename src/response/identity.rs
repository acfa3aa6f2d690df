// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identity parsing and field repair.

use serde::Serialize;

/// Placeholder stored when the firmware value is present but meaningless.
pub const UNKNOWN_FIRMWARE: &str = "Unknown";

/// A UPS status line the device sometimes returns for `?Firmware`.
const UPS_STATUS_LEAK: &str = "0,0,Good,False,0,False,False";

/// Firmware components above this are power or UPS readings, not versions.
const MAX_FIRMWARE_COMPONENT: f64 = 10.0;

/// Identity of a `WattBox`.
///
/// Every field is unknown until the device reports it.
///
/// # Field Repair
///
/// The device sometimes answers an identity query with the value belonging
/// to the previous query, which shifts values across fields. [`repair`]
/// recognises the shifted values by their shape and moves them back.
///
/// [`repair`]: DeviceIdentity::repair
///
/// # Examples
///
/// ```
/// use wattbox_lib::response::DeviceIdentity;
///
/// let mut identity = DeviceIdentity {
///     model: Some("2.8.0.0".into()),
///     serial_number: Some("WB-800-IPVM-12".into()),
///     hostname: Some("ST201916431G842A".into()),
///     ..Default::default()
/// };
/// identity.repair();
///
/// assert_eq!(identity.hardware_version.as_deref(), Some("2.8.0.0"));
/// assert_eq!(identity.model.as_deref(), Some("WB-800-IPVM-12"));
/// assert_eq!(identity.serial_number.as_deref(), Some("ST201916431G842A"));
/// assert_eq!(identity.hostname, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    /// Firmware version, e.g. `2.8.0.0`.
    pub hardware_version: Option<String>,
    /// Model number, e.g. `WB-800-IPVM-12`.
    pub model: Option<String>,
    /// Service tag, e.g. `ST201916431G842A`.
    pub serial_number: Option<String>,
    /// Network hostname.
    pub hostname: Option<String>,
    /// Auto-reboot setting as reported by the device.
    pub auto_reboot: Option<String>,
}

impl DeviceIdentity {
    /// Returns `true` if a real firmware version is known.
    ///
    /// The [`UNKNOWN_FIRMWARE`] placeholder does not count.
    #[must_use]
    pub fn has_firmware(&self) -> bool {
        self.hardware_version
            .as_deref()
            .is_some_and(|v| v != UNKNOWN_FIRMWARE)
    }

    /// Moves values that landed in the wrong field back where they belong.
    ///
    /// Rules are applied in order, and each only fires when its target field
    /// is still unset:
    ///
    /// 1. a model that looks like a four-part version becomes the hardware
    ///    version (an `Unknown` placeholder counts as unset);
    /// 2. a serial number starting with `WB-` becomes the model;
    /// 3. a hostname starting with `ST` becomes the serial number.
    ///
    /// Returns the number of values moved.
    pub fn repair(&mut self) -> usize {
        let mut moved = 0;

        if !self.has_firmware() && self.model.as_deref().is_some_and(is_dotted_version)
        {
            tracing::info!(value = ?self.model, "Model holds a firmware version, moving to hardware_version");
            self.hardware_version = self.model.take();
            moved += 1;
        }

        if self.model.is_none()
            && self
                .serial_number
                .as_deref()
                .is_some_and(|s| s.starts_with("WB-"))
        {
            tracing::info!(value = ?self.serial_number, "Serial number holds a model, moving to model");
            self.model = self.serial_number.take();
            moved += 1;
        }

        if self.serial_number.is_none()
            && self.hostname.as_deref().is_some_and(|h| h.starts_with("ST"))
        {
            tracing::info!(value = ?self.hostname, "Hostname holds a service tag, moving to serial_number");
            self.serial_number = self.hostname.take();
            moved += 1;
        }

        moved
    }
}

/// Returns `true` for values shaped like `2.8.0.0`.
fn is_dotted_version(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

/// Normalises the value of a `?Firmware` response.
///
/// - an empty value, or the UPS status line the device sometimes leaks,
///   becomes [`UNKNOWN_FIRMWARE`];
/// - a single component is kept as is, unless it is `0`;
/// - `version,revision,...` becomes `version.revision` when both are
///   numbers no greater than 10 and neither is `0`.
///
/// # Examples
///
/// ```
/// use wattbox_lib::response::normalize_firmware;
///
/// assert_eq!(normalize_firmware("2.8.0.0"), "2.8.0.0");
/// assert_eq!(normalize_firmware("2,8,Good"), "2.8");
/// assert_eq!(normalize_firmware("60.00,600.00"), "Unknown");
/// ```
#[must_use]
pub fn normalize_firmware(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value == UPS_STATUS_LEAK {
        return UNKNOWN_FIRMWARE.to_string();
    }

    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [single] => {
            if single.is_empty() || *single == "0" {
                UNKNOWN_FIRMWARE.to_string()
            } else {
                (*single).to_string()
            }
        }
        [version, revision, ..] => {
            let (Ok(v), Ok(r)) = (version.parse::<f64>(), revision.parse::<f64>()) else {
                tracing::warn!(value = %value, "Invalid firmware format");
                return UNKNOWN_FIRMWARE.to_string();
            };
            if v > MAX_FIRMWARE_COMPONENT || r > MAX_FIRMWARE_COMPONENT {
                tracing::warn!(value = %value, "Firmware value looks like power readings");
                return UNKNOWN_FIRMWARE.to_string();
            }
            if *version == "0" || *revision == "0" {
                return UNKNOWN_FIRMWARE.to_string();
            }
            format!("{version}.{revision}")
        }
        [] => UNKNOWN_FIRMWARE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repair_full_rotation() {
        let mut identity = DeviceIdentity {
            model: Some("2.8.0.0".into()),
            serial_number: Some("WB-800-IPVM-12".into()),
            hostname: Some("ST201916431G842A".into()),
            ..Default::default()
        };
        assert_eq!(identity.repair(), 3);
        assert_eq!(
            identity,
            DeviceIdentity {
                hardware_version: Some("2.8.0.0".into()),
                model: Some("WB-800-IPVM-12".into()),
                serial_number: Some("ST201916431G842A".into()),
                hostname: None,
                auto_reboot: None,
            }
        );
    }

    #[test]
    fn repair_keeps_resolved_hardware_version() {
        let mut identity = DeviceIdentity {
            hardware_version: Some("2.7.0.0".into()),
            model: Some("2.8.0.0".into()),
            ..Default::default()
        };
        assert_eq!(identity.repair(), 0);
        assert_eq!(identity.hardware_version.as_deref(), Some("2.7.0.0"));
        assert_eq!(identity.model.as_deref(), Some("2.8.0.0"));
    }

    #[test]
    fn repair_replaces_unknown_firmware() {
        let mut identity = DeviceIdentity {
            hardware_version: Some(UNKNOWN_FIRMWARE.into()),
            model: Some("2.8.0.0".into()),
            ..Default::default()
        };
        assert!(!identity.has_firmware());
        assert_eq!(identity.repair(), 1);
        assert!(identity.has_firmware());
        assert_eq!(identity.model, None);
    }

    #[test]
    fn repair_leaves_correct_identity_alone() {
        let mut identity = DeviceIdentity {
            hardware_version: Some("2.8.0.0".into()),
            model: Some("WB-800-IPVM-12".into()),
            serial_number: Some("ST201916431G842A".into()),
            hostname: Some("WattBox".into()),
            auto_reboot: Some("1".into()),
        };
        let before = identity.clone();
        assert_eq!(identity.repair(), 0);
        assert_eq!(identity, before);
    }

    #[test]
    fn repair_hostname_only_when_serial_missing() {
        let mut identity = DeviceIdentity {
            hostname: Some("STUDIO-PDU".into()),
            ..Default::default()
        };
        identity.repair();
        assert_eq!(identity.serial_number.as_deref(), Some("STUDIO-PDU"));
        assert_eq!(identity.hostname, None);
    }

    #[test]
    fn dotted_version_shape() {
        assert!(is_dotted_version("2.8.0.0"));
        assert!(!is_dotted_version("2.8.0"));
        assert!(!is_dotted_version("a.b.c.d"));
        assert!(!is_dotted_version("2..0.0"));
    }

    #[test]
    fn normalize_firmware_cases() {
        assert_eq!(normalize_firmware(""), UNKNOWN_FIRMWARE);
        assert_eq!(normalize_firmware("0"), UNKNOWN_FIRMWARE);
        assert_eq!(normalize_firmware(UPS_STATUS_LEAK), UNKNOWN_FIRMWARE);
        assert_eq!(normalize_firmware(" 1.0.0 "), "1.0.0");
        assert_eq!(normalize_firmware("2,8,Good,False"), "2.8");
        assert_eq!(normalize_firmware("2,0"), UNKNOWN_FIRMWARE);
        assert_eq!(normalize_firmware("60.00,600.00,110.00,1"), UNKNOWN_FIRMWARE);
        assert_eq!(normalize_firmware("x,y"), UNKNOWN_FIRMWARE);
    }
}
