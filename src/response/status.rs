// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power and UPS status parsing.

use serde::Serialize;

use crate::error::ParseError;
use crate::protocol::CommandResponse;
use crate::response::{parse_field, require_fields, split_fields};

/// Mains power readings.
///
/// Parsed from `?PowerStatus=<current>,<power>,<voltage>,<safe>`.
///
/// # Examples
///
/// ```
/// use wattbox_lib::protocol::CommandResponse;
/// use wattbox_lib::response::PowerStatus;
///
/// let response = CommandResponse::new("?PowerStatus=1.20,140.00,121.30,1");
/// let status = PowerStatus::parse(&response).unwrap();
/// assert_eq!(status.voltage_volts, Some(121.3));
/// assert_eq!(status.safe_voltage, Some(true));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PowerStatus {
    /// Current draw in amperes.
    pub current_amps: Option<f64>,
    /// Power draw in watts.
    pub power_watts: Option<f64>,
    /// Line voltage in volts.
    pub voltage_volts: Option<f64>,
    /// Whether the line voltage is within the safe range.
    pub safe_voltage: Option<bool>,
}

impl PowerStatus {
    /// Number of fields in a power status response.
    pub const FIELDS: usize = 4;

    /// Parses a `?PowerStatus` response.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the echo does not match, fewer than four
    /// fields are present, or a field is not numeric.
    pub fn parse(response: &CommandResponse) -> Result<Self, ParseError> {
        let fields = split_fields(response.value_for("PowerStatus")?);
        require_fields("PowerStatus", &fields, Self::FIELDS)?;

        let safe: i64 = parse_field("safe_voltage", fields[3])?;
        Ok(Self {
            current_amps: Some(parse_field("current", fields[0])?),
            power_watts: Some(parse_field("power", fields[1])?),
            voltage_volts: Some(parse_field("voltage", fields[2])?),
            safe_voltage: Some(safe != 0),
        })
    }
}

/// State of the UPS attached to the device.
///
/// Parsed from
/// `?UPSStatus=<charge>,<load>,<health>,<powerLost>,<runtime>,<alarmEnabled>,<alarmMuted>`.
/// Boolean fields are `true` only for the exact text `True`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpsStatus {
    /// Battery charge in percent.
    pub battery_charge: Option<u32>,
    /// Battery load in percent.
    pub battery_load: Option<u32>,
    /// Battery health as reported, e.g. `Good`.
    pub battery_health: Option<String>,
    /// Whether mains power has been lost.
    pub power_lost: Option<bool>,
    /// Estimated battery runtime in minutes.
    pub battery_runtime: Option<u32>,
    /// Whether the UPS alarm is enabled.
    pub alarm_enabled: Option<bool>,
    /// Whether the UPS alarm is muted.
    pub alarm_muted: Option<bool>,
}

impl UpsStatus {
    /// Number of fields in a UPS status response.
    pub const FIELDS: usize = 7;

    /// Parses a `?UPSStatus` response.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the echo does not match, fewer than seven
    /// fields are present, or a numeric field is not an integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use wattbox_lib::protocol::CommandResponse;
    /// use wattbox_lib::response::UpsStatus;
    ///
    /// let response = CommandResponse::new("?UPSStatus=50,0,Good,False,25,True,False");
    /// let ups = UpsStatus::parse(&response).unwrap();
    /// assert_eq!(ups.battery_charge, Some(50));
    /// assert_eq!(ups.power_lost, Some(false));
    /// assert_eq!(ups.alarm_enabled, Some(true));
    /// ```
    pub fn parse(response: &CommandResponse) -> Result<Self, ParseError> {
        let fields = split_fields(response.value_for("UPSStatus")?);
        require_fields("UPSStatus", &fields, Self::FIELDS)?;

        Ok(Self {
            battery_charge: Some(parse_field("battery_charge", fields[0])?),
            battery_load: Some(parse_field("battery_load", fields[1])?),
            battery_health: Some(fields[2].to_string()),
            power_lost: Some(fields[3] == "True"),
            battery_runtime: Some(parse_field("battery_runtime", fields[4])?),
            alarm_enabled: Some(fields[5] == "True"),
            alarm_muted: Some(fields[6] == "True"),
        })
    }
}

/// Parses an `?UPSConnection=<0|1>` response; `1` means connected.
///
/// # Errors
///
/// Returns `ParseError` if the echo does not match or the value is not an
/// integer.
pub fn parse_ups_connection(response: &CommandResponse) -> Result<bool, ParseError> {
    let value: i64 = parse_field("UPSConnection", response.value_for("UPSConnection")?)?;
    Ok(value != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_status_fields() {
        let response = CommandResponse::new("?PowerStatus=60.00,600.00,110.00,0");
        let status = PowerStatus::parse(&response).unwrap();
        assert_eq!(status.current_amps, Some(60.0));
        assert_eq!(status.power_watts, Some(600.0));
        assert_eq!(status.voltage_volts, Some(110.0));
        assert_eq!(status.safe_voltage, Some(false));
    }

    #[test]
    fn power_status_too_few_fields() {
        let response = CommandResponse::new("?PowerStatus=60.00,600.00,110.00");
        assert!(matches!(
            PowerStatus::parse(&response),
            Err(ParseError::FieldCount { expected: 4, actual: 3, .. })
        ));
    }

    #[test]
    fn power_status_wrong_echo() {
        let response = CommandResponse::new("?Firmware=2.8.0.0");
        assert!(PowerStatus::parse(&response).is_err());
    }

    #[test]
    fn ups_status_booleans_are_exact() {
        let response = CommandResponse::new("?UPSStatus=100,12,Bad,true,40,TRUE,True");
        let ups = UpsStatus::parse(&response).unwrap();
        assert_eq!(ups.battery_health.as_deref(), Some("Bad"));
        assert_eq!(ups.power_lost, Some(false));
        assert_eq!(ups.alarm_enabled, Some(false));
        assert_eq!(ups.alarm_muted, Some(true));
        assert_eq!(ups.battery_runtime, Some(40));
    }

    #[test]
    fn ups_status_too_few_fields() {
        let response = CommandResponse::new("?UPSStatus=50,0,Good");
        assert!(matches!(
            UpsStatus::parse(&response),
            Err(ParseError::FieldCount { expected: 7, .. })
        ));
    }

    #[test]
    fn ups_connection_values() {
        assert!(parse_ups_connection(&CommandResponse::new("?UPSConnection=1")).unwrap());
        assert!(!parse_ups_connection(&CommandResponse::new("?UPSConnection=0")).unwrap());
        assert!(parse_ups_connection(&CommandResponse::new("?UPSConnection=x")).is_err());
    }
}
