// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outlet power types.
//!
//! This module provides the on/off state of an outlet and the 1-based index
//! used to address a single outlet on the device.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ValueError;

/// The power state of a single outlet.
///
/// # Examples
///
/// ```
/// use wattbox_lib::types::PowerState;
///
/// assert_eq!(PowerState::On.as_str(), "ON");
/// assert_eq!("0".parse::<PowerState>().unwrap(), PowerState::Off);
/// assert!(PowerState::from(true).is_on());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    /// Outlet is switched off.
    #[default]
    Off,
    /// Outlet is switched on.
    On,
}

impl PowerState {
    /// Returns the keyword used by `!OutletSet`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Returns the numeric value reported by `?OutletStatus`.
    #[must_use]
    pub const fn as_num(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
        }
    }

    /// Returns `true` if the outlet is on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OFF" | "0" | "FALSE" => Ok(Self::Off),
            "ON" | "1" | "TRUE" => Ok(Self::On),
            _ => Err(ValueError::InvalidPowerState(s.to_string())),
        }
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

impl From<PowerState> for bool {
    fn from(value: PowerState) -> Self {
        value.is_on()
    }
}

/// 1-based index of an outlet.
///
/// Outlet numbering on the device starts at 1 and is stable for the
/// lifetime of the device.
///
/// # Examples
///
/// ```
/// use wattbox_lib::types::OutletIndex;
///
/// let idx = OutletIndex::new(3).unwrap();
/// assert_eq!(idx.value(), 3);
/// assert_eq!(idx.position(), 2);
///
/// assert!(OutletIndex::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OutletIndex(u8);

impl OutletIndex {
    /// Lowest valid outlet number.
    pub const MIN: u8 = 1;

    /// Creates a new outlet index.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `index` is 0.
    pub fn new(index: u8) -> Result<Self, ValueError> {
        if index < Self::MIN {
            return Err(ValueError::OutOfRange {
                min: u64::from(Self::MIN),
                max: u64::from(u8::MAX),
                actual: u64::from(index),
            });
        }
        Ok(Self(index))
    }

    /// Creates the index of outlet 1.
    #[must_use]
    pub const fn one() -> Self {
        Self(1)
    }

    /// Builds the index of the outlet at a 0-based list position.
    ///
    /// Returns `None` if the position does not fit an outlet number.
    #[must_use]
    pub fn from_position(position: usize) -> Option<Self> {
        u8::try_from(position + 1).ok().map(Self)
    }

    /// Returns the 1-based outlet number.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the 0-based position of this outlet in a list.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for OutletIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for OutletIndex {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_state_as_str() {
        assert_eq!(PowerState::Off.as_str(), "OFF");
        assert_eq!(PowerState::On.as_str(), "ON");
    }

    #[test]
    fn power_state_from_str() {
        assert_eq!("ON".parse::<PowerState>().unwrap(), PowerState::On);
        assert_eq!("off".parse::<PowerState>().unwrap(), PowerState::Off);
        assert_eq!("1".parse::<PowerState>().unwrap(), PowerState::On);
        assert_eq!(" 0 ".parse::<PowerState>().unwrap(), PowerState::Off);
        assert_eq!("True".parse::<PowerState>().unwrap(), PowerState::On);
    }

    #[test]
    fn power_state_from_str_invalid() {
        let result = "2".parse::<PowerState>();
        assert!(matches!(result, Err(ValueError::InvalidPowerState(_))));
    }

    #[test]
    fn power_state_bool_conversions() {
        assert_eq!(PowerState::from(true), PowerState::On);
        assert_eq!(PowerState::from(false), PowerState::Off);
        assert!(bool::from(PowerState::On));
        assert_eq!(PowerState::On.as_num(), 1);
    }

    #[test]
    fn outlet_index_rejects_zero() {
        assert!(OutletIndex::new(0).is_err());
        assert!(OutletIndex::try_from(0u8).is_err());
    }

    #[test]
    fn outlet_index_positions() {
        let idx = OutletIndex::new(18).unwrap();
        assert_eq!(idx.position(), 17);
        assert_eq!(OutletIndex::from_position(0), Some(OutletIndex::one()));
        assert_eq!(OutletIndex::from_position(255), None);
    }

    #[test]
    fn outlet_index_display() {
        assert_eq!(OutletIndex::new(12).unwrap().to_string(), "12");
    }
}
