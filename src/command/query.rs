// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only queries.

use crate::command::{Command, CommandKind};

/// A read-only query understood by the device.
///
/// # Examples
///
/// ```
/// use wattbox_lib::command::{Command, Query};
///
/// assert_eq!(Query::ServiceTag.to_line(), "?ServiceTag");
/// assert!(Query::OutletName.is_delayed());
/// assert!(!Query::PowerStatus.is_delayed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    /// Firmware version.
    Firmware,
    /// Model number, e.g. `WB-800-IPVM-12`.
    Model,
    /// Service tag (serial number).
    ServiceTag,
    /// Network hostname.
    Hostname,
    /// Auto-reboot setting.
    AutoReboot,
    /// On/off state of every outlet.
    OutletStatus,
    /// Name of every outlet.
    OutletName,
    /// Number of outlets.
    OutletCount,
    /// Current, power, voltage and safe-voltage flag.
    PowerStatus,
    /// Whether a UPS is attached.
    UpsConnection,
    /// Battery and alarm state of the attached UPS.
    UpsStatus,
}

impl Query {
    /// The harmless query sent to flush a delayed response out of the device.
    pub const FLUSH: Self = Self::Firmware;

    /// Returns `true` if the device answers this query one command late.
    ///
    /// A delayed query's answer arrives as the reply to whatever command is
    /// sent next.
    #[must_use]
    pub const fn is_delayed(&self) -> bool {
        matches!(self, Self::OutletStatus | Self::OutletName | Self::OutletCount)
    }
}

impl Command for Query {
    fn name(&self) -> &'static str {
        match self {
            Self::Firmware => "Firmware",
            Self::Model => "Model",
            Self::ServiceTag => "ServiceTag",
            Self::Hostname => "Hostname",
            Self::AutoReboot => "AutoReboot",
            Self::OutletStatus => "OutletStatus",
            Self::OutletName => "OutletName",
            Self::OutletCount => "OutletCount",
            Self::PowerStatus => "PowerStatus",
            Self::UpsConnection => "UPSConnection",
            Self::UpsStatus => "UPSStatus",
        }
    }

    fn kind(&self) -> CommandKind {
        CommandKind::Query
    }

    fn payload(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_query_lines() {
        let expected = [
            (Query::Firmware, "?Firmware"),
            (Query::Model, "?Model"),
            (Query::ServiceTag, "?ServiceTag"),
            (Query::Hostname, "?Hostname"),
            (Query::AutoReboot, "?AutoReboot"),
            (Query::OutletStatus, "?OutletStatus"),
            (Query::OutletName, "?OutletName"),
            (Query::OutletCount, "?OutletCount"),
            (Query::PowerStatus, "?PowerStatus"),
            (Query::UpsConnection, "?UPSConnection"),
            (Query::UpsStatus, "?UPSStatus"),
        ];
        for (query, line) in expected {
            assert_eq!(query.to_line(), line);
        }
    }

    #[test]
    fn flush_query_is_firmware() {
        assert_eq!(Query::FLUSH, Query::Firmware);
        assert!(!Query::FLUSH.is_delayed());
    }
}
