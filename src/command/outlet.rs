// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outlet control commands.

use crate::command::{Command, CommandKind};
use crate::types::{OutletIndex, PowerState};

/// Command to switch a single outlet on or off.
///
/// # Examples
///
/// ```
/// use wattbox_lib::command::{Command, OutletSetCommand};
/// use wattbox_lib::types::OutletIndex;
///
/// let cmd = OutletSetCommand::on(OutletIndex::one());
/// assert_eq!(cmd.name(), "OutletSet");
/// assert_eq!(cmd.payload(), Some("1,ON".to_string()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutletSetCommand {
    outlet: OutletIndex,
    state: PowerState,
}

impl OutletSetCommand {
    /// Creates a command that sets `outlet` to `state`.
    #[must_use]
    pub const fn new(outlet: OutletIndex, state: PowerState) -> Self {
        Self { outlet, state }
    }

    /// Creates a command to turn an outlet on.
    #[must_use]
    pub const fn on(outlet: OutletIndex) -> Self {
        Self::new(outlet, PowerState::On)
    }

    /// Creates a command to turn an outlet off.
    #[must_use]
    pub const fn off(outlet: OutletIndex) -> Self {
        Self::new(outlet, PowerState::Off)
    }

    /// Returns the targeted outlet.
    #[must_use]
    pub const fn outlet(&self) -> OutletIndex {
        self.outlet
    }

    /// Returns the requested state.
    #[must_use]
    pub const fn state(&self) -> PowerState {
        self.state
    }
}

impl Command for OutletSetCommand {
    fn name(&self) -> &'static str {
        "OutletSet"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::Control
    }

    fn payload(&self) -> Option<String> {
        Some(format!("{},{}", self.outlet, self.state))
    }
}
