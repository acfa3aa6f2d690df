// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `WattBox` command definitions.
//!
//! This module provides typed representations of the fixed command
//! vocabulary understood by the device's telnet interface.
//!
//! # Available Commands
//!
//! | Command Type | Purpose | Example |
//! |-------------|---------|---------|
//! | [`Query`] | Read identity, outlet or status information | `?OutletStatus` |
//! | [`OutletSetCommand`] | Switch a single outlet | `!OutletSet=3,ON` |
//!
//! # Command Structure
//!
//! Each line sent to the device consists of:
//! - A prefix: `?` for queries, `!` for control commands
//! - A command name (e.g., "Firmware", "OutletSet")
//! - An optional payload after `=` (e.g., "3,ON")
//!
//! # Examples
//!
//! ```
//! use wattbox_lib::command::{Command, OutletSetCommand, Query};
//! use wattbox_lib::types::{OutletIndex, PowerState};
//!
//! assert_eq!(Query::OutletStatus.to_line(), "?OutletStatus");
//!
//! let cmd = OutletSetCommand::new(OutletIndex::new(3).unwrap(), PowerState::On);
//! assert_eq!(cmd.to_line(), "!OutletSet=3,ON");
//! ```

mod outlet;
mod query;

pub use outlet::OutletSetCommand;
pub use query::Query;

/// Whether a command reads or changes device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// A read-only query, prefixed with `?`.
    Query,
    /// A control command, prefixed with `!`.
    Control,
}

impl CommandKind {
    /// Returns the line prefix for this kind of command.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Query => '?',
            Self::Control => '!',
        }
    }
}

/// A command that can be sent to a `WattBox` device.
pub trait Command {
    /// Returns the command name without prefix, e.g. `"OutletStatus"`.
    fn name(&self) -> &'static str;

    /// Returns whether this is a query or a control command.
    fn kind(&self) -> CommandKind;

    /// Returns the command payload, if any.
    ///
    /// - `?Firmware` has payload `None`
    /// - `!OutletSet=3,ON` has payload `Some("3,ON")`
    fn payload(&self) -> Option<String>;

    /// Returns the full line to send, without line terminator.
    fn to_line(&self) -> String {
        let prefix = self.kind().prefix();
        match self.payload() {
            Some(p) => format!("{prefix}{}={p}", self.name()),
            None => format!("{prefix}{}", self.name()),
        }
    }
}
