// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted in-memory transport for unit tests.
//!
//! Answers are keyed by command line. Delayed queries reply with an empty
//! line and their answer is returned for the next command instead, the way
//! the device behaves.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::command::{Command, Query};
use crate::error::ProtocolError;
use crate::protocol::{CommandResponse, Protocol};

/// What the transport has seen, shared with the test after the device takes
/// ownership of the transport.
#[derive(Debug, Default)]
pub(crate) struct Journal {
    pub connects: usize,
    pub sent: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct ScriptedProtocol {
    answers: HashMap<String, String>,
    failures: HashSet<String>,
    hang_ups: HashSet<String>,
    stash: Option<String>,
    connected: bool,
    refuse_connect: bool,
    journal: Arc<Mutex<Journal>>,
}

impl ScriptedProtocol {
    /// A healthy 12-outlet device.
    pub fn wattbox() -> Self {
        let names: Vec<String> = (1..=12).map(|i| format!("{{Outlet {i}}}")).collect();
        let mut protocol = Self {
            answers: HashMap::new(),
            failures: HashSet::new(),
            hang_ups: HashSet::new(),
            stash: None,
            connected: false,
            refuse_connect: false,
            journal: Arc::default(),
        };
        protocol
            .answer(Query::Firmware, "?Firmware=2.8.0.0")
            .answer(Query::Model, "?Model=WB-800-IPVM-12")
            .answer(Query::ServiceTag, "?ServiceTag=ST201916431G842A")
            .answer(Query::Hostname, "?Hostname=WattBox")
            .answer(Query::AutoReboot, "?AutoReboot=1")
            .answer(Query::OutletCount, "?OutletCount=12")
            .answer(Query::OutletStatus, "?OutletStatus=0,0,0,0,0,0,0,0,0,0,0,0")
            .answer(Query::OutletName, &format!("?OutletName={}", names.join(",")))
            .answer(Query::PowerStatus, "?PowerStatus=1.20,140.00,121.30,1")
            .answer(Query::UpsConnection, "?UPSConnection=1")
            .answer(Query::UpsStatus, "?UPSStatus=50,0,Good,False,25,True,False");
        protocol
    }

    pub fn answer(&mut self, query: Query, line: &str) -> &mut Self {
        self.answers.insert(query.to_line(), line.to_string());
        self
    }

    pub fn fail(&mut self, query: Query) -> &mut Self {
        self.fail_line(&query.to_line())
    }

    /// Times out on `line` and keeps the session, like the telnet client.
    pub fn fail_line(&mut self, line: &str) -> &mut Self {
        self.failures.insert(line.to_string());
        self
    }

    /// Drops the session when `query` is sent.
    pub fn hang_up(&mut self, query: Query) -> &mut Self {
        self.hang_ups.insert(query.to_line());
        self
    }

    pub fn refuse_connect(&mut self) -> &mut Self {
        self.refuse_connect = true;
        self
    }

    pub fn journal(&self) -> Arc<Mutex<Journal>> {
        Arc::clone(&self.journal)
    }

    fn is_delayed(line: &str) -> bool {
        [Query::OutletStatus, Query::OutletName, Query::OutletCount]
            .iter()
            .any(|q| q.to_line() == line)
    }
}

impl Protocol for ScriptedProtocol {
    async fn connect(&mut self) -> Result<(), ProtocolError> {
        if self.connected {
            return Ok(());
        }
        if self.refuse_connect {
            return Err(ProtocolError::ConnectionFailed("connection refused".into()));
        }
        self.journal.lock().connects += 1;
        self.connected = true;
        self.stash = None;
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.connected = false;
        self.stash = None;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn send_raw(&mut self, line: &str) -> Result<CommandResponse, ProtocolError> {
        if !self.connected {
            return Err(ProtocolError::NotConnected);
        }
        self.journal.lock().sent.push(line.to_string());

        if self.hang_ups.contains(line) {
            self.connected = false;
            self.stash = None;
            return Err(ProtocolError::ConnectionClosed);
        }
        if self.failures.contains(line) {
            return Err(ProtocolError::Timeout {
                waiting_for: "\\n".into(),
                timeout_ms: 10_000,
            });
        }

        let own = self.answers.get(line).cloned().unwrap_or_default();
        let reply = if Self::is_delayed(line) {
            self.stash.replace(own).unwrap_or_default()
        } else {
            self.stash.take().unwrap_or(own)
        };
        Ok(CommandResponse::new(reply))
    }
}
