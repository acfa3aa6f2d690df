// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A scripted `WattBox` telnet server on a loopback port.
//!
//! The server reproduces the login dialogue and the one-command lag of the
//! outlet queries: `?OutletStatus`, `?OutletName` and `?OutletCount` answer
//! with an empty line, and their value is returned in reply to whatever
//! command comes next.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use wattbox_lib::TelnetConfig;

pub const USERNAME: &str = "wattbox";
pub const PASSWORD: &str = "wattbox";

/// The device data the server answers from.
#[derive(Debug, Clone)]
pub struct DeviceModel {
    pub firmware: String,
    pub model: String,
    pub service_tag: String,
    pub hostname: String,
    pub outlets: Vec<(String, bool)>,
    pub power_status: String,
    pub ups_connection: String,
    pub ups_status: String,
}

impl DeviceModel {
    /// A device with `count` outlets, all off and named `Outlet n`.
    pub fn with_outlets(count: usize) -> Self {
        Self {
            firmware: "2.8.0.0".to_string(),
            model: "WB-800-IPVM-12".to_string(),
            service_tag: "ST201916431G842A".to_string(),
            hostname: "WattBox".to_string(),
            outlets: (1..=count).map(|i| (format!("Outlet {i}"), false)).collect(),
            power_status: "1.20,140.00,121.30,1".to_string(),
            ups_connection: "1".to_string(),
            ups_status: "50,0,Good,False,25,True,False".to_string(),
        }
    }

    fn answer(&mut self, line: &str) -> String {
        match line {
            "?Firmware" => format!("?Firmware={}", self.firmware),
            "?Model" => format!("?Model={}", self.model),
            "?ServiceTag" => format!("?ServiceTag={}", self.service_tag),
            "?Hostname" => format!("?Hostname={}", self.hostname),
            "?AutoReboot" => "?AutoReboot=1".to_string(),
            "?OutletCount" => format!("?OutletCount={}", self.outlets.len()),
            "?OutletStatus" => {
                let states: Vec<&str> = self
                    .outlets
                    .iter()
                    .map(|(_, on)| if *on { "1" } else { "0" })
                    .collect();
                format!("?OutletStatus={}", states.join(","))
            }
            "?OutletName" => {
                let names: Vec<String> =
                    self.outlets.iter().map(|(name, _)| format!("{{{name}}}")).collect();
                format!("?OutletName={}", names.join(","))
            }
            "?PowerStatus" => format!("?PowerStatus={}", self.power_status),
            "?UPSConnection" => format!("?UPSConnection={}", self.ups_connection),
            "?UPSStatus" => format!("?UPSStatus={}", self.ups_status),
            _ => self.outlet_set(line).unwrap_or_else(|| "#Error".to_string()),
        }
    }

    fn outlet_set(&mut self, line: &str) -> Option<String> {
        let (outlet, action) = line.strip_prefix("!OutletSet=")?.split_once(',')?;
        let position = outlet.parse::<usize>().ok()?.checked_sub(1)?;
        let on = match action {
            "ON" => true,
            "OFF" => false,
            _ => return None,
        };
        self.outlets.get_mut(position)?.1 = on;
        Some("OK".to_string())
    }
}

/// How the server departs from a healthy device.
#[derive(Debug, Clone, Default)]
pub struct Behaviour {
    /// Accept the connection but never print the login prompt.
    pub silent: bool,
    /// Accepted password; `None` means [`PASSWORD`].
    pub password: Option<String>,
    /// Commands that are read but never answered.
    pub unanswered: HashSet<String>,
    /// Commands that make the server close the connection.
    pub hang_up: HashSet<String>,
}

struct Shared {
    model: Mutex<DeviceModel>,
    behaviour: Behaviour,
    handshakes: AtomicUsize,
    received: Mutex<Vec<String>>,
}

/// A running fake device. The server stops when this is dropped.
pub struct FakeWattbox {
    port: u16,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl FakeWattbox {
    pub async fn start(model: DeviceModel) -> Self {
        Self::start_with(model, Behaviour::default()).await
    }

    pub async fn start_with(model: DeviceModel, behaviour: Behaviour) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let shared = Arc::new(Shared {
            model: Mutex::new(model),
            behaviour,
            handshakes: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        });

        let accept_shared = Arc::clone(&shared);
        let task = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve(socket, Arc::clone(&accept_shared)));
            }
        });

        Self { port, shared, task }
    }

    /// Client parameters pointing at this server, with a short timeout.
    pub fn config(&self) -> TelnetConfig {
        TelnetConfig::new("127.0.0.1")
            .with_port(self.port)
            .with_credentials(USERNAME, PASSWORD)
            .with_timeout(Duration::from_millis(500))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Number of completed logins.
    pub fn handshakes(&self) -> usize {
        self.shared.handshakes.load(Ordering::SeqCst)
    }

    /// Every command line received after login, in order.
    pub fn received(&self) -> Vec<String> {
        self.shared.received.lock().clone()
    }

    /// The server-side state of outlet `n`.
    pub fn outlet_on(&self, n: usize) -> bool {
        self.shared.model.lock().outlets[n - 1].1
    }

    pub fn update(&self, f: impl FnOnce(&mut DeviceModel)) {
        f(&mut self.shared.model.lock());
    }
}

impl Drop for FakeWattbox {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Returns a loopback port nothing listens on.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

async fn serve(socket: TcpStream, shared: Arc<Shared>) {
    let (read, mut write) = socket.into_split();
    let mut lines = BufReader::new(read).lines();

    if shared.behaviour.silent {
        // Hold the connection open until the client gives up.
        let _ = lines.next_line().await;
        return;
    }

    let password = shared.behaviour.password.as_deref().unwrap_or(PASSWORD);
    loop {
        if write.write_all(b"Welcome\r\nUsername: ").await.is_err() {
            return;
        }
        let Ok(Some(user)) = lines.next_line().await else {
            return;
        };
        if write.write_all(b"Password: ").await.is_err() {
            return;
        }
        let Ok(Some(pass)) = lines.next_line().await else {
            return;
        };
        if user == USERNAME && pass == password {
            break;
        }
        if write.write_all(b"\r\nInvalid Login\r\n").await.is_err() {
            return;
        }
    }

    shared.handshakes.fetch_add(1, Ordering::SeqCst);
    if write.write_all(b"\r\nSuccessfully Logged In!").await.is_err() {
        return;
    }

    let mut stash: Option<String> = None;
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim().to_string();
        shared.received.lock().push(line.clone());
        if shared.behaviour.hang_up.contains(&line) {
            return;
        }
        if shared.behaviour.unanswered.contains(&line) {
            continue;
        }

        let own = shared.model.lock().answer(&line);
        let reply = if is_delayed(&line) {
            stash.replace(own).unwrap_or_default()
        } else {
            stash.take().unwrap_or(own)
        };
        if write.write_all(format!("{reply}\r\n").as_bytes()).await.is_err() {
            return;
        }
    }
}

fn is_delayed(line: &str) -> bool {
    matches!(line, "?OutletStatus" | "?OutletName" | "?OutletCount")
}
