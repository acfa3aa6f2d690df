// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `WattBox` Lib - A Rust library to monitor and control `WattBox` power
//! distribution units.
//!
//! This library talks to a `WattBox` over its telnet command interface: it
//! logs in, reads identity, outlet, power and UPS state, and switches
//! outlets on and off.
//!
//! # Supported Features
//!
//! - **Outlet control**: Switch any outlet on or off
//! - **Outlet status**: Per-outlet state and name
//! - **Identity**: Firmware, model, service tag, hostname
//! - **Power and UPS**: Voltage, current, power, safe-voltage flag, UPS battery
//!   and alarm state
//! - **Polling**: A refresh coordinator that publishes snapshots and marks the
//!   device unavailable when it cannot be reached
//!
//! # Device Quirks
//!
//! The device answers some queries one command late, and sometimes answers
//! identity queries with the value of a neighbouring field. Both are handled
//! inside [`Device`]; callers see consistent values.
//!
//! # Quick Start
//!
//! ## Direct Device Access
//!
//! ```no_run
//! use wattbox_lib::Device;
//! use wattbox_lib::types::{OutletIndex, PowerState};
//!
//! #[tokio::main]
//! async fn main() -> wattbox_lib::Result<()> {
//!     let mut device = Device::telnet("192.168.1.34")
//!         .with_credentials("wattbox", "wattbox")
//!         .connect()
//!         .await?;
//!
//!     let outlets = device.get_outlet_status(None).await?;
//!     for outlet in &outlets {
//!         println!("{} {}: {}", outlet.index, outlet.name, outlet.state);
//!     }
//!
//!     device.set_outlet_state(OutletIndex::new(1)?, PowerState::On).await?;
//!     device.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Polling Coordinator
//!
//! ```no_run
//! use wattbox_lib::config::WattboxConfig;
//! use wattbox_lib::coordinator::Coordinator;
//! use wattbox_lib::entity::BinarySensorKind;
//!
//! #[tokio::main]
//! async fn main() -> wattbox_lib::Result<()> {
//!     let config = WattboxConfig::from_json(r#"{"host": "192.168.1.34", "polling_interval": 15}"#)?;
//!     let coordinator = Coordinator::from_config(&config)?;
//!
//!     if let Err(e) = coordinator.refresh().await {
//!         eprintln!("device unavailable: {e}");
//!     }
//!
//!     coordinator.view(|view| {
//!         println!("connected: {}", view.is_connected());
//!         println!("power lost: {:?}", view.binary_sensor(BinarySensorKind::PowerLost));
//!     });
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod coordinator;
mod device;
pub mod entity;
pub mod error;
pub mod protocol;
pub mod response;
pub mod state;
pub mod types;

pub use command::{Command, OutletSetCommand, Query};
pub use config::WattboxConfig;
pub use coordinator::Coordinator;
pub use device::{Device, FALLBACK_OUTLET_COUNT, TelnetDeviceBuilder};
pub use error::{
    ConfigError, Error, ParseError, ProtocolError, RefreshFailed, Result, ValueError,
};
pub use protocol::{TelnetClient, TelnetConfig};
pub use response::{DeviceIdentity, PowerStatus, UpsStatus};
pub use state::{DeviceState, OutletRecord, PowerMetrics, Snapshot, StatusInfo};
pub use types::{OutletIndex, PowerState};
