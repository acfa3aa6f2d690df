// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! [`DeviceState`] is the mutable cache owned by one [`Device`]; it is
//! updated by queries and by successful control commands. [`Snapshot`] is
//! the immutable read model a refresh assembles from it.
//!
//! [`Device`]: crate::Device
//!
//! # Examples
//!
//! ```
//! use wattbox_lib::state::DeviceState;
//! use wattbox_lib::types::{OutletIndex, PowerState};
//!
//! let mut state = DeviceState::new();
//! state.init_outlets(12);
//! state.apply_outlet_states(&[PowerState::On, PowerState::Off]);
//!
//! assert!(state.outlet(OutletIndex::one()).unwrap().is_on());
//! ```

mod device_state;
mod snapshot;

pub use device_state::{DeviceState, MAX_OUTLETS, OutletRecord};
pub use snapshot::{PowerMetrics, Snapshot, StatusInfo};
