// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for `WattBox` outlet control.
//!
//! - [`PowerState`] - On/Off state of an outlet
//! - [`OutletIndex`] - 1-based outlet number

mod power;

pub use power::{OutletIndex, PowerState};
