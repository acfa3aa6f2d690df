// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outlet list parsing.

use crate::error::ParseError;
use crate::protocol::CommandResponse;
use crate::response::{parse_field, split_fields};
use crate::types::PowerState;

/// Parses an `?OutletCount=<n>` response.
///
/// # Errors
///
/// Returns `ParseError` if the echo is not `OutletCount`, the value is not
/// an integer, or the count is zero.
pub fn parse_outlet_count(response: &CommandResponse) -> Result<usize, ParseError> {
    let value = response.value_for("OutletCount")?;
    let count: usize = parse_field("OutletCount", value)?;
    if count == 0 {
        return Err(ParseError::InvalidValue {
            field: "OutletCount".to_string(),
            message: "device reported zero outlets".to_string(),
        });
    }
    Ok(count)
}

/// Parses an `?OutletStatus=<0|1>,<0|1>,...` response into per-outlet states.
///
/// Any non-zero integer is treated as on.
///
/// # Errors
///
/// Returns `ParseError` if the echo is not `OutletStatus` or any entry is
/// not an integer. No partial list is returned.
///
/// # Examples
///
/// ```
/// use wattbox_lib::protocol::CommandResponse;
/// use wattbox_lib::response::parse_outlet_states;
/// use wattbox_lib::types::PowerState;
///
/// let response = CommandResponse::new("?OutletStatus=1,0,1");
/// let states = parse_outlet_states(&response).unwrap();
/// assert_eq!(states, vec![PowerState::On, PowerState::Off, PowerState::On]);
/// ```
pub fn parse_outlet_states(response: &CommandResponse) -> Result<Vec<PowerState>, ParseError> {
    let value = response.value_for("OutletStatus")?;
    split_fields(value)
        .into_iter()
        .enumerate()
        .map(|(i, raw)| -> Result<PowerState, ParseError> {
            let n: i64 = parse_field(&format!("OutletStatus[{}]", i + 1), raw)?;
            Ok(PowerState::from(n != 0))
        })
        .collect()
}

/// Parses an `?OutletName={A},{B},...` response into outlet names.
///
/// Braces are stripped from every entry.
///
/// # Errors
///
/// Returns `ParseError` if the echo is not `OutletName`.
pub fn parse_outlet_names(response: &CommandResponse) -> Result<Vec<String>, ParseError> {
    let value = response.value_for("OutletName")?;
    Ok(value
        .split(',')
        .map(|raw| raw.replace(['{', '}'], "").trim().to_string())
        .collect())
}
