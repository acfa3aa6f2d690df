// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response parsing for `WattBox` command responses.
//!
//! Every parser here is pure: it takes a [`CommandResponse`] and returns a
//! typed value or a [`ParseError`]. Deciding what to do with a malformed
//! response (log it, keep the previous value) is left to the device layer.
//!
//! [`CommandResponse`]: crate::protocol::CommandResponse

mod identity;
mod outlet;
mod status;

pub use identity::{DeviceIdentity, UNKNOWN_FIRMWARE, normalize_firmware};
pub use outlet::{parse_outlet_count, parse_outlet_names, parse_outlet_states};
pub use status::{PowerStatus, UpsStatus, parse_ups_connection};

use std::str::FromStr;

use crate::error::ParseError;

/// Splits a comma-separated value list, trimming each field.
pub(crate) fn split_fields(value: &str) -> Vec<&str> {
    value.split(',').map(str::trim).collect()
}

/// Parses a single field, naming it in the error on failure.
pub(crate) fn parse_field<T>(field: &str, raw: &str) -> Result<T, ParseError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ParseError::InvalidValue {
        field: field.to_string(),
        message: format!("{raw:?}: {e}"),
    })
}

/// Checks that a value list has at least `expected` fields.
pub(crate) fn require_fields(
    field: &'static str,
    fields: &[&str],
    expected: usize,
) -> Result<(), ParseError> {
    if fields.len() < expected {
        return Err(ParseError::FieldCount {
            field,
            expected,
            actual: fields.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_fields_trims() {
        assert_eq!(split_fields("1, 0 ,1"), vec!["1", "0", "1"]);
    }

    #[test]
    fn parse_field_error_names_field() {
        let err = parse_field::<f64>("voltage", "abc").unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { ref field, .. } if field == "voltage"));
    }

    #[test]
    fn require_fields_short_list() {
        let err = require_fields("PowerStatus", &["1", "2"], 4).unwrap_err();
        assert_eq!(
            err,
            ParseError::FieldCount {
                field: "PowerStatus",
                expected: 4,
                actual: 2
            }
        );
    }
}
